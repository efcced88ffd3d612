//! Board invariants under arbitrary edit sequences.
//!
//! Covers referential integrity between widgets and geometry, placement
//! bounds, reprojection bounds across breakpoints, and document persistence.

use std::collections::HashSet;

use board_core::{
    Board, BoardDocument, GeometryPatch, LayoutEntry, Selection, WidgetContent, WidgetId,
    WidgetKind,
};
use proptest::prelude::*;

/// Viewport widths that land on every default breakpoint.
const VIEWPORTS: [u32; 5] = [1280, 1000, 800, 500, 320];

#[derive(Debug, Clone)]
enum Action {
    Add(WidgetKind),
    Remove(usize),
    RemoveUnknown,
    Resize(usize, i64, i64, i64, i64),
    Viewport(usize),
}

fn content_for(kind: WidgetKind) -> WidgetContent {
    match kind {
        WidgetKind::Chart => WidgetContent::chart("result", "Chart"),
        WidgetKind::Text => WidgetContent::text(),
        WidgetKind::Title => WidgetContent::title(),
    }
}

fn kind_strategy() -> impl Strategy<Value = WidgetKind> {
    prop_oneof![
        Just(WidgetKind::Chart),
        Just(WidgetKind::Text),
        Just(WidgetKind::Title),
    ]
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => kind_strategy().prop_map(Action::Add),
        2 => (0usize..16).prop_map(Action::Remove),
        1 => Just(Action::RemoveUnknown),
        2 => (0usize..16, -20i64..30, -5i64..40, -4i64..20, -4i64..10)
            .prop_map(|(i, x, y, w, h)| Action::Resize(i, x, y, w, h)),
        1 => (0usize..VIEWPORTS.len()).prop_map(Action::Viewport),
    ]
}

fn id_sets_match(board: &Board) -> bool {
    let widgets: HashSet<WidgetId> = board.widgets().iter().map(|w| w.id).collect();
    let layout: HashSet<WidgetId> = board.layout().iter().map(|e| e.id).collect();
    widgets == layout && widgets.len() == board.len() && layout.len() == board.layout().len()
}

fn nth_id(board: &Board, index: usize) -> Option<WidgetId> {
    if board.is_empty() {
        None
    } else {
        Some(board.widgets()[index % board.len()].id)
    }
}

proptest! {
    #[test]
    fn referential_integrity_holds_after_every_call(actions in prop::collection::vec(action_strategy(), 1..40)) {
        let mut board = Board::new(1280);
        for action in actions {
            match action {
                Action::Add(kind) => {
                    board.add_widget(content_for(kind)).expect("add");
                }
                Action::Remove(i) => {
                    if let Some(id) = nth_id(&board, i) {
                        board.remove_widget(id).expect("remove");
                    }
                }
                Action::RemoveUnknown => {
                    board.remove_widget(WidgetId::new()).expect("remove unknown");
                }
                Action::Resize(i, x, y, w, h) => {
                    if let Some(id) = nth_id(&board, i) {
                        board
                            .resize(id, GeometryPatch { x: Some(x), y: Some(y), w: Some(w), h: Some(h) })
                            .expect("resize");
                    }
                }
                Action::Viewport(i) => {
                    board.set_viewport_width(VIEWPORTS[i]).expect("viewport");
                }
            }
            prop_assert!(id_sets_match(&board));
            let columns = board.columns();
            prop_assert!(board.layout().iter().all(|e| e.fits(columns)), "layout out of bounds: {:?}", board.layout());
        }
    }

    #[test]
    fn placement_is_never_degenerate(kinds in prop::collection::vec(kind_strategy(), 1..30), viewport in 0usize..VIEWPORTS.len()) {
        let mut board = Board::new(VIEWPORTS[viewport]);
        let columns = board.columns();
        for kind in kinds {
            let id = board.add_widget(content_for(kind)).expect("add");
            let entry = board.layout_of(id).copied().expect("entry");
            prop_assert!(entry.w >= entry.min_w.min(columns));
            prop_assert!(entry.h >= entry.min_h);
            prop_assert!(entry.x + entry.w <= columns);
        }
    }

    #[test]
    fn reprojection_stays_inside_grid(
        x in 0u32..12,
        w in 1u32..=12,
        min_w in 1u32..=6,
        from in 0usize..VIEWPORTS.len(),
        to in 0usize..VIEWPORTS.len(),
    ) {
        let w = w.max(min_w);
        let entry = LayoutEntry { id: WidgetId::new(), x, y: 0, w, h: 3, min_w, min_h: 3 };
        let table = board_core::BreakpointTable::default();
        let before = table.resolve(VIEWPORTS[from]).columns;
        let after = table.resolve(VIEWPORTS[to]).columns;

        let staged = entry.reprojected(before);
        prop_assert!(staged.x + staged.w <= before);

        let projected = staged.reprojected(after);
        prop_assert!(projected.x + projected.w <= after);
        prop_assert!(projected.w >= min_w.min(after));
        prop_assert_eq!(projected.y, staged.y);
    }
}

#[test]
fn select_then_remove_clears_selection() {
    let mut board = Board::default();
    let a = board.add_widget(WidgetContent::text()).expect("add");
    board.add_widget(WidgetContent::title()).expect("add");
    board.select_widget(a).expect("select");

    board.remove_widget(a).expect("remove");
    assert_eq!(board.selection(), Selection::Unselected);
}

#[test]
fn twelve_to_six_column_scenario() {
    let mut board = Board::new(1280);
    let id = board
        .add_widget(WidgetContent::chart("result", "Chart"))
        .expect("add");
    board
        .resize(
            id,
            GeometryPatch {
                x: Some(10),
                w: Some(6),
                ..GeometryPatch::default()
            },
        )
        .expect("resize");

    board.set_viewport_width(800).expect("viewport");
    assert_eq!(board.columns(), 6);
    let entry = board.layout_of(id).copied().expect("entry");
    assert!(entry.x <= 6 - entry.min_w);
    assert!(entry.w >= entry.min_w);
}

#[test]
fn staggered_adds_avoid_full_overlap() {
    let mut board = Board::new(1280);
    let ids: Vec<_> = (0..6)
        .map(|_| board.add_widget(WidgetContent::text()).expect("add"))
        .collect();
    let origins: HashSet<(u32, u32)> = ids
        .iter()
        .filter_map(|id| board.layout_of(*id).map(|e| (e.x, e.y)))
        .collect();
    assert_eq!(origins.len(), ids.len());
}

#[test]
fn document_survives_disk_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("board.json");

    let mut board = Board::new(1000);
    board
        .add_widget(WidgetContent::chart("q1", "Quarterly"))
        .expect("chart");
    let text = board.add_widget(WidgetContent::text()).expect("text");
    board.update_content(text, "Summary").expect("content");

    board.to_document().save(&path).expect("save");
    let restored = Board::from_document(BoardDocument::load(&path).expect("load")).expect("board");

    assert_eq!(restored.widgets(), board.widgets());
    assert_eq!(restored.layout(), board.layout());
    assert_eq!(restored.columns(), 10);
}
