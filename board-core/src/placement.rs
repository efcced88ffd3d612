//! Initial geometry for newly added widgets.
//!
//! Placement is two explicit steps: pick a column span from the widget kind
//! and the number of widgets already on the board, then drop the widget onto
//! the first free row below whatever occupies that span.

use crate::layout::{bottom_in_span, LayoutEntry};
use crate::{WidgetId, WidgetKind};

/// Default size and bounds for one widget kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindDefaults {
    /// Initial width. `None` spans the full row.
    pub w: Option<u32>,
    /// Initial height.
    pub h: u32,
    /// Minimum width.
    pub min_w: u32,
    /// Minimum height.
    pub min_h: u32,
}

impl KindDefaults {
    /// Defaults for the given kind.
    #[must_use]
    pub const fn for_kind(kind: WidgetKind) -> Self {
        match kind {
            WidgetKind::Chart => Self {
                w: Some(6),
                h: 4,
                min_w: 3,
                min_h: 3,
            },
            WidgetKind::Text => Self {
                w: Some(4),
                h: 3,
                min_w: 2,
                min_h: 2,
            },
            WidgetKind::Title => Self {
                w: None,
                h: 1,
                min_w: 2,
                min_h: 1,
            },
        }
    }
}

/// Compute geometry for a new widget.
///
/// `widget_count` is the number of widgets on the board before this one is
/// added. Non-title widgets stagger two columns per existing widget so that
/// sequential additions do not stack on the same origin.
#[must_use]
pub fn place(
    id: WidgetId,
    kind: WidgetKind,
    widget_count: usize,
    columns: u32,
    existing: &[LayoutEntry],
) -> LayoutEntry {
    let columns = columns.max(1);
    let defaults = KindDefaults::for_kind(kind);
    let min_w = defaults.min_w.min(columns);
    let w = defaults.w.unwrap_or(columns).clamp(min_w, columns);

    let x = match kind {
        WidgetKind::Title => 0,
        WidgetKind::Chart | WidgetKind::Text => stagger(widget_count, columns).min(columns - w),
    };
    let y = bottom_in_span(existing, x, w);

    LayoutEntry {
        id,
        x,
        y,
        w,
        h: defaults.h,
        min_w: defaults.min_w,
        min_h: defaults.min_h,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn stagger(widget_count: usize, columns: u32) -> u32 {
    // The modulus keeps the result below `columns`, so the narrowing is lossless.
    ((widget_count as u64 * 2) % u64::from(columns)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sizes() {
        let chart = place(WidgetId::new(), WidgetKind::Chart, 0, 12, &[]);
        assert_eq!((chart.x, chart.y, chart.w, chart.h), (0, 0, 6, 4));

        let text = place(WidgetId::new(), WidgetKind::Text, 0, 12, &[]);
        assert_eq!((text.w, text.h, text.min_w, text.min_h), (4, 3, 2, 2));

        let title = place(WidgetId::new(), WidgetKind::Title, 3, 12, &[]);
        assert_eq!((title.x, title.w, title.h), (0, 12, 1));
    }

    #[test]
    fn test_sequential_adds_stagger_and_stack() {
        let first = place(WidgetId::new(), WidgetKind::Chart, 0, 12, &[]);
        let second = place(WidgetId::new(), WidgetKind::Chart, 1, 12, &[first]);
        assert_eq!(second.x, 2);
        assert_eq!(second.y, 4);
        assert_ne!((first.x, first.y), (second.x, second.y));
    }

    #[test]
    fn test_stagger_pulled_inside_grid() {
        // 5 widgets -> x = 10, but a 6-wide chart must start at 6.
        let chart = place(WidgetId::new(), WidgetKind::Chart, 5, 12, &[]);
        assert_eq!(chart.x, 6);
        assert!(chart.fits(12));
    }

    #[test]
    fn test_title_spans_narrow_grid() {
        let title = place(WidgetId::new(), WidgetKind::Title, 0, 4, &[]);
        assert_eq!((title.x, title.w), (0, 4));
    }

    #[test]
    fn test_placement_in_grid_narrower_than_minimum() {
        let chart = place(WidgetId::new(), WidgetKind::Chart, 7, 2, &[]);
        assert_eq!((chart.x, chart.w), (0, 2));
        assert!(chart.fits(2));
    }

    #[test]
    fn test_placement_skips_unrelated_columns() {
        let left = place(WidgetId::new(), WidgetKind::Chart, 0, 12, &[]);
        // Count 3 -> x = 6, which does not overlap the first chart.
        let right = place(WidgetId::new(), WidgetKind::Chart, 3, 12, &[left]);
        assert_eq!((right.x, right.y), (6, 0));
    }
}
