//! The board: widgets, their geometry, and the current selection.

use std::collections::HashSet;
use std::sync::Arc;

use crate::layout::{GeometryPatch, LayoutEntry};
use crate::placement::place;
use crate::{
    Breakpoint, BoardError, BoardResult, BreakpointTable, ExportGate, Selection, StylePatch,
    Widget, WidgetContent, WidgetId,
};

/// Default viewport width in pixels.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

/// Widget and layout collections plus the edit controller.
///
/// Every mutation swaps in a freshly built collection instead of editing the
/// shared one, so a holder of [`Board::widgets_arc`] or [`Board::layout_arc`]
/// can detect change with [`Arc::ptr_eq`]. Edits addressed to unknown ids are
/// no-ops. While the shared [`ExportGate`] is held every mutation is rejected
/// with [`BoardError::ExportInProgress`].
#[derive(Debug, Clone)]
pub struct Board {
    widgets: Arc<Vec<Widget>>,
    layout: Arc<Vec<LayoutEntry>>,
    selection: Selection,
    breakpoints: BreakpointTable,
    viewport_width: u32,
    columns: u32,
    gate: ExportGate,
    revision: u64,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_WIDTH)
    }
}

impl Board {
    /// Create an empty board with the default breakpoint table.
    #[must_use]
    pub fn new(viewport_width: u32) -> Self {
        Self::with_breakpoints(BreakpointTable::default(), viewport_width)
    }

    /// Create an empty board with a custom breakpoint table.
    #[must_use]
    pub fn with_breakpoints(breakpoints: BreakpointTable, viewport_width: u32) -> Self {
        let columns = breakpoints.resolve(viewport_width).columns;
        Self {
            widgets: Arc::new(Vec::new()),
            layout: Arc::new(Vec::new()),
            selection: Selection::Unselected,
            breakpoints,
            viewport_width,
            columns,
            gate: ExportGate::new(),
            revision: 0,
        }
    }

    /// Share an existing export gate instead of the board's own.
    #[must_use]
    pub fn with_gate(mut self, gate: ExportGate) -> Self {
        self.gate = gate;
        self
    }

    /// The gate an exporter must hold while it rewrites the rendered board.
    #[must_use]
    pub fn gate(&self) -> &ExportGate {
        &self.gate
    }

    // ------------------------------------------------------------------
    // Widget model
    // ------------------------------------------------------------------

    /// Add a widget and place it on the grid. The new widget becomes selected.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::ExportInProgress`] while an export holds the gate.
    pub fn add_widget(&mut self, content: WidgetContent) -> BoardResult<WidgetId> {
        self.ensure_editable()?;

        let widget = Widget::new(content);
        let id = widget.id;
        let entry = place(
            id,
            widget.kind(),
            self.widgets.len(),
            self.columns,
            &self.layout,
        );
        tracing::debug!(
            "Adding {} widget {id} at ({}, {}) size {}x{}",
            widget.kind(),
            entry.x,
            entry.y,
            entry.w,
            entry.h
        );

        let mut widgets = Vec::with_capacity(self.widgets.len() + 1);
        widgets.extend(self.widgets.iter().cloned());
        widgets.push(widget);
        let mut layout = Vec::with_capacity(self.layout.len() + 1);
        layout.extend(self.layout.iter().copied());
        layout.push(entry);

        self.commit(Some(widgets), Some(layout));
        self.selection.select(id);
        Ok(id)
    }

    /// Remove a widget and its geometry. Unknown ids are ignored.
    ///
    /// Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::ExportInProgress`] while an export holds the gate.
    pub fn remove_widget(&mut self, id: WidgetId) -> BoardResult<bool> {
        self.ensure_editable()?;

        if self.widget(id).is_none() && self.layout_of(id).is_none() {
            return Ok(false);
        }
        let widgets = self.widgets.iter().filter(|w| w.id != id).cloned().collect();
        let layout = self.layout.iter().filter(|e| e.id != id).copied().collect();
        self.commit(Some(widgets), Some(layout));

        if self.selection.on_removed(id) {
            tracing::debug!("Removed selected widget {id}, selection cleared");
        } else {
            tracing::debug!("Removed widget {id}");
        }
        Ok(true)
    }

    /// Replace the text of a text or title widget.
    ///
    /// Unknown ids and chart widgets are ignored: a control panel may still
    /// deliver an edit for a widget removed a moment earlier.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::ExportInProgress`] while an export holds the gate.
    pub fn update_content(&mut self, id: WidgetId, content: &str) -> BoardResult<()> {
        self.ensure_editable()?;
        self.replace_widget(id, |w| w.with_text(content));
        Ok(())
    }

    /// Apply a partial style update to a text or title widget.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::ExportInProgress`] while an export holds the gate.
    pub fn update_style(&mut self, id: WidgetId, patch: StylePatch) -> BoardResult<()> {
        self.ensure_editable()?;
        self.replace_widget(id, |w| w.with_style(patch));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Layout model
    // ------------------------------------------------------------------

    /// Move or resize a widget. Every field is clamped into range.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::ExportInProgress`] while an export holds the gate.
    pub fn resize(&mut self, id: WidgetId, patch: GeometryPatch) -> BoardResult<()> {
        self.ensure_editable()?;

        let Some(current) = self.layout_of(id).copied() else {
            return Ok(());
        };
        let next = current.patched(patch, self.columns);
        if next == current {
            return Ok(());
        }
        let layout = self
            .layout
            .iter()
            .map(|e| if e.id == id { next } else { *e })
            .collect();
        self.commit(None, Some(layout));
        Ok(())
    }

    /// Update the viewport width, reprojecting all geometry when the active
    /// breakpoint's column count changes.
    ///
    /// Returns whether the column count changed.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::ExportInProgress`] while an export holds the gate.
    pub fn set_viewport_width(&mut self, width: u32) -> BoardResult<bool> {
        self.ensure_editable()?;

        self.viewport_width = width;
        let columns = self.breakpoints.resolve(width).columns;
        if columns == self.columns {
            return Ok(false);
        }
        tracing::debug!(
            "Viewport {width}px: {} -> {columns} columns",
            self.columns
        );
        self.columns = columns;
        let layout = self.layout.iter().map(|e| e.reprojected(columns)).collect();
        self.commit(None, Some(layout));
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Select a widget. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::ExportInProgress`] while an export holds the gate.
    pub fn select_widget(&mut self, id: WidgetId) -> BoardResult<()> {
        self.ensure_editable()?;
        if self.widget(id).is_some() {
            self.selection.select(id);
        }
        Ok(())
    }

    /// Click-through on the board background: clear the selection.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::ExportInProgress`] while an export holds the gate.
    pub fn click_background(&mut self) -> BoardResult<()> {
        self.ensure_editable()?;
        self.selection.clear();
        Ok(())
    }

    /// Current selection.
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// The selected widget, if any.
    #[must_use]
    pub fn selected_widget(&self) -> Option<&Widget> {
        self.selection.id().and_then(|id| self.widget(id))
    }

    /// Geometry of the selected widget, if any.
    #[must_use]
    pub fn selected_layout(&self) -> Option<&LayoutEntry> {
        self.selection.id().and_then(|id| self.layout_of(id))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// All widgets, in insertion order.
    #[must_use]
    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    /// Shared handle to the widget collection, for identity comparison.
    #[must_use]
    pub fn widgets_arc(&self) -> Arc<Vec<Widget>> {
        Arc::clone(&self.widgets)
    }

    /// All layout entries, in insertion order.
    #[must_use]
    pub fn layout(&self) -> &[LayoutEntry] {
        &self.layout
    }

    /// Shared handle to the layout collection, for identity comparison.
    #[must_use]
    pub fn layout_arc(&self) -> Arc<Vec<LayoutEntry>> {
        Arc::clone(&self.layout)
    }

    /// Look up a widget.
    #[must_use]
    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    /// Look up a widget's geometry.
    #[must_use]
    pub fn layout_of(&self, id: WidgetId) -> Option<&LayoutEntry> {
        self.layout.iter().find(|e| e.id == id)
    }

    /// Widgets paired with their geometry, in layout order.
    pub fn placed(&self) -> impl Iterator<Item = (&Widget, &LayoutEntry)> {
        self.layout
            .iter()
            .filter_map(|entry| self.widget(entry.id).map(|w| (w, entry)))
    }

    /// Number of widgets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Whether the board has no widgets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Column count of the active breakpoint.
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// The active breakpoint.
    #[must_use]
    pub fn breakpoint(&self) -> &Breakpoint {
        self.breakpoints.resolve(self.viewport_width)
    }

    /// The breakpoint table.
    #[must_use]
    pub fn breakpoints(&self) -> &BreakpointTable {
        &self.breakpoints
    }

    /// Current viewport width in pixels.
    #[must_use]
    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    /// Counter bumped on every change to either collection.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ------------------------------------------------------------------
    // Integrity
    // ------------------------------------------------------------------

    /// Verify that widget ids and layout ids match one to one.
    ///
    /// A mismatch is a bug: debug builds panic, release builds drop the
    /// orphans and return how many were dropped.
    pub fn check_integrity(&mut self) -> usize {
        let dropped = self.repair_orphans();
        debug_assert!(
            dropped == 0,
            "widget/layout collections diverged: {dropped} orphan(s)"
        );
        dropped
    }

    /// Drop widgets without geometry, geometry without widgets, and
    /// duplicate ids. Returns how many records were dropped.
    pub(crate) fn repair_orphans(&mut self) -> usize {
        let widget_ids: HashSet<WidgetId> = self.widgets.iter().map(|w| w.id).collect();
        let layout_ids: HashSet<WidgetId> = self.layout.iter().map(|e| e.id).collect();

        let mut seen = HashSet::new();
        let widgets: Vec<Widget> = self
            .widgets
            .iter()
            .filter(|w| layout_ids.contains(&w.id) && seen.insert(w.id))
            .cloned()
            .collect();
        let mut seen = HashSet::new();
        let layout: Vec<LayoutEntry> = self
            .layout
            .iter()
            .filter(|e| widget_ids.contains(&e.id) && seen.insert(e.id))
            .copied()
            .collect();

        let dropped = (self.widgets.len() - widgets.len()) + (self.layout.len() - layout.len());
        if dropped > 0 {
            tracing::error!("Dropped {dropped} orphaned widget/layout record(s)");
            if let Some(id) = self.selection.id() {
                if !widgets.iter().any(|w| w.id == id) {
                    self.selection.clear();
                }
            }
            self.commit(Some(widgets), Some(layout));
        }
        dropped
    }

    /// Replace both collections wholesale. Used when loading documents.
    pub(crate) fn load(&mut self, widgets: Vec<Widget>, layout: Vec<LayoutEntry>) {
        let columns = self.columns;
        let layout: Vec<LayoutEntry> = layout.into_iter().map(|e| e.normalized(columns)).collect();
        self.selection.clear();
        // Loaded collections may not pair up yet; `repair_orphans` follows.
        self.widgets = Arc::new(widgets);
        self.layout = Arc::new(layout);
        self.revision += 1;
    }

    fn ensure_editable(&self) -> BoardResult<()> {
        if self.gate.is_busy() {
            tracing::debug!("Edit rejected: export in progress");
            return Err(BoardError::ExportInProgress);
        }
        Ok(())
    }

    fn replace_widget(&mut self, id: WidgetId, edit: impl FnOnce(&Widget) -> Option<Widget>) {
        let Some(next) = self.widget(id).and_then(edit) else {
            return;
        };
        let widgets = self
            .widgets
            .iter()
            .map(|w| if w.id == id { next.clone() } else { w.clone() })
            .collect();
        self.commit(Some(widgets), None);
    }

    fn commit(&mut self, widgets: Option<Vec<Widget>>, layout: Option<Vec<LayoutEntry>>) {
        if let Some(widgets) = widgets {
            self.widgets = Arc::new(widgets);
        }
        if let Some(layout) = layout {
            self.layout = Arc::new(layout);
        }
        self.revision += 1;
        debug_assert_eq!(self.widgets.len(), self.layout.len());
    }
}
