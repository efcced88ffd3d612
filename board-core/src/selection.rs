//! Which widget, if any, is currently being edited.

use serde::{Deserialize, Serialize};

use crate::WidgetId;

/// Selection state machine.
///
/// Transitions:
///
/// ```text
/// Unselected  --select(id)-->        Selected(id)
/// Selected(a) --select(b)-->         Selected(b)
/// any         --click_background-->  Unselected
/// Selected(a) --removed(a)-->        Unselected
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "id", rename_all = "lowercase")]
pub enum Selection {
    /// Nothing selected.
    #[default]
    Unselected,
    /// One widget selected.
    Selected(WidgetId),
}

impl Selection {
    /// Select a widget, replacing any previous selection.
    pub fn select(&mut self, id: WidgetId) {
        *self = Self::Selected(id);
    }

    /// Clear the selection (click-through on the board background).
    pub fn clear(&mut self) {
        *self = Self::Unselected;
    }

    /// Notify that a widget was removed.
    ///
    /// Returns `true` if the removed widget was the selected one.
    pub fn on_removed(&mut self, id: WidgetId) -> bool {
        if self.is_selected(id) {
            *self = Self::Unselected;
            true
        } else {
            false
        }
    }

    /// The selected widget id.
    #[must_use]
    pub const fn id(&self) -> Option<WidgetId> {
        match self {
            Self::Unselected => None,
            Self::Selected(id) => Some(*id),
        }
    }

    /// Whether `id` is the selected widget.
    #[must_use]
    pub fn is_selected(&self, id: WidgetId) -> bool {
        *self == Self::Selected(id)
    }
}
