use crate::query::ResultItem;

/// Which result, if any, is shown full-size in the preview overlay.
///
/// The overlay is open exactly when an item is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<ResultItem>,
}

impl SelectionState {
    /// Open the overlay on `item`, replacing any current selection.
    pub fn select(&mut self, item: ResultItem) {
        self.selected = Some(item);
    }

    /// Close the overlay. Closing an already closed overlay does nothing.
    pub fn close(&mut self) {
        self.selected = None;
    }

    pub const fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    pub const fn selected(&self) -> Option<&ResultItem> {
        self.selected.as_ref()
    }
}
