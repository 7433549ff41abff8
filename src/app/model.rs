use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use image::DynamicImage;
use ratatui_image::picker::Picker;
use ratatui_image::protocol::StatefulProtocol;

use crate::image::ImageKind;
use crate::query::{
    FetchRequest, Notification, NotificationSink, QueryEvent, ResultItem, SearchState, Severity,
    route_effects,
};
use crate::ui::grid::GridGeometry;

use super::SelectionState;

/// How long a notification stays in the toast bar.
pub const TOAST_DURATION: Duration = Duration::from_millis(3000);

/// Grid rows beyond the visible ones whose thumbnails are fetched ahead.
const THUMBNAIL_LOOKAHEAD_ROWS: usize = 1;

#[derive(Debug, Clone)]
struct Toast {
    severity: Severity,
    message: String,
    expires_at: Instant,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    /// Keyword, accumulated results and paging flags
    pub search: SearchState,
    /// Preview overlay
    pub selection: SelectionState,
    /// Text in the search bar (not yet submitted)
    pub input: String,
    /// Whether keystrokes go to the search bar
    pub input_focused: bool,
    /// Index of the highlighted result
    pub cursor: usize,
    /// First visible grid row
    pub grid_offset: usize,
    /// Terminal width
    pub width: u16,
    /// Terminal height
    pub height: u16,
    /// Whether help overlay is visible
    pub help_visible: bool,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Loading spinner animation frame
    pub spinner_frame: usize,
    /// Whether thumbnails and previews are downloaded and drawn
    pub images_enabled: bool,
    /// Image picker for terminal rendering
    pub picker: Option<Picker>,
    /// Thumbnail protocols keyed by thumbnail URL
    pub thumbnails: HashMap<String, StatefulProtocol>,
    /// Full-size protocol for the selected item, keyed by its image URL
    pub preview: Option<(String, StatefulProtocol)>,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    /// Downloads queued and not yet answered
    requested: HashSet<String>,
    /// Downloads that failed; never retried for the current keyword
    failed: HashSet<String>,
    /// Search generation the thumbnails above belong to
    gallery_generation: u64,
    /// Fetches produced by the state machine and not yet handed to the worker
    pending_fetches: Vec<FetchRequest>,
    toast: Option<Toast>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("search", &self.search)
            .field("selection", &self.selection)
            .field("input", &self.input)
            .field("cursor", &self.cursor)
            .field("grid_offset", &self.grid_offset)
            .field("thumbnails", &self.thumbnails.len())
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Create a new model for a terminal of the given size.
    pub fn new(terminal_size: (u16, u16)) -> Self {
        Self {
            search: SearchState::default(),
            selection: SelectionState::default(),
            input: String::new(),
            input_focused: true,
            cursor: 0,
            grid_offset: 0,
            width: terminal_size.0,
            height: terminal_size.1,
            help_visible: false,
            should_quit: false,
            spinner_frame: 0,
            images_enabled: true,
            picker: None,
            thumbnails: HashMap::new(),
            preview: None,
            config_global_path: None,
            config_local_path: None,
            requested: HashSet::new(),
            failed: HashSet::new(),
            gallery_generation: 0,
            pending_fetches: Vec::new(),
            toast: None,
        }
    }

    /// Set the image picker.
    #[must_use]
    pub fn with_picker(mut self, picker: Option<Picker>) -> Self {
        self.picker = picker;
        self
    }

    /// Feed an event to the search state machine.
    ///
    /// Notifications go straight to the toast bar; fetches are queued until
    /// [`Model::take_fetches`] hands them to the worker. A new generation
    /// resets the grid.
    pub fn apply_query(&mut self, event: QueryEvent) {
        let effects = self.search.handle(event);
        if self.search.generation() != self.gallery_generation {
            self.reset_gallery();
        }
        let fetches = route_effects(effects, self);
        self.pending_fetches.extend(fetches);
    }

    /// Drain fetches waiting to be sent to the search worker.
    pub fn take_fetches(&mut self) -> Vec<FetchRequest> {
        std::mem::take(&mut self.pending_fetches)
    }

    fn reset_gallery(&mut self) {
        self.gallery_generation = self.search.generation();
        self.cursor = 0;
        self.grid_offset = 0;
        self.thumbnails.clear();
        self.requested.clear();
        self.failed.clear();
    }

    pub(super) fn show_toast(&mut self, severity: Severity, message: impl Into<String>) {
        self.toast = Some(Toast {
            severity,
            message: message.into(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, Severity)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.severity))
    }

    /// Geometry of the grid for the current terminal size.
    pub fn grid(&self) -> GridGeometry {
        crate::ui::grid_geometry(self.width, self.height)
    }

    /// Highlighted result, if the grid is not empty.
    pub fn cursor_item(&self) -> Option<&ResultItem> {
        self.search.results().get(self.cursor)
    }

    /// Move the highlight to `index` (clamped) and scroll it into view.
    pub(super) fn set_cursor(&mut self, index: usize) {
        let len = self.search.results().len();
        self.cursor = index.min(len.saturating_sub(1));
        self.grid_offset = self.grid().offset_showing(self.cursor, self.grid_offset);
    }

    /// Scroll the grid by `rows` without moving the highlight.
    pub(super) fn scroll_rows(&mut self, rows: isize) {
        let max = self.grid().max_offset(self.search.results().len());
        self.grid_offset = self.grid_offset.saturating_add_signed(rows).min(max);
    }

    pub(super) fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let grid = self.grid();
        let len = self.search.results().len();
        self.grid_offset = self.grid_offset.min(grid.max_offset(len));
        if len > 0 {
            self.grid_offset = grid.offset_showing(self.cursor, self.grid_offset);
        }
    }

    pub(super) const fn tick_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }

    const fn images_active(&self) -> bool {
        self.images_enabled && self.picker.is_some()
    }

    /// Thumbnails on (or just below) the screen that still need downloading.
    ///
    /// Returned URLs are marked as requested.
    pub fn thumbnails_to_request(&mut self) -> Vec<String> {
        if !self.images_active() {
            return Vec::new();
        }
        let grid = self.grid();
        let len = self.search.results().len();
        let start = self.grid_offset * grid.columns();
        let end = ((self.grid_offset + grid.visible_rows() + THUMBNAIL_LOOKAHEAD_ROWS)
            * grid.columns())
        .min(len);

        let mut wanted = Vec::new();
        for item in self.search.results().get(start..end).unwrap_or_default() {
            let url = &item.thumbnail_url;
            if self.thumbnails.contains_key(url)
                || self.requested.contains(url)
                || self.failed.contains(url)
            {
                continue;
            }
            wanted.push(url.clone());
        }
        self.requested.extend(wanted.iter().cloned());
        wanted
    }

    /// Full-size image for the open preview, if it still needs downloading.
    pub fn preview_to_request(&mut self) -> Option<String> {
        if !self.images_active() {
            return None;
        }
        let url = self.selection.selected()?.image_url.clone();
        let loaded = self.preview.as_ref().is_some_and(|(shown, _)| *shown == url);
        if loaded || self.requested.contains(&url) || self.failed.contains(&url) {
            return None;
        }
        self.requested.insert(url.clone());
        Some(url)
    }

    /// Turn a downloaded image into a protocol. Returns whether the screen changed.
    ///
    /// Images nobody is waiting for any more (the keyword changed, or the
    /// preview was closed) are dropped.
    pub fn install_image(&mut self, url: &str, kind: ImageKind, image: DynamicImage) -> bool {
        if !self.requested.remove(url) {
            crate::debug_log::log_event("image.install.stale", format!("url={url}"));
            return false;
        }
        let Some(picker) = &self.picker else {
            return false;
        };
        let protocol = picker.new_resize_protocol(image);
        match kind {
            ImageKind::Thumbnail => {
                self.thumbnails.insert(url.to_string(), protocol);
                true
            }
            ImageKind::Full => {
                let wanted = self
                    .selection
                    .selected()
                    .is_some_and(|item| item.image_url == url);
                if wanted {
                    self.preview = Some((url.to_string(), protocol));
                }
                wanted
            }
        }
    }

    pub fn mark_image_failed(&mut self, url: &str) {
        if self.requested.remove(url) {
            self.failed.insert(url.to_string());
        }
    }

    pub fn image_failed(&self, url: &str) -> bool {
        self.failed.contains(url)
    }

    /// Whether any download is outstanding.
    pub fn awaiting_images(&self) -> bool {
        !self.requested.is_empty()
    }

    /// Forget the preview download so a re-opened overlay fetches it again.
    pub(super) fn close_preview(&mut self) {
        if let Some(item) = self.selection.selected() {
            let url = item.image_url.clone();
            self.requested.remove(&url);
        }
        self.selection.close();
        self.preview = None;
    }
}

impl NotificationSink for Model {
    fn notify(&mut self, notification: Notification) {
        tracing::debug!(severity = ?notification.severity, message = %notification.message, "toast");
        self.show_toast(notification.severity, notification.message);
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new((80, 24))
    }
}
