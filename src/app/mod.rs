//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod selection;
mod update;

pub use model::{Model, TOAST_DURATION};
pub use selection::SelectionState;
pub use update::{Message, update};

use std::path::PathBuf;

use crate::search::DEFAULT_ENDPOINT;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    api_key: String,
    endpoint: String,
    initial_keyword: Option<String>,
    images_enabled: bool,
    force_half_cell: bool,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application talking to the default endpoint with `api_key`.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            initial_keyword: None,
            images_enabled: true,
            force_half_cell: false,
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Use a different search endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Search for `keyword` as soon as the UI starts.
    #[must_use]
    pub fn with_initial_keyword(mut self, keyword: Option<String>) -> Self {
        self.initial_keyword = keyword;
        self
    }

    /// Enable or disable thumbnail and preview rendering.
    #[must_use]
    pub const fn with_images_enabled(mut self, enabled: bool) -> Self {
        self.images_enabled = enabled;
        self
    }

    /// Skip terminal graphics detection and draw images with half-blocks.
    #[must_use]
    pub const fn with_force_half_cell(mut self, force: bool) -> Self {
        self.force_half_cell = force;
        self
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }
}
