//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`grid`]: Thumbnail grid geometry and hit testing
//! - Screen layout shared by rendering and mouse handling

pub mod grid;

mod images;
mod overlays;
mod render;
mod status;

pub use render::{ScreenLayout, grid_geometry, load_more_button_rect, render, screen_layout};

/// Label of the load-more control.
pub const LOAD_MORE_LABEL: &str = "[ Load more (m) ]";
