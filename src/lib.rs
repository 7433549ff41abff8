// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. search::SearchState)
    clippy::module_name_repetitions
)]

//! # Pixgrid
//!
//! A terminal image search gallery.
//!
//! Pixgrid queries a Pixabay-compatible search endpoint and shows:
//! - A thumbnail grid that grows a page at a time ("load more")
//! - A full-size preview overlay for the selected image
//! - Toast notifications for result counts and failures
//! - Images via Kitty, Sixel, iTerm2 or half-block fallback
//!
//! ## Architecture
//!
//! Pixgrid uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! The paging rules live in a separate, I/O-free state machine
//! ([`query::SearchState`]) that the model drives.
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`query`]: Keyword/pagination state machine and notifications
//! - [`search`]: Search endpoint client and background worker
//! - [`image`]: Image downloading, caching and protocol detection
//! - [`ui`]: Terminal UI components
//! - [`config`]: Persisted default flags
//! - [`debug_log`]: Optional render/network event log

pub mod app;
pub mod config;
pub mod debug_log;
pub mod image;
pub mod query;
pub mod search;
pub mod ui;
