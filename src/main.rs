//! Pixgrid - a terminal image search gallery.
//!
//! # Usage
//!
//! ```bash
//! pixgrid --api-key KEY
//! pixgrid --api-key KEY mountain lake
//! PIXABAY_API_KEY=KEY pixgrid --force-half-cell cats
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use pixgrid::app::App;
use pixgrid::config::{
    API_KEY_ENV, ConfigFlags, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use pixgrid::debug_log;
use pixgrid::search::DEFAULT_ENDPOINT;

/// Search an image library and browse the results in the terminal
#[derive(Parser, Debug)]
#[command(name = "pixgrid", version, about, long_about = None)]
struct Cli {
    /// Keyword to search for on startup
    #[arg(value_name = "KEYWORD")]
    keyword: Vec<String>,

    /// Pixabay API key (falls back to PIXABAY_API_KEY)
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    /// Search endpoint URL
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Show text tiles instead of downloading images
    #[arg(long)]
    no_images: bool,

    /// Force image rendering to use half-cell fallback mode
    #[arg(long)]
    force_half_cell: bool,

    /// Write detailed render/network debug events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os("PIXGRID_RENDER_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = debug_log::set_debug_log_path(render_debug_log_path.as_deref()) {
        eprintln!(
            "[warn] Failed to initialize render debug log {}: {}",
            render_debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            err
        );
    }

    let Some(api_key) = effective
        .api_key
        .clone()
        .or_else(|| std::env::var(API_KEY_ENV).ok())
        .filter(|key| !key.trim().is_empty())
    else {
        anyhow::bail!(
            "No API key configured: pass --api-key KEY (add --save to remember it) or set {API_KEY_ENV}"
        );
    };

    let keyword = cli.keyword.join(" ");
    let initial_keyword = (!keyword.trim().is_empty()).then_some(keyword);
    tracing::debug!(?initial_keyword, endpoint = ?effective.endpoint, "starting");

    // Run the application
    let mut app = App::new(api_key)
        .with_endpoint(
            effective
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        )
        .with_initial_keyword(initial_keyword)
        .with_force_half_cell(effective.force_half_cell)
        .with_images_enabled(!effective.no_images)
        .with_config_paths(
            Some(global_path.clone()),
            if local_path.exists() {
                Some(local_path.clone())
            } else {
                None
            },
        );

    app.run().context("Application error")
}
