use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, update};
use crate::image::{ImageCache, ImageFetcher};
use crate::search::{PixabayClient, SearchWorker};

/// Download threads for thumbnails and previews.
const IMAGE_WORKERS: usize = 4;
/// Decoded images kept in memory.
const IMAGE_CACHE_SIZE: usize = 64;
const SPINNER_INTERVAL: Duration = Duration::from_millis(100);

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Background workers the event loop talks to.
pub(super) struct Services {
    pub(super) search: SearchWorker,
    /// Absent when images are disabled or unsupported
    pub(super) images: Option<ImageFetcher>,
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client, the worker threads or the
    /// terminal cannot be set up, or the event loop hits an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        // Create image picker BEFORE initializing terminal (queries stdio)
        let picker = if self.images_enabled {
            crate::image::create_picker(self.force_half_cell)
        } else {
            None
        };

        let client = PixabayClient::new(self.api_key.clone(), self.endpoint.clone())
            .context("Failed to create HTTP client")?;
        let search = SearchWorker::spawn(client).context("Failed to start search worker")?;
        let images = if picker.is_some() {
            match ImageFetcher::spawn(IMAGE_WORKERS, ImageCache::new(IMAGE_CACHE_SIZE)) {
                Ok(fetcher) => Some(fetcher),
                Err(err) => {
                    tracing::warn!(%err, "image downloads unavailable");
                    None
                }
            }
        } else {
            None
        };
        let services = Services { search, images };

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal - pixgrid requires an interactive terminal")?;
        let size = terminal.size()?;
        crate::debug_log::log_event(
            "init.terminal",
            format!(
                "terminal={}x{} images={}",
                size.width,
                size.height,
                services.images.is_some()
            ),
        );

        let picker = if services.images.is_some() { picker } else { None };
        let mut model = Model::new((size.width, size.height)).with_picker(picker);
        model.images_enabled = self.images_enabled;
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);

        if let Some(keyword) = self.initial_keyword.clone() {
            model.input = keyword;
            model = update(model, Message::SubmitSearch);
            Self::dispatch_fetches(&mut model, &services);
        }

        // Main loop
        let result = execute!(stdout(), EnableMouseCapture)
            .map_err(anyhow::Error::from)
            .and_then(|()| Self::event_loop(&mut terminal, &mut model, &services));

        // Restore terminal
        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();

        result
    }

    fn apply_message(
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        services: &Services,
        msg: Message,
    ) -> Result<()> {
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        Self::handle_message_side_effects(model, services, &side_msg);
        if matches!(side_msg, Message::Redraw) {
            terminal.clear()?;
        }
        Ok(())
    }

    fn event_loop(
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        services: &Services,
    ) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut last_spinner = Instant::now();
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                crate::debug_log::log_event(
                    "event.resize.apply",
                    format!("frame={frame_idx} width={width} height={height}"),
                );
                *model = update(std::mem::take(model), Message::Resize(width, height));
                needs_render = true;
            }

            loop {
                let outcome = match services.search.try_recv() {
                    Ok(Some(outcome)) => outcome,
                    Ok(None) => break,
                    Err(stopped) => {
                        if Self::abandon_in_flight_search(model, stopped) {
                            needs_render = true;
                        }
                        break;
                    }
                };
                crate::debug_log::log_event(
                    "search.outcome",
                    format!(
                        "keyword={} page={} generation={} ok={}",
                        outcome.request.keyword,
                        outcome.request.page,
                        outcome.request.generation,
                        outcome.result.is_ok()
                    ),
                );
                Self::apply_message(
                    terminal,
                    model,
                    services,
                    Message::SearchFinished(outcome.request, outcome.result),
                )?;
                needs_render = true;
            }

            if let Some(images) = services.images.as_ref() {
                while let Some(fetched) = images.try_recv() {
                    match fetched.result {
                        Ok(image) => {
                            if model.install_image(&fetched.url, fetched.kind, image) {
                                needs_render = true;
                            }
                        }
                        Err(err) => {
                            tracing::debug!(url = %fetched.url, %err, "image download failed");
                            model.mark_image_failed(&fetched.url);
                            needs_render = true;
                        }
                    }
                }
            }

            if model.search.is_loading() && last_spinner.elapsed() >= SPINNER_INTERVAL {
                model.tick_spinner();
                last_spinner = Instant::now();
                needs_render = true;
            }

            // Handle events
            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending()
                || model.search.is_loading()
                || model.awaiting_images()
            {
                30
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Refresh timestamp after poll wait so the debouncer uses accurate times.
                let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                let msg =
                    Self::handle_event(&event::read()?, model, event_ms, &mut resize_debouncer);
                if let Some(msg) = msg {
                    crate::debug_log::log_event(
                        "event.message",
                        format!("frame={frame_idx} msg={msg:?}"),
                    );
                    Self::apply_message(terminal, model, services, msg)?;
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single render.
                let mut drained = 0_u32;
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    let msg =
                        Self::handle_event(&event::read()?, model, drain_ms, &mut resize_debouncer);
                    if let Some(msg) = msg {
                        drained += 1;
                        Self::apply_message(terminal, model, services, msg)?;
                        needs_render = true;
                    }
                }
                if drained > 0 {
                    crate::debug_log::log_event(
                        "event.drain",
                        format!("frame={frame_idx} drained={drained}"),
                    );
                }
            }

            if needs_render {
                frame_idx += 1;

                // Queue downloads for whatever is about to be on screen
                Self::request_images(model, services);

                let draw_start = Instant::now();
                terminal.draw(|frame| Self::view(model, frame))?;
                crate::debug_log::log_event(
                    "frame.draw",
                    format!(
                        "frame={} draw_ms={:.3}",
                        frame_idx,
                        draw_start.elapsed().as_secs_f64() * 1000.0
                    ),
                );
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}
