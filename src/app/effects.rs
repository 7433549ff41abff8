use std::process::Stdio;

use crate::app::{App, Message, Model};
use crate::image::ImageKind;
use crate::query::{NetworkError, QueryEvent, Severity};
use crate::search::WorkerStopped;

use super::event_loop::Services;

impl App {
    pub(super) fn handle_message_side_effects(
        model: &mut Model,
        services: &Services,
        msg: &Message,
    ) {
        Self::dispatch_fetches(model, services);

        if matches!(msg, Message::OpenInBrowser) {
            let Some(url) = model.selection.selected().map(|item| item.image_url.clone()) else {
                return;
            };
            crate::debug_log::log_event("browser.open", format!("url={url}"));
            match open_external_link(&url) {
                Ok(()) => model.show_toast(Severity::Info, "Opened in browser"),
                Err(err) => {
                    tracing::warn!(%url, %err, "failed to open browser");
                    model.show_toast(Severity::Error, format!("Open failed: {err}"));
                }
            }
        }
    }

    /// Hand queued page requests to the search worker.
    ///
    /// A request the worker can no longer accept completes as a failure so
    /// the state machine leaves `Loading`.
    pub(super) fn dispatch_fetches(model: &mut Model, services: &Services) {
        for request in model.take_fetches() {
            if let Err(request) = services.search.submit(request) {
                tracing::error!(keyword = %request.keyword, page = request.page, "search worker stopped");
                model.apply_query(QueryEvent::Completed {
                    request,
                    result: Err(NetworkError::Transport("search worker stopped".to_string())),
                });
            }
        }
    }

    /// Fail the outstanding page request once the worker can no longer answer it.
    ///
    /// Returns whether a request was pending.
    pub(super) fn abandon_in_flight_search(model: &mut Model, stopped: WorkerStopped) -> bool {
        let Some(request) = model.search.in_flight().cloned() else {
            return false;
        };
        tracing::error!(
            keyword = %request.keyword,
            page = request.page,
            "search worker stopped mid-request"
        );
        model.apply_query(QueryEvent::Completed {
            request,
            result: Err(NetworkError::Transport(stopped.to_string())),
        });
        true
    }

    /// Queue downloads for visible thumbnails and the open preview.
    pub(super) fn request_images(model: &mut Model, services: &Services) {
        let Some(images) = services.images.as_ref() else {
            return;
        };
        for url in model.thumbnails_to_request() {
            if !images.request(&url, ImageKind::Thumbnail) {
                model.mark_image_failed(&url);
            }
        }
        if let Some(url) = model.preview_to_request()
            && !images.request(&url, ImageKind::Full)
        {
            model.mark_image_failed(&url);
        }
    }
}

fn open_external_link(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?
            .wait()?;
        Ok(())
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", url])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        return Ok(());
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?
            .wait()?;
        Ok(())
    }
}
