use crate::app::Model;
use crate::query::{FetchRequest, NetworkError, QueryEvent, SearchPage};

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Search bar
    /// Move keyboard focus to the search bar
    FocusSearch,
    /// Replace the search bar text
    SearchInput(String),
    /// Submit the search bar text as the keyword
    SubmitSearch,
    /// Leave the search bar without submitting
    BlurSearch,

    // Paging
    /// Request the next page of results
    LoadMore,
    /// A page request finished
    SearchFinished(FetchRequest, Result<SearchPage, NetworkError>),

    // Grid navigation
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    /// Jump to the first result
    CursorHome,
    /// Jump to the last loaded result
    CursorEnd,
    /// Move the highlight one screen up
    PageUp,
    /// Move the highlight one screen down
    PageDown,
    /// Scroll the grid up by n rows
    ScrollUp(usize),
    /// Scroll the grid down by n rows
    ScrollDown(usize),

    // Preview overlay
    /// Open the preview on the highlighted result
    OpenPreview,
    /// Highlight result n and open the preview on it
    SelectItem(usize),
    /// Close the preview
    ClosePreview,
    /// Open the previewed image in the system browser
    OpenInBrowser,

    // Application
    /// Toggle help overlay
    ToggleHelp,
    /// Hide help overlay
    HideHelp,
    /// Terminal resized
    Resize(u16, u16),
    /// Force a full redraw
    Redraw,
    /// Quit the application
    Quit,
}

/// Pure state transition: apply `msg` to `model`.
///
/// Network and browser work is requested through the model and carried out
/// by the event loop.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        Message::FocusSearch => {
            model.input_focused = true;
        }
        Message::SearchInput(text) => {
            model.input = text;
        }
        Message::SubmitSearch => {
            let keyword = model.input.clone();
            if !keyword.trim().is_empty() {
                model.input_focused = false;
            }
            model.apply_query(QueryEvent::Submit(keyword));
        }
        Message::BlurSearch => {
            model.input_focused = false;
        }

        Message::LoadMore => model.apply_query(QueryEvent::LoadMore),
        Message::SearchFinished(request, result) => {
            model.apply_query(QueryEvent::Completed { request, result });
        }

        Message::CursorLeft => {
            if model.cursor > 0 {
                model.set_cursor(model.cursor - 1);
            }
        }
        Message::CursorRight => model.set_cursor(model.cursor + 1),
        Message::CursorUp => {
            let columns = model.grid().columns();
            if model.cursor >= columns {
                model.set_cursor(model.cursor - columns);
            }
        }
        Message::CursorDown => cursor_down(&mut model),
        Message::CursorHome => model.set_cursor(0),
        Message::CursorEnd => model.set_cursor(usize::MAX),
        Message::PageUp => {
            let page = model.grid().page_len();
            model.set_cursor(model.cursor.saturating_sub(page));
        }
        Message::PageDown => {
            let page = model.grid().page_len();
            model.set_cursor(model.cursor.saturating_add(page));
        }
        Message::ScrollUp(rows) => {
            model.scroll_rows(-isize::try_from(rows).unwrap_or(isize::MAX));
        }
        Message::ScrollDown(rows) => {
            model.scroll_rows(isize::try_from(rows).unwrap_or(isize::MAX));
        }

        Message::OpenPreview => {
            if let Some(item) = model.cursor_item().cloned() {
                model.selection.select(item);
            }
        }
        Message::SelectItem(index) => {
            if let Some(item) = model.search.results().get(index).cloned() {
                model.set_cursor(index);
                model.selection.select(item);
            }
        }
        Message::ClosePreview => model.close_preview(),

        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
        }
        Message::HideHelp => {
            model.help_visible = false;
        }
        Message::Resize(width, height) => model.resize(width, height),
        Message::Quit => {
            model.should_quit = true;
        }

        // Side effects only (handled in effects)
        Message::OpenInBrowser | Message::Redraw => {}
    }
    model
}

fn cursor_down(model: &mut Model) {
    let len = model.search.results().len();
    if len == 0 {
        return;
    }
    let grid = model.grid();
    let next = model.cursor + grid.columns();
    if next < len {
        model.set_cursor(next);
    } else if grid.row_of(len - 1) > grid.row_of(model.cursor) {
        // Short last row: land on its final tile.
        model.set_cursor(len - 1);
    }
}
