use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Frame;
use ratatui::layout::{Position, Rect};

use crate::app::{App, Message, Model};

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                crate::debug_log::log_event("event.resize.queue", format!("width={w} height={h}"));
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        let click = matches!(mouse.kind, MouseEventKind::Up(MouseButton::Left));
        if model.help_visible {
            return click.then_some(Message::HideHelp);
        }
        if model.selection.is_open() {
            return click.then_some(Message::ClosePreview);
        }

        let layout = crate::ui::screen_layout(Rect::new(0, 0, model.width, model.height));
        let point = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Up(MouseButton::Left) => {
                if layout.search_bar.contains(point) {
                    return Some(Message::FocusSearch);
                }
                if model.search.can_load_more()
                    && crate::ui::load_more_button_rect(layout.action).contains(point)
                {
                    return Some(Message::LoadMore);
                }
                crate::ui::grid::GridGeometry::new(layout.grid)
                    .tile_at(
                        mouse.column,
                        mouse.row,
                        model.grid_offset,
                        model.search.results().len(),
                    )
                    .map(Message::SelectItem)
            }
            MouseEventKind::ScrollDown if layout.grid.contains(point) => {
                Some(Message::ScrollDown(1))
            }
            MouseEventKind::ScrollUp if layout.grid.contains(point) => Some(Message::ScrollUp(1)),
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return Some(Message::Quit);
        }

        if model.help_visible {
            return Some(Message::HideHelp);
        }

        if model.selection.is_open() {
            return match key.code {
                KeyCode::Char('o') => Some(Message::OpenInBrowser),
                KeyCode::Esc
                | KeyCode::Enter
                | KeyCode::Backspace
                | KeyCode::Char(' ' | 'q') => Some(Message::ClosePreview),
                _ => None,
            };
        }

        if model.input_focused {
            return match key.code {
                KeyCode::Esc | KeyCode::Tab => Some(Message::BlurSearch),
                KeyCode::Enter => Some(Message::SubmitSearch),
                KeyCode::Backspace => {
                    let mut next = model.input.clone();
                    next.pop();
                    Some(Message::SearchInput(next))
                }
                KeyCode::Char('u') if ctrl => Some(Message::SearchInput(String::new())),
                KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                    let mut next = model.input.clone();
                    next.push(c);
                    Some(Message::SearchInput(next))
                }
                _ => None,
            };
        }

        // Normal key handling
        match key.code {
            KeyCode::Char('l') if ctrl => Some(Message::Redraw),

            // Navigation
            KeyCode::Char('h') | KeyCode::Left => Some(Message::CursorLeft),
            KeyCode::Char('l') | KeyCode::Right => Some(Message::CursorRight),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::CursorUp),
            KeyCode::Char('j') | KeyCode::Down => Some(Message::CursorDown),
            KeyCode::Char('g') | KeyCode::Home => Some(Message::CursorHome),
            KeyCode::Char('G') | KeyCode::End => Some(Message::CursorEnd),
            KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::PageDown => Some(Message::PageDown),
            KeyCode::Enter | KeyCode::Char(' ') => Some(Message::OpenPreview),

            // Search
            KeyCode::Char('/' | 's') => Some(Message::FocusSearch),
            KeyCode::Char('m' | 'n') => Some(Message::LoadMore),

            KeyCode::Char('?') | KeyCode::F(1) => Some(Message::ToggleHelp),
            KeyCode::Char('q') => Some(Message::Quit),

            _ => None,
        }
    }

    pub(super) fn view(model: &mut Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}
