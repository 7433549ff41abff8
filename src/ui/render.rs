use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::app::Model;
use crate::query::Phase;

use super::grid::GridGeometry;
use super::{LOAD_MORE_LABEL, images, overlays, status};

/// Screen regions, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub search_bar: Rect,
    pub grid: Rect,
    /// Spinner or load-more control
    pub action: Rect,
    pub toast: Rect,
    pub status: Rect,
}

/// Split the terminal into fixed regions.
///
/// The footer rows are always reserved so that mouse hit testing does not
/// depend on whether a toast is showing.
pub fn screen_layout(area: Rect) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
    ScreenLayout {
        search_bar: chunks[0],
        grid: chunks[1],
        action: chunks[2],
        toast: chunks[3],
        status: chunks[4],
    }
}

/// Grid geometry for a terminal of the given size.
pub fn grid_geometry(width: u16, height: u16) -> GridGeometry {
    GridGeometry::new(screen_layout(Rect::new(0, 0, width, height)).grid)
}

/// Clickable area of the load-more control inside the action row.
pub fn load_more_button_rect(action: Rect) -> Rect {
    let width = u16::try_from(LOAD_MORE_LABEL.width())
        .unwrap_or(u16::MAX)
        .min(action.width);
    let x = action.x + action.width.saturating_sub(width) / 2;
    Rect::new(x, action.y, width, action.height.min(1))
}

/// Render the complete UI.
pub fn render(model: &mut Model, frame: &mut Frame) {
    let area = frame.area();
    let layout = screen_layout(area);

    render_search_bar(model, frame, layout.search_bar);
    render_grid(model, frame, layout.grid);
    render_action_row(model, frame, layout.action);
    status::render_toast_bar(model, frame, layout.toast);
    status::render_status_bar(model, frame, layout.status);

    if model.selection.is_open() {
        overlays::render_preview_overlay(model, frame, area);
    }
    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_search_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let border_style = if model.input_focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(" Search images ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let line = if model.input.is_empty() && !model.input_focused {
        Line::styled(
            "Press / to type a keyword",
            Style::default().fg(Color::Indexed(245)),
        )
    } else {
        Line::raw(model.input.as_str())
    };
    let inner = block.inner(area);
    frame.render_widget(Paragraph::new(line).block(block), area);

    if model.input_focused && inner.width > 0 && inner.height > 0 {
        let typed = u16::try_from(model.input.width()).unwrap_or(u16::MAX);
        let x = inner.x + typed.min(inner.width.saturating_sub(1));
        frame.set_cursor_position(Position::new(x, inner.y));
    }
}

fn render_grid(model: &mut Model, frame: &mut Frame, area: Rect) {
    let results_len = model.search.results().len();
    if results_len == 0 {
        render_empty_hint(model, frame, area);
        return;
    }

    let grid = GridGeometry::new(area);
    let range = grid.visible_range(model.grid_offset, results_len);
    crate::debug_log::log_event(
        "render.grid",
        format!(
            "area={}x{} columns={} offset={} range={:?} thumbnails={}",
            area.width,
            area.height,
            grid.columns(),
            model.grid_offset,
            range,
            model.thumbnails.len()
        ),
    );

    for index in range {
        let Some(tile) = grid.tile_rect(index, model.grid_offset) else {
            continue;
        };
        render_tile(model, frame, tile, index);
    }
}

fn render_tile(model: &mut Model, frame: &mut Frame, tile: Rect, index: usize) {
    let Some(item) = model.search.results().get(index).cloned() else {
        return;
    };
    let highlighted = index == model.cursor && !model.input_focused;
    let block = Block::default().borders(Borders::ALL).border_style(if highlighted {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    });
    let inner = block.inner(tile);
    frame.render_widget(block, tile);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let image_area = Rect {
        height: inner.height.saturating_sub(1),
        ..inner
    };
    let caption_area = Rect {
        y: inner.y + inner.height.saturating_sub(1),
        height: 1,
        ..inner
    };

    if let Some(protocol) = model.thumbnails.get_mut(&item.thumbnail_url) {
        images::render_protocol(frame, image_area, protocol);
    } else if image_area.height > 0 {
        let placeholder = if model.images_enabled && model.picker.is_some() {
            "loading…"
        } else {
            "[image]"
        };
        let y = image_area.y + image_area.height / 2;
        frame.render_widget(
            Paragraph::new(placeholder)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Indexed(245))),
            Rect::new(image_area.x, y, image_area.width, 1),
        );
    }

    let caption = truncate_to_width(&item.tags, usize::from(caption_area.width));
    let caption_style = if highlighted {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    frame.render_widget(Paragraph::new(caption).style(caption_style), caption_area);
}

fn render_empty_hint(model: &Model, frame: &mut Frame, area: Rect) {
    let hint = match model.search.phase() {
        Phase::Idle => "Type a keyword and press Enter to search",
        Phase::Loading => return,
        Phase::Ready if model.search.page() > 0 => "No images to show",
        Phase::Ready => "Press Enter to try again",
    };
    let y = area.y + area.height / 2;
    frame.render_widget(
        Paragraph::new(hint)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Indexed(245))),
        Rect::new(area.x, y, area.width, area.height.min(1)),
    );
}

fn render_action_row(model: &Model, frame: &mut Frame, area: Rect) {
    if model.search.is_loading() {
        status::render_spinner(model, frame, area);
    } else if model.search.can_load_more() {
        let button = load_more_button_rect(area);
        frame.render_widget(
            Paragraph::new(LOAD_MORE_LABEL).style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            button,
        );
    }
}

/// Cut `text` to at most `max` display columns, marking the cut with an ellipsis.
pub(super) fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}
