use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

use crate::app::Model;

use super::images;
use super::render::truncate_to_width;

/// Popup rectangle of the full-size preview.
pub fn preview_rect(area: Rect) -> Rect {
    let width = area.width.saturating_sub(8).max(30);
    let height = area.height.saturating_sub(4).max(10);
    centered_popup_rect(width, height, area)
}

pub fn render_preview_overlay(model: &mut Model, frame: &mut Frame, area: Rect) {
    let Some(item) = model.selection.selected().cloned() else {
        return;
    };
    let popup = preview_rect(area);
    let title = truncate_to_width(&item.tags, usize::from(popup.width.saturating_sub(4)));
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));
    let inner = block.inner(popup);
    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);
    if inner.height < 2 {
        return;
    }

    let image_area = Rect {
        height: inner.height - 1,
        ..inner
    };
    let footer_area = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);

    let shown = match model.preview.as_mut() {
        Some((url, protocol)) if *url == item.image_url => {
            images::render_protocol(frame, image_area, protocol);
            true
        }
        _ => false,
    };
    if !shown {
        let text = if !model.images_enabled || model.picker.is_none() {
            item.image_url.clone()
        } else if model.image_failed(&item.image_url) {
            "Image unavailable".to_string()
        } else {
            "Loading full image…".to_string()
        };
        let y = image_area.y + image_area.height / 2;
        frame.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(Color::Indexed(245))),
            Rect::new(image_area.x, y, image_area.width, image_area.bottom() - y),
        );
    }

    let footer = Line::styled(
        "Esc or click closes \u{2502} o opens in browser",
        Style::default().fg(Color::Indexed(245)),
    );
    frame.render_widget(Paragraph::new(footer), footer_area);
}

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Indexed(245));

    let lines = vec![
        Line::styled("Search", section_style),
        Line::raw("  / or s              Focus search bar"),
        Line::raw("  Enter               Submit keyword"),
        Line::raw("  Esc                 Leave search bar"),
        Line::raw(""),
        Line::styled("Gallery", section_style),
        Line::raw("  Arrows or h/j/k/l   Move selection"),
        Line::raw("  PageUp/PageDown     Page up / down"),
        Line::raw("  g / G               First / last image"),
        Line::raw("  Enter/Space, click  Open preview"),
        Line::raw("  m / n               Load more"),
        Line::raw("  Mouse wheel         Scroll"),
        Line::raw(""),
        Line::styled("Preview", section_style),
        Line::raw("  o                   Open in browser"),
        Line::raw("  Esc/q/Enter, click  Close"),
        Line::raw(""),
        Line::styled("Other", section_style),
        Line::raw("  Ctrl-l              Redraw"),
        Line::raw("  q / Ctrl-c          Quit"),
        Line::raw("  ? / F1              Toggle help"),
        Line::raw(""),
        Line::styled("Config", section_style),
        Line::raw(format!("  Global: {global_cfg}")),
        Line::raw(format!("  Local override: {local_cfg}")),
    ];

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));
    let inner = block.inner(popup);
    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    // Reserve 1 row at bottom for footer hint
    let content_height = inner.height.saturating_sub(1);
    frame.render_widget(
        Paragraph::new(lines),
        Rect::new(inner.x, inner.y, inner.width, content_height),
    );
    let footer_area = Rect::new(inner.x, inner.y + content_height, inner.width, 1);
    frame.render_widget(
        Paragraph::new(Line::styled("any key closes", dim_style)),
        footer_area,
    );
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
