use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::Model;
use crate::query::{Phase, Severity};

const SPINNER_FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let search = &model.search;
    let keyword = if search.keyword().is_empty() {
        "<none>"
    } else {
        search.keyword()
    };
    let phase = match search.phase() {
        Phase::Idle => "idle",
        Phase::Loading => "loading",
        Phase::Ready => "ready",
    };
    let more = if search.has_more() { " [more]" } else { "" };
    let status = format!(
        " {}  page {}  {}/{} shown  {}{}  ?:help",
        keyword,
        search.page(),
        search.results().len(),
        search.total_hits(),
        phase,
        more
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, severity)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match severity {
        Severity::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        Severity::Success => ("[ok]", Style::default().bg(Color::Green).fg(Color::Black)),
        Severity::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        Severity::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}

pub fn render_spinner(model: &Model, frame: &mut Frame, area: Rect) {
    let glyph = SPINNER_FRAMES[model.spinner_frame % SPINNER_FRAMES.len()];
    let text = format!("{glyph} Loading…");
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Cyan)),
        area,
    );
}
