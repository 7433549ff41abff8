use ratatui::prelude::*;
use ratatui_image::protocol::{StatefulProtocol, StatefulProtocolType};
use ratatui_image::{Resize, StatefulImage};

use crate::image::{rgb_to_xterm_256, supports_truecolor_terminal};

/// Draw an image protocol into `area`, scaled to fit.
pub fn render_protocol(frame: &mut Frame, area: Rect, protocol: &mut StatefulProtocol) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let halfblocks = matches!(protocol.protocol_type(), StatefulProtocolType::Halfblocks(_));
    let resize = if halfblocks {
        // Nearest-neighbor aliases badly at half-cell resolution.
        Resize::Scale(Some(image::imageops::FilterType::CatmullRom))
    } else {
        Resize::Scale(None)
    };
    StatefulImage::default()
        .resize(resize)
        .render(area, frame.buffer_mut(), protocol);

    if halfblocks && !supports_truecolor_terminal() {
        downsample_colors(frame.buffer_mut(), area);
    }
    crate::debug_log::log_event(
        "render.image",
        format!(
            "area={}x{}+{}+{} halfblocks={halfblocks}",
            area.width, area.height, area.x, area.y
        ),
    );
}

/// Replace truecolor cells in `area` with their nearest 256-color index.
pub(super) fn downsample_colors(buf: &mut Buffer, area: Rect) {
    let area = area.intersection(buf.area);
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            let cell = &mut buf[(x, y)];
            if let Color::Rgb(r, g, b) = cell.fg {
                cell.fg = Color::Indexed(rgb_to_xterm_256(r, g, b));
            }
            if let Color::Rgb(r, g, b) = cell.bg {
                cell.bg = Color::Indexed(rgb_to_xterm_256(r, g, b));
            }
        }
    }
}
