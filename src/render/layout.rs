use ratatui::layout::Rect;

/// Height of the status line under the terminal body.
pub const FOOTER_HEIGHT: u16 = 1;

/// Split the screen into the terminal body and the status line.
pub fn layout_regions(area: Rect) -> (Rect, Rect) {
    let footer_height = FOOTER_HEIGHT.min(area.height);
    let body = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: area.height - footer_height,
    };
    let footer = Rect {
        x: area.x,
        y: area.y + body.height,
        width: area.width,
        height: footer_height,
    };
    (body, footer)
}

pub fn body_rect(area: Rect) -> Rect {
    layout_regions(area).0
}
