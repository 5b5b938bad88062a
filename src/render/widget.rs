use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;

use super::emulator::{TermCell, TermColor, TerminalEmulator};

/// Draws the emulator's visible screen into a ratatui buffer.
pub struct TerminalBody<'a> {
    emulator: &'a dyn TerminalEmulator,
}

impl<'a> TerminalBody<'a> {
    pub fn new(emulator: &'a dyn TerminalEmulator) -> Self {
        Self { emulator }
    }
}

impl Widget for TerminalBody<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            let y = area.y + row;
            for col in 0..area.width {
                let x = area.x + col;
                let Some(cell) = self.emulator.cell(row, col) else {
                    continue;
                };
                // The leading half of a wide glyph already covers this column.
                if cell.is_wide_continuation {
                    continue;
                }
                let Some(target) = buf.cell_mut((x, y)) else {
                    continue;
                };
                let symbol = if cell.symbol.is_empty() {
                    " "
                } else {
                    cell.symbol.as_str()
                };
                target.set_symbol(symbol).set_style(style_from_cell(&cell));
            }
        }
    }
}

fn style_from_cell(cell: &TermCell) -> Style {
    let mut style = Style::default();

    if let Some(color) = convert_color(cell.fg) {
        style = style.fg(color);
    }
    if let Some(color) = convert_color(cell.bg) {
        style = style.bg(color);
    }

    if cell.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if cell.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if cell.underline {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if cell.inverse {
        style = style.add_modifier(Modifier::REVERSED);
    }

    style
}

fn convert_color(color: TermColor) -> Option<Color> {
    match color {
        TermColor::Default => None,
        TermColor::Indexed(idx) => Some(Color::Indexed(idx)),
        TermColor::Rgb(r, g, b) => Some(Color::Rgb(r, g, b)),
    }
}
