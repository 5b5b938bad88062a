use super::{CursorState, InputModes, TermCell, TermColor, TerminalEmulator};
use crate::grid::GridSize;
use alacritty_terminal::event::EventListener;
use alacritty_terminal::grid::Dimensions;
use alacritty_terminal::index::{Column, Line};
use alacritty_terminal::term::cell::Flags;
use alacritty_terminal::term::{Config, TermMode};
use alacritty_terminal::vte::ansi::{Color, NamedColor, Timeout};
use std::time::Duration;

struct NoOpListener;

impl EventListener for NoOpListener {
    fn send_event(&self, _event: alacritty_terminal::event::Event) {}
}

/// No-op timeout that disables synchronized output buffering.
///
/// Output is already batched per frame before it reaches the emulator, so
/// holding it back again for CSI ?2026 only delays the next draw.
#[derive(Default)]
struct NoSyncTimeout;

impl Timeout for NoSyncTimeout {
    fn set_timeout(&mut self, _duration: Duration) {}
    fn clear_timeout(&mut self) {}
    fn pending_timeout(&self) -> bool {
        false
    }
}

/// Terminal dimensions for alacritty's `Dimensions` trait.
struct TermSize {
    lines: usize,
    cols: usize,
}

impl From<GridSize> for TermSize {
    fn from(size: GridSize) -> Self {
        Self {
            lines: usize::from(size.rows.max(1)),
            cols: usize::from(size.cols.max(1)),
        }
    }
}

impl Dimensions for TermSize {
    fn total_lines(&self) -> usize {
        self.lines
    }

    fn screen_lines(&self) -> usize {
        self.lines
    }

    fn columns(&self) -> usize {
        self.cols
    }
}

pub(super) struct AlacrittyEmulator {
    term: alacritty_terminal::Term<NoOpListener>,
    processor: alacritty_terminal::vte::ansi::Processor<NoSyncTimeout>,
}

impl AlacrittyEmulator {
    pub(super) fn new(size: GridSize, scrollback_len: usize) -> Self {
        let config = Config {
            scrolling_history: scrollback_len,
            ..Config::default()
        };

        let term = alacritty_terminal::Term::new(config, &TermSize::from(size), NoOpListener);
        let processor = alacritty_terminal::vte::ansi::Processor::default();

        Self { term, processor }
    }
}

impl TerminalEmulator for AlacrittyEmulator {
    fn process(&mut self, bytes: &[u8]) {
        self.processor.advance(&mut self.term, bytes);
    }

    fn set_size(&mut self, size: GridSize) {
        self.term.resize(TermSize::from(size));
    }

    fn size(&self) -> GridSize {
        GridSize {
            rows: u16::try_from(self.term.screen_lines()).unwrap_or(u16::MAX),
            cols: u16::try_from(self.term.columns()).unwrap_or(u16::MAX),
        }
    }

    fn cell(&self, row: u16, col: u16) -> Option<TermCell> {
        let grid = self.term.grid();
        if usize::from(row) >= grid.screen_lines() || usize::from(col) >= grid.columns() {
            return None;
        }

        let cell = &grid[Line(i32::from(row))][Column(usize::from(col))];

        let symbol = if cell.c == '\0' {
            String::new()
        } else {
            let mut s = String::with_capacity(4);
            s.push(cell.c);
            if let Some(zerowidth) = cell.zerowidth() {
                s.extend(zerowidth.iter());
            }
            s
        };

        Some(TermCell {
            symbol,
            fg: convert_color(cell.fg),
            bg: convert_color(cell.bg),
            bold: cell.flags.contains(Flags::BOLD),
            italic: cell.flags.contains(Flags::ITALIC),
            underline: cell.flags.intersects(Flags::ALL_UNDERLINES),
            inverse: cell.flags.contains(Flags::INVERSE),
            is_wide_continuation: cell.flags.contains(Flags::WIDE_CHAR_SPACER),
        })
    }

    fn cursor(&self) -> CursorState {
        let point = self.term.grid().cursor.point;
        CursorState {
            row: u16::try_from(point.line.0).unwrap_or(0),
            col: u16::try_from(point.column.0).unwrap_or(0),
            visible: self.term.mode().contains(TermMode::SHOW_CURSOR),
        }
    }

    fn input_modes(&self) -> InputModes {
        let mode = self.term.mode();
        InputModes {
            app_cursor: mode.contains(TermMode::APP_CURSOR),
            bracketed_paste: mode.contains(TermMode::BRACKETED_PASTE),
        }
    }
}

fn convert_color(color: Color) -> TermColor {
    match color {
        Color::Named(NamedColor::Foreground) | Color::Named(NamedColor::Background) => {
            TermColor::Default
        }
        // Only the 16 ANSI names map onto palette indices; dim and cursor
        // variants fall back to the default color.
        Color::Named(name) => u8::try_from(name as usize)
            .map(TermColor::Indexed)
            .unwrap_or(TermColor::Default),
        Color::Indexed(idx) => TermColor::Indexed(idx),
        Color::Spec(rgb) => TermColor::Rgb(rgb.r, rgb.g, rgb.b),
    }
}
