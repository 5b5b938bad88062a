use ratatui::backend::Backend;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Terminal;

use super::emulator::{self, InputModes, TerminalEmulator};
use super::layout::{body_rect, layout_regions};
use super::widget::TerminalBody;
use super::{Renderer, WriteCompletion};
use crate::grid::GridSize;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Production renderer: an emulated grid drawn into a ratatui terminal.
///
/// Each [`Renderer::write`] feeds the chunk to the emulator and draws exactly
/// one frame before completing, so one coordinator flush costs one redraw.
pub struct TerminalView<B: Backend> {
    terminal: Terminal<B>,
    emulator: Box<dyn TerminalEmulator>,
}

impl<B: Backend> TerminalView<B> {
    pub fn new(terminal: Terminal<B>, size: GridSize, scrollback_len: usize) -> Self {
        Self {
            terminal,
            emulator: emulator::create(size, scrollback_len),
        }
    }

    /// Resize the grid to the body area of `screen`. Returns the new size.
    pub fn fit(&mut self, screen: Rect) -> GridSize {
        let body = body_rect(screen);
        let size = GridSize::new(body.height.max(1), body.width.max(1));
        if size != self.emulator.size() {
            tracing::debug!(%size, "grid resized");
            self.emulator.set_size(size);
        }
        size
    }

    pub fn fit_to_screen(&mut self) -> Result<GridSize, B::Error> {
        let screen = self.terminal.size()?;
        Ok(self.fit(Rect::new(0, 0, screen.width, screen.height)))
    }

    pub fn draw(&mut self) -> Result<(), B::Error> {
        let emulator = self.emulator.as_ref();
        self.terminal.draw(|frame| {
            let (body, footer) = layout_regions(frame.area());
            frame.render_widget(TerminalBody::new(emulator), body);
            frame.render_widget(status_line(emulator.size()), footer);

            let cursor = emulator.cursor();
            if cursor.visible && cursor.row < body.height && cursor.col < body.width {
                frame.set_cursor_position(Position::new(body.x + cursor.col, body.y + cursor.row));
            }
        })?;
        Ok(())
    }

    pub fn input_modes(&self) -> InputModes {
        self.emulator.input_modes()
    }
}

impl<B: Backend> Renderer for TerminalView<B> {
    fn write(&mut self, chunk: String) -> WriteCompletion {
        self.emulator.process(chunk.as_bytes());
        if let Err(err) = self.draw() {
            tracing::error!("draw failed: {}", err);
        }
        WriteCompletion::completed()
    }

    fn measure(&self) -> GridSize {
        self.emulator.size()
    }
}

fn status_line(size: GridSize) -> Paragraph<'static> {
    let style = Style::default().add_modifier(Modifier::DIM);
    let text = format!(" frameterm v{} │ Ctrl+Q: Quit │ {}", VERSION, size);
    Paragraph::new(Line::from(Span::styled(text, style))).style(style)
}
