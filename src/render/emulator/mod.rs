mod alacritty_impl;

use crate::grid::GridSize;

/// Cell color as the renderer sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermColor {
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

/// Snapshot of one grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermCell {
    pub symbol: String,
    pub fg: TermColor,
    pub bg: TermColor,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub inverse: bool,
    pub is_wide_continuation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    pub row: u16,
    pub col: u16,
    pub visible: bool,
}

/// Terminal modes that change how keystrokes are encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputModes {
    /// DECCKM: arrow keys send SS3 sequences.
    pub app_cursor: bool,
    /// Mode 2004: pastes are wrapped in bracket markers.
    pub bracketed_paste: bool,
}

/// Escape-sequence interpreter behind the terminal view.
///
/// Coordinates are screen-relative: row 0 is the top visible line.
pub trait TerminalEmulator: Send {
    /// Feed output bytes into the emulator.
    fn process(&mut self, bytes: &[u8]);

    /// Resize the virtual terminal.
    fn set_size(&mut self, size: GridSize);

    fn size(&self) -> GridSize;

    /// Read a single cell at `(row, col)`. Returns `None` if out of bounds.
    fn cell(&self, row: u16, col: u16) -> Option<TermCell>;

    fn cursor(&self) -> CursorState;

    fn input_modes(&self) -> InputModes;
}

/// Build the `alacritty_terminal`-backed emulator.
pub fn create(size: GridSize, scrollback_len: usize) -> Box<dyn TerminalEmulator> {
    Box::new(alacritty_impl::AlacrittyEmulator::new(size, scrollback_len))
}
