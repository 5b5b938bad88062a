//! Keyboard and paste encoding for the shell's input stream.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::emulator::InputModes;

const PASTE_START: &str = "\x1b[200~";
const PASTE_END: &str = "\x1b[201~";

/// Ctrl+Q ends the session instead of reaching the shell.
pub fn is_quit_hotkey(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
}

/// Encode a key press as the bytes a VT-style terminal would send.
///
/// Returns `None` for releases and for keys with no terminal encoding.
pub fn key_event_to_bytes(key: KeyEvent, modes: InputModes) -> Option<String> {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }

    let encoded = match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => control_char(c)?,
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "\r".to_string(),
        KeyCode::Tab => "\t".to_string(),
        KeyCode::BackTab => "\x1b[Z".to_string(),
        KeyCode::Backspace => "\x7f".to_string(),
        KeyCode::Esc => "\x1b".to_string(),
        KeyCode::Up => cursor_key('A', modes),
        KeyCode::Down => cursor_key('B', modes),
        KeyCode::Right => cursor_key('C', modes),
        KeyCode::Left => cursor_key('D', modes),
        KeyCode::Home => cursor_key('H', modes),
        KeyCode::End => cursor_key('F', modes),
        KeyCode::PageUp => "\x1b[5~".to_string(),
        KeyCode::PageDown => "\x1b[6~".to_string(),
        KeyCode::Delete => "\x1b[3~".to_string(),
        KeyCode::Insert => "\x1b[2~".to_string(),
        KeyCode::F(n) => function_key(n)?.to_string(),
        _ => return None,
    };

    if key.modifiers.contains(KeyModifiers::ALT) {
        Some(format!("\x1b{}", encoded))
    } else {
        Some(encoded)
    }
}

/// Wrap pasted text in bracket markers when the shell asked for them.
pub fn paste_to_bytes(text: &str, bracketed: bool) -> String {
    if bracketed {
        format!("{}{}{}", PASTE_START, text, PASTE_END)
    } else {
        text.replace("\r\n", "\r").replace('\n', "\r")
    }
}

fn control_char(c: char) -> Option<String> {
    let byte = match c.to_ascii_lowercase() {
        c @ 'a'..='z' => c as u8 - b'a' + 1,
        ' ' | '@' | '2' => 0x00,
        '[' | '3' => 0x1b,
        '\\' | '4' => 0x1c,
        ']' | '5' => 0x1d,
        '^' | '6' => 0x1e,
        '_' | '7' | '/' => 0x1f,
        '8' | '?' => 0x7f,
        _ => return None,
    };
    Some(char::from(byte).to_string())
}

fn cursor_key(final_byte: char, modes: InputModes) -> String {
    if modes.app_cursor {
        format!("\x1bO{}", final_byte)
    } else {
        format!("\x1b[{}", final_byte)
    }
}

fn function_key(n: u8) -> Option<&'static str> {
    let seq = match n {
        1 => "\x1bOP",
        2 => "\x1bOQ",
        3 => "\x1bOR",
        4 => "\x1bOS",
        5 => "\x1b[15~",
        6 => "\x1b[17~",
        7 => "\x1b[18~",
        8 => "\x1b[19~",
        9 => "\x1b[20~",
        10 => "\x1b[21~",
        11 => "\x1b[23~",
        12 => "\x1b[24~",
        _ => return None,
    };
    Some(seq)
}
