//! Byte sources for the `,` instruction.

use std::collections::VecDeque;
use std::io::{self, IsTerminal, Read};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// Where `,` gets its byte from.
///
/// `Ok(None)` means end of input; the interpreter then stores 0.
pub trait InputSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

impl<T: InputSource + ?Sized> InputSource for &mut T {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }
}

/// Reads a single key press from the controlling terminal, or a single byte
/// from stdin when stdin is redirected.
#[derive(Debug, Default)]
pub struct TerminalInput;

impl TerminalInput {
    pub fn new() -> Self {
        Self
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

impl InputSource for TerminalInput {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if !io::stdin().is_terminal() {
            return read_char_byte(&mut io::stdin().lock());
        }

        let _raw = RawModeGuard::enable()?;
        loop {
            let Event::Key(KeyEvent { code, modifiers, kind, .. }) = event::read()? else {
                continue;
            };
            if kind != KeyEventKind::Press {
                continue;
            }
            if modifiers.contains(KeyModifiers::CONTROL) {
                match code {
                    KeyCode::Char('c') => {
                        return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
                    }
                    KeyCode::Char('d') => return Ok(None),
                    _ => continue,
                }
            }
            let byte = match code {
                KeyCode::Char(c) => key_to_byte(c),
                KeyCode::Enter => b'\n',
                KeyCode::Tab => b'\t',
                KeyCode::Backspace => 0x08,
                KeyCode::Esc => 0x1b,
                _ => continue,
            };
            return Ok(Some(byte));
        }
    }
}

/// Code points above 255 are reduced mod 256, like every other cell write.
fn key_to_byte(c: char) -> u8 {
    (u32::from(c) % 256) as u8
}

/// Read one UTF-8 encoded character from `reader` and reduce it to a byte
/// the same way a key press is. Input that is not valid UTF-8 yields its
/// first raw byte.
fn read_char_byte<R: Read>(reader: &mut R) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 4];
    if reader.read(&mut buf[..1])? == 0 {
        return Ok(None);
    }
    let width = match buf[0] {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Ok(Some(buf[0])),
    };
    for i in 1..width {
        if reader.read(&mut buf[i..i + 1])? == 0 {
            return Ok(Some(buf[0]));
        }
    }
    match std::str::from_utf8(&buf[..width]).ok().and_then(|s| s.chars().next()) {
        Some(c) => Ok(Some(key_to_byte(c))),
        None => Ok(Some(buf[0])),
    }
}

/// A fixed queue of bytes, handed out one per `,`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    bytes: VecDeque<u8>,
}

impl ScriptedInput {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self {
            bytes: VecDeque::from(bytes),
        }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }
}

impl From<&str> for ScriptedInput {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl InputSource for ScriptedInput {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.bytes.pop_front())
    }
}
