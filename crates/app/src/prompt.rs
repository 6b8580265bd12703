use std::io::Write;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{self, ClearType},
};

use crate::error::{AppError, Result};

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn next_key() -> Result<(KeyCode, KeyModifiers)> {
    loop {
        if let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        {
            return Ok((code, modifiers));
        }
    }
}

/// Reads one line, starting from `initial`. Ctrl-C aborts.
pub fn line(prompt: &str, initial: &str) -> Result<String> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt),
        Print(initial)
    )?;
    out.flush()?;

    let mut buf = initial.to_string();
    loop {
        match next_key()? {
            (KeyCode::Enter, _) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Ok(buf);
            }
            (KeyCode::Backspace, _) => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            (KeyCode::Char('c'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err(AppError::Interrupted);
            }
            (KeyCode::Char(ch), modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print(ch))?;
                out.flush()?;
            }
            _ => {}
        }
    }
}

/// Asks a yes/no question. Only `y` confirms; `n` or Esc declines.
pub fn confirm(question: &str) -> Result<bool> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(format!("{question} [y/n] "))
    )?;
    out.flush()?;

    let answer = loop {
        match next_key()? {
            (KeyCode::Char('y' | 'Y' | 's' | 'S'), _) => break true,
            (KeyCode::Char('c'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                return Err(AppError::Interrupted);
            }
            (KeyCode::Char('n' | 'N') | KeyCode::Esc, _) => break false,
            _ => {}
        }
    };
    execute!(out, Print(if answer { "y\r\n" } else { "n\r\n" }))?;
    out.flush()?;
    Ok(answer)
}
