use std::{
    error::Error,
    io::{self, Write},
};

use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::{
    cursor::SetCursorStyle,
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::Terminal;
use tracing::debug;

pub type ChatTerminal = Terminal<CrosstermBackend<io::Stdout>>;

/// Ask the terminal to report modifiers on keys like Enter, so Shift+Enter
/// arrives as its own event. Returns whether the flags were pushed.
pub fn push_keyboard_enhancement<W: Write>(out: &mut W, supported: bool) -> io::Result<bool> {
    if !supported {
        return Ok(false);
    }
    execute!(
        out,
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
    )?;
    Ok(true)
}

pub fn pop_keyboard_enhancement<W: Write>(out: &mut W, pushed: bool) -> io::Result<()> {
    if pushed {
        execute!(out, PopKeyboardEnhancementFlags)?;
    }
    Ok(())
}

/// Enter raw mode and the alternate screen. The returned flag records
/// whether keyboard enhancement is active and must be handed back to
/// [`restore_terminal`].
pub fn setup_terminal() -> Result<(ChatTerminal, bool), Box<dyn Error>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    if let Err(err) = execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        EnableMouseCapture,
        SetCursorStyle::SteadyBar
    ) {
        let _ = disable_raw_mode();
        return Err(err.into());
    }

    let supported = supports_keyboard_enhancement().unwrap_or(false);
    let keyboard_enhanced = push_keyboard_enhancement(&mut stdout, supported).unwrap_or(false);
    debug!(keyboard_enhanced, "terminal ready");

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).inspect_err(|_| {
        let _ = disable_raw_mode();
    })?;

    Ok((terminal, keyboard_enhanced))
}

pub fn restore_terminal(
    terminal: &mut ChatTerminal,
    keyboard_enhanced: bool,
) -> Result<(), Box<dyn Error>> {
    pop_keyboard_enhancement(terminal.backend_mut(), keyboard_enhanced)?;
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        SetCursorStyle::DefaultUserShape,
        DisableMouseCapture,
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn enhancement_is_pushed_and_popped_when_supported() {
        let mut out = Vec::new();
        let pushed = push_keyboard_enhancement(&mut out, true).expect("push");
        assert!(pushed);
        assert_eq!(out, b"\x1b[>1u");

        out.clear();
        pop_keyboard_enhancement(&mut out, pushed).expect("pop");
        assert_eq!(out, b"\x1b[<1u");
    }

    #[test]
    fn unsupported_terminal_gets_no_sequences() {
        let mut out = Vec::new();
        let pushed = push_keyboard_enhancement(&mut out, false).expect("push");
        assert!(!pushed);
        pop_keyboard_enhancement(&mut out, pushed).expect("pop");
        assert!(out.is_empty());
    }
}
