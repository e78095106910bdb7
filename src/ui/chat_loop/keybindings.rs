//! Key → action mapping for the chat screen.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asks the chat loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Submit,
    InsertNewline,
    NewChat,
    ToggleTheme,
    /// Copy the picked reply, or the latest one when none is picked.
    CopySelectedReply,
    SelectOlderReply,
    SelectNewerReply,
    ClearSelection,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Quit,
    /// Forward the key to the input box.
    Edit,
}

/// Pattern for matching key events
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPattern {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyPattern {
    pub const fn simple(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub const fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub const fn with_modifiers(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code && self.modifiers == key.modifiers
    }
}

const BINDINGS: &[(KeyPattern, KeyAction)] = &[
    (KeyPattern::simple(KeyCode::Enter), KeyAction::Submit),
    (KeyPattern::ctrl(KeyCode::Char('j')), KeyAction::InsertNewline),
    (KeyPattern::ctrl(KeyCode::Char('c')), KeyAction::Quit),
    (KeyPattern::ctrl(KeyCode::Char('n')), KeyAction::NewChat),
    (KeyPattern::ctrl(KeyCode::Char('t')), KeyAction::ToggleTheme),
    (KeyPattern::ctrl(KeyCode::Char('y')), KeyAction::CopySelectedReply),
    (
        KeyPattern::with_modifiers(KeyCode::Up, KeyModifiers::ALT),
        KeyAction::SelectOlderReply,
    ),
    (
        KeyPattern::with_modifiers(KeyCode::Down, KeyModifiers::ALT),
        KeyAction::SelectNewerReply,
    ),
    (KeyPattern::simple(KeyCode::Esc), KeyAction::ClearSelection),
    (KeyPattern::simple(KeyCode::PageUp), KeyAction::PageUp),
    (KeyPattern::simple(KeyCode::PageDown), KeyAction::PageDown),
    (KeyPattern::ctrl(KeyCode::Up), KeyAction::ScrollUp),
    (KeyPattern::ctrl(KeyCode::Down), KeyAction::ScrollDown),
    (
        KeyPattern::with_modifiers(KeyCode::Up, KeyModifiers::SHIFT),
        KeyAction::ScrollUp,
    ),
    (
        KeyPattern::with_modifiers(KeyCode::Down, KeyModifiers::SHIFT),
        KeyAction::ScrollDown,
    ),
];

pub fn resolve_key(key: &KeyEvent) -> KeyAction {
    if let Some((_, action)) = BINDINGS.iter().find(|(pattern, _)| pattern.matches(key)) {
        return *action;
    }

    // Any modified Enter (Shift, Alt, ...) breaks the line instead of sending.
    if key.code == KeyCode::Enter {
        return KeyAction::InsertNewline;
    }

    KeyAction::Edit
}
