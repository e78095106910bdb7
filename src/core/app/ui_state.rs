use std::time::Instant;

use tui_textarea::{CursorMove, Input, TextArea};

use crate::core::message::MessageId;
use crate::ui::theme::{Theme, ThemeMode};
use crate::ui::transcript::TranscriptCache;

/// Presentation state owned by the controller and read by the renderer.
pub struct UiState {
    textarea: TextArea<'static>,
    pub theme_mode: ThemeMode,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    /// Height of the transcript pane at the last layout pass.
    pub viewport_height: u16,
    max_scroll: u16,
    pub pulse_start: Instant,
    /// Wrapped transcript lines from the last layout pass.
    pub transcript: TranscriptCache,
    /// Reply targeted by copy; `None` means the newest one.
    pub selected_reply: Option<MessageId>,
    reveal_selection: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(ThemeMode::default())
    }
}

impl UiState {
    pub fn new(theme_mode: ThemeMode) -> Self {
        let mut ui = Self {
            textarea: TextArea::default(),
            theme_mode,
            scroll_offset: 0,
            auto_scroll: true,
            viewport_height: 0,
            max_scroll: 0,
            pulse_start: Instant::now(),
            transcript: TranscriptCache::new(),
            selected_reply: None,
            reveal_selection: false,
        };
        ui.configure_textarea();
        ui
    }

    pub fn theme(&self) -> Theme {
        Theme::for_mode(self.theme_mode)
    }

    pub fn set_theme_mode(&mut self, mode: ThemeMode) {
        self.theme_mode = mode;
        self.configure_textarea();
    }

    pub(crate) fn configure_textarea(&mut self) {
        let theme = self.theme();
        let textarea_style = theme
            .input_text_style
            .patch(ratatui::style::Style::default().bg(theme.background_color));
        self.textarea.set_style(textarea_style);
        self.textarea.set_cursor_style(theme.input_cursor_style);
        self.textarea
            .set_cursor_line_style(theme.input_cursor_line_style);
        self.textarea.set_placeholder_text("Message Gemini...");
        self.textarea.set_placeholder_style(theme.hint_style);
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    pub fn input_text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn input_line_count(&self) -> usize {
        self.textarea.lines().len().max(1)
    }

    pub fn set_input_text(&mut self, text: &str) {
        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        self.textarea = TextArea::from(lines);
        self.textarea.move_cursor(CursorMove::Bottom);
        self.textarea.move_cursor(CursorMove::End);
        self.configure_textarea();
    }

    pub fn clear_input(&mut self) {
        self.set_input_text("");
    }

    pub fn insert_newline(&mut self) {
        self.textarea.insert_newline();
    }

    pub fn insert_str(&mut self, text: &str) {
        // Terminals deliver pasted line breaks as \r or \r\n.
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        self.textarea.insert_str(normalized);
    }

    /// Forward an editing key to the input box.
    pub fn apply_input(&mut self, input: impl Into<Input>) -> bool {
        self.textarea.input(input)
    }

    /// Stick to the newest message on the next layout pass.
    pub fn follow_latest(&mut self) {
        self.auto_scroll = true;
    }

    /// Record the transcript size from the latest layout and clamp the offset.
    pub fn update_scroll_bounds(&mut self, total_lines: u16, viewport_height: u16) {
        self.viewport_height = viewport_height;
        self.max_scroll = total_lines.saturating_sub(viewport_height);
        if self.auto_scroll {
            self.scroll_offset = self.max_scroll;
        } else {
            self.scroll_offset = self.scroll_offset.min(self.max_scroll);
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.auto_scroll = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines).min(self.max_scroll);
        // Reaching the bottom re-enables following.
        self.auto_scroll = self.scroll_offset >= self.max_scroll;
    }

    /// Page by one viewport minus one line of overlap.
    pub fn page_up(&mut self) {
        self.scroll_up(self.viewport_height.saturating_sub(1).max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.viewport_height.saturating_sub(1).max(1));
    }

    /// Adjust the offset just enough for `line` to be visible.
    pub fn scroll_to_line(&mut self, line: u16) {
        let viewport = self.viewport_height.max(1);
        if line < self.scroll_offset {
            self.scroll_offset = line;
        } else if line >= self.scroll_offset.saturating_add(viewport) {
            self.scroll_offset = (line + 1 - viewport).min(self.max_scroll);
        }
        self.auto_scroll = self.scroll_offset >= self.max_scroll;
    }

    pub fn select_reply(&mut self, id: Option<MessageId>) {
        self.selected_reply = id;
        self.reveal_selection = id.is_some();
    }

    /// Whether the selection moved since the last layout pass.
    pub(crate) fn take_selection_reveal(&mut self) -> bool {
        std::mem::take(&mut self.reveal_selection)
    }

    pub fn reset_scroll(&mut self) {
        self.scroll_offset = 0;
        self.max_scroll = 0;
        self.auto_scroll = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn typed_keys_reach_the_input() {
        let mut ui = UiState::default();
        ui.apply_input(KeyEvent::new(KeyCode::Char('h'), KeyModifiers::NONE));
        ui.apply_input(KeyEvent::new(KeyCode::Char('i'), KeyModifiers::NONE));
        assert_eq!(ui.input_text(), "hi");
    }

    #[test]
    fn newline_and_paste_build_multiline_input() {
        let mut ui = UiState::default();
        ui.insert_str("first");
        ui.insert_newline();
        ui.insert_str("second\r\nthird");
        assert_eq!(ui.input_text(), "first\nsecond\nthird");
        assert_eq!(ui.input_line_count(), 3);

        ui.clear_input();
        assert_eq!(ui.input_text(), "");
    }

    #[test]
    fn set_input_text_places_cursor_at_end() {
        let mut ui = UiState::default();
        ui.set_input_text("ab\ncd");
        ui.insert_str("!");
        assert_eq!(ui.input_text(), "ab\ncd!");
    }

    #[test]
    fn auto_scroll_tracks_bottom() {
        let mut ui = UiState::default();
        ui.update_scroll_bounds(50, 10);
        assert_eq!(ui.scroll_offset, 40);

        ui.scroll_up(5);
        assert!(!ui.auto_scroll);
        ui.update_scroll_bounds(60, 10);
        assert_eq!(ui.scroll_offset, 35);

        ui.follow_latest();
        ui.update_scroll_bounds(60, 10);
        assert_eq!(ui.scroll_offset, 50);
    }

    #[test]
    fn scrolling_down_to_bottom_resumes_following() {
        let mut ui = UiState::default();
        ui.update_scroll_bounds(30, 10);
        ui.page_up();
        assert_eq!(ui.scroll_offset, 11);
        assert!(!ui.auto_scroll);

        ui.page_down();
        assert_eq!(ui.scroll_offset, 20);
        assert!(ui.auto_scroll);
    }

    #[test]
    fn theme_switch_keeps_input() {
        let mut ui = UiState::default();
        ui.insert_str("draft");
        ui.set_theme_mode(ThemeMode::Light);
        assert_eq!(ui.theme_mode, ThemeMode::Light);
        assert_eq!(ui.input_text(), "draft");
    }

    #[test]
    fn scroll_to_line_brings_line_into_view() {
        let mut ui = UiState::default();
        ui.update_scroll_bounds(100, 10);
        assert_eq!(ui.scroll_offset, 90);

        ui.scroll_to_line(12);
        assert_eq!(ui.scroll_offset, 12);
        assert!(!ui.auto_scroll);

        ui.scroll_to_line(15);
        assert_eq!(ui.scroll_offset, 12);

        ui.scroll_to_line(30);
        assert_eq!(ui.scroll_offset, 21);

        ui.scroll_to_line(99);
        assert_eq!(ui.scroll_offset, 90);
        assert!(ui.auto_scroll);
    }

    #[test]
    fn selecting_a_reply_requests_one_reveal() {
        let mut ui = UiState::default();
        ui.select_reply(Some(MessageId::new(3)));
        assert!(ui.take_selection_reveal());
        assert!(!ui.take_selection_reveal());

        ui.select_reply(None);
        assert!(!ui.take_selection_reveal());
        assert_eq!(ui.selected_reply, None);
    }
}
