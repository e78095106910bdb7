//! Turns the session into pre-wrapped display lines.
//!
//! Lines are wrapped here rather than by ratatui so the scroll math in
//! [`UiState`](crate::core::app::UiState) counts exactly what gets drawn.
//! Wrapped message bodies are cached per message, so a reveal only re-wraps
//! the reply that is growing.

use std::collections::HashMap;
use std::time::Instant;

use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

use crate::core::message::{Message, MessageId, MessageStatus};
use crate::core::session::Session;
use crate::ui::theme::{Theme, ThemeMode};

const INDENT: &str = "  ";
const TAB_STOP: &str = "    ";
pub const UNANSWERED_NOTICE: &str = "⚠ No reply. See the log for details.";
pub const COPY_HINT: &str = "📋 Copy (Ctrl+Y)";
pub const SELECTED_MARKER: &str = "▶ ";

/// Wrap `text` to `width` columns, breaking at spaces where possible and
/// splitting words that are longer than a whole line. Explicit newlines are
/// kept; an empty input yields one empty line. Tabs become four spaces since
/// the terminal backend draws them as nothing.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let text = text.replace('\t', TAB_STOP).replace('\r', "");
    let mut out = Vec::new();

    for raw_line in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0usize;

        for word in split_keeping_spaces(raw_line) {
            let word_width: usize = word.chars().map(char_width).sum();

            if line_width + word_width <= width {
                line.push_str(word);
                line_width += word_width;
                continue;
            }

            if word.trim().is_empty() {
                // Whitespace at a break point is dropped.
                out.push(std::mem::take(&mut line));
                line_width = 0;
                continue;
            }

            if line_width > 0 {
                out.push(std::mem::take(&mut line).trim_end().to_string());
                line_width = 0;
            }

            for ch in word.chars() {
                let w = char_width(ch);
                if line_width + w > width && line_width > 0 {
                    out.push(std::mem::take(&mut line));
                    line_width = 0;
                }
                line.push(ch);
                line_width += w;
            }
        }

        out.push(line);
    }

    out
}

fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Split into alternating runs of spaces and non-spaces.
fn split_keeping_spaces(line: &str) -> impl Iterator<Item = &str> {
    let mut rest = line;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let starts_with_space = rest.starts_with(' ');
        let end = rest
            .char_indices()
            .find(|(_, ch)| (*ch == ' ') != starts_with_space)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(end);
        rest = tail;
        Some(head)
    })
}

/// Three-dot typing indicator; one dot is highlighted at a time.
pub fn typing_indicator(pulse_start: Instant, theme: &Theme) -> Line<'static> {
    let phase = (pulse_start.elapsed().as_millis() / 300 % 3) as usize;
    let mut spans = vec![Span::raw(INDENT)];
    for dot in 0..3 {
        let symbol = if dot == phase { "●" } else { "○" };
        spans.push(Span::styled(symbol, theme.typing_indicator_style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn header_line(message: &Message, theme: &Theme, selected: bool) -> Line<'static> {
    let (label, style) = if message.is_user() {
        ("You", theme.user_prefix_style)
    } else {
        ("Gemini", theme.assistant_prefix_style)
    };
    let mut spans = Vec::with_capacity(3);
    if selected {
        spans.push(Span::styled(SELECTED_MARKER, theme.title_style));
    }
    spans.push(Span::styled(label, style));
    spans.push(Span::styled(
        format!(" · {}", message.created_at.format("%H:%M")),
        theme.hint_style,
    ));
    Line::from(spans)
}

fn welcome_lines(theme: &Theme) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled("Welcome 👋", theme.welcome_style)),
        Line::from(Span::styled("Ask me anything!", theme.hint_style)),
    ]
}

fn body_lines(message: &Message, theme: &Theme, body_width: usize) -> Vec<Line<'static>> {
    if message.is_assistant() && message.content.is_empty() {
        return Vec::new();
    }
    let text_style = if message.is_user() {
        theme.user_text_style
    } else {
        theme.assistant_text_style
    };
    wrap_text(&message.content, body_width)
        .into_iter()
        .map(|wrapped| Line::from(vec![Span::raw(INDENT), Span::styled(wrapped, text_style)]))
        .collect()
}

/// Wrapped content of one message. Content only changes by growing during a
/// reveal, so its byte length identifies the version.
#[derive(Debug, Clone)]
struct CachedBody {
    content_len: usize,
    lines: Vec<Line<'static>>,
}

/// Display lines for the transcript pane, rebuilt by [`refresh`] once per
/// frame and read by the renderer.
///
/// [`refresh`]: TranscriptCache::refresh
#[derive(Debug, Default)]
pub struct TranscriptCache {
    width: u16,
    mode: Option<ThemeMode>,
    bodies: HashMap<MessageId, CachedBody>,
    lines: Vec<Line<'static>>,
    selected_line: Option<usize>,
}

impl TranscriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    /// Index of the selected reply's header in [`lines`](Self::lines).
    pub fn selected_line(&self) -> Option<usize> {
        self.selected_line
    }

    /// Number of message bodies currently held.
    pub fn cached_bodies(&self) -> usize {
        self.bodies.len()
    }

    /// Rebuild the lines for a pane `width` columns wide. The copy hint goes
    /// on `selected` when given, otherwise on the newest completed reply.
    pub fn refresh(
        &mut self,
        session: &Session,
        mode: ThemeMode,
        width: u16,
        pulse_start: Instant,
        selected: Option<MessageId>,
    ) -> usize {
        if self.width != width || self.mode != Some(mode) {
            self.bodies.clear();
            self.width = width;
            self.mode = Some(mode);
        }
        if self.bodies.len() > session.len() {
            self.bodies
                .retain(|id, _| session.message(*id).is_some());
        }

        let theme = Theme::for_mode(mode);
        self.lines.clear();
        self.selected_line = None;

        if session.is_empty() {
            self.lines = welcome_lines(&theme);
            return self.lines.len();
        }

        let body_width = (width as usize).saturating_sub(INDENT.len()).max(1);
        let hinted = selected.or_else(|| session.latest_complete_reply().map(|m| m.id));

        for message in session.messages() {
            let is_selected = selected == Some(message.id);
            if is_selected {
                self.selected_line = Some(self.lines.len());
            }
            self.lines.push(header_line(message, &theme, is_selected));

            let stale = self
                .bodies
                .get(&message.id)
                .is_none_or(|body| body.content_len != message.content.len());
            if stale {
                self.bodies.insert(
                    message.id,
                    CachedBody {
                        content_len: message.content.len(),
                        lines: body_lines(message, &theme, body_width),
                    },
                );
            }
            if let Some(body) = self.bodies.get(&message.id) {
                self.lines.extend(body.lines.iter().cloned());
            }

            match message.status {
                MessageStatus::Unanswered => self.lines.push(Line::from(vec![
                    Span::raw(INDENT),
                    Span::styled(UNANSWERED_NOTICE, theme.notice_style),
                ])),
                MessageStatus::Complete if message.is_assistant() && hinted == Some(message.id) => {
                    self.lines.push(Line::from(vec![
                        Span::raw(INDENT),
                        Span::styled(COPY_HINT, theme.hint_style),
                    ]))
                }
                _ => {}
            }

            self.lines.push(Line::from(""));
        }

        if session.is_awaiting_response() {
            self.lines.push(Line::from(Span::styled(
                "Gemini",
                theme.assistant_prefix_style,
            )));
            self.lines.push(typing_indicator(pulse_start, &theme));
        }

        self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn render(session: &Session, mode: ThemeMode, selected: Option<MessageId>) -> Vec<String> {
        let mut cache = TranscriptCache::new();
        cache.refresh(session, mode, 40, Instant::now(), selected);
        plain(cache.lines())
    }

    fn answered(session: &mut Session, prompt: &str, reply: &str) -> MessageId {
        let ticket = session.begin_turn(prompt).expect("turn");
        let id = session.open_reply(ticket.turn_id).expect("reply");
        session.set_content(id, reply);
        session.finish_turn(ticket.turn_id);
        id
    }

    #[test]
    fn wrap_breaks_at_spaces() {
        assert_eq!(
            wrap_text("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn wrap_splits_long_words_and_keeps_newlines() {
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap_text("a\n\nb", 10), vec!["a", "", "b"]);
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn wrap_counts_wide_characters() {
        assert_eq!(wrap_text("日本語テキスト", 6), vec!["日本語", "テキス", "ト"]);
    }

    #[test]
    fn tabs_become_spaces_that_count_toward_width() {
        assert_eq!(wrap_text("a\tb", 10), vec!["a    b"]);
        let lines = wrap_text("\tfn main() {}", 8);
        assert!(lines.iter().all(|line| !line.contains('\t')));
        assert!(lines
            .iter()
            .all(|line| line.chars().map(char_width).sum::<usize>() <= 8));
    }

    #[test]
    fn empty_session_shows_welcome() {
        let text = render(&Session::new(), ThemeMode::Dark, None).join("\n");
        assert!(text.contains("Welcome"));
        assert!(text.contains("Ask me anything!"));
    }

    #[test]
    fn awaiting_response_shows_typing_indicator() {
        let mut session = Session::new();
        session.begin_turn("Hello").expect("turn");
        let lines = render(&session, ThemeMode::Dark, None);

        assert!(lines[0].starts_with("You"));
        assert_eq!(lines[1], "  Hello");
        assert_eq!(lines[lines.len() - 2], "Gemini");
        assert!(lines.last().is_some_and(|l| l.contains('●')));
    }

    #[test]
    fn completed_reply_gets_copy_hint_and_failure_gets_notice() {
        let mut session = Session::new();
        answered(&mut session, "Hello", "Hi there");
        let failed = session.begin_turn("Again").expect("turn");
        session.fail_turn(failed.turn_id);

        let lines = render(&session, ThemeMode::Light, None);
        assert!(lines.iter().any(|l| l == "  Hi there"));
        assert!(lines.iter().any(|l| l.contains(COPY_HINT)));
        assert!(lines.iter().any(|l| l.contains(UNANSWERED_NOTICE)));
        assert!(!lines.iter().any(|l| l.contains('●')));
    }

    #[test]
    fn selected_reply_carries_marker_and_copy_hint() {
        let mut session = Session::new();
        let first = answered(&mut session, "one", "first reply");
        answered(&mut session, "two", "second reply");

        let mut cache = TranscriptCache::new();
        cache.refresh(&session, ThemeMode::Dark, 40, Instant::now(), Some(first));
        let lines = plain(cache.lines());

        let header = cache.selected_line().expect("selected header");
        assert!(lines[header].starts_with(SELECTED_MARKER));
        assert_eq!(lines[header + 1], "  first reply");
        assert!(lines[header + 2].contains(COPY_HINT));
        assert_eq!(lines.iter().filter(|l| l.contains(COPY_HINT)).count(), 1);
    }

    #[test]
    fn growing_reply_rewraps_only_itself() {
        let mut session = Session::new();
        answered(&mut session, "one", "first reply");
        let ticket = session.begin_turn("two").expect("turn");
        let reply = session.open_reply(ticket.turn_id).expect("reply");

        let mut cache = TranscriptCache::new();
        for prefix in ["H", "Hi", "Hi!"] {
            session.set_content(reply, prefix);
            cache.refresh(&session, ThemeMode::Dark, 40, Instant::now(), None);
        }
        let lines = plain(cache.lines());
        assert!(lines.iter().any(|l| l == "  Hi!"));
        assert!(!lines.iter().any(|l| l == "  Hi"));
        assert_eq!(cache.cached_bodies(), 4);

        session.clear();
        cache.refresh(&session, ThemeMode::Dark, 40, Instant::now(), None);
        assert_eq!(cache.cached_bodies(), 0);
    }

    #[test]
    fn width_change_rewraps_cached_bodies() {
        let mut session = Session::new();
        answered(&mut session, "Hello", "the quick brown fox");

        let mut cache = TranscriptCache::new();
        let wide = cache.refresh(&session, ThemeMode::Dark, 40, Instant::now(), None);
        let narrow = cache.refresh(&session, ThemeMode::Dark, 12, Instant::now(), None);
        assert!(narrow > wide);
    }
}
