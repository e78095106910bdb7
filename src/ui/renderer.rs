use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::app::App;
use crate::ui::theme::Theme;

const SIDEBAR_WIDTH: u16 = 26;
/// Below this width the sidebar is hidden.
const SIDEBAR_MIN_TERMINAL_WIDTH: u16 = 70;
const MAX_INPUT_LINES: u16 = 6;

/// Screen regions for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLayout {
    pub sidebar: Option<Rect>,
    pub transcript: Rect,
    pub input: Rect,
}

pub fn compute_layout(area: Rect, input_lines: usize) -> ChatLayout {
    let (sidebar, main) = if area.width >= SIDEBAR_MIN_TERMINAL_WIDTH {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);
        (Some(columns[0]), columns[1])
    } else {
        (None, area)
    };

    let input_height = (input_lines as u16).clamp(1, MAX_INPUT_LINES) + 2; // +2 for borders
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(input_height)])
        .split(main);

    ChatLayout {
        sidebar,
        transcript: rows[0],
        input: rows[1],
    }
}

/// Rebuild the transcript lines and scroll bounds for a terminal of `area`
/// size. Run before every draw.
pub fn sync_viewport(app: &mut App, area: Rect) {
    let layout = compute_layout(area, app.ui.input_line_count());
    let total = app.ui.transcript.refresh(
        &app.session,
        app.ui.theme_mode,
        layout.transcript.width,
        app.ui.pulse_start,
        app.ui.selected_reply,
    );
    app.ui
        .update_scroll_bounds(total.min(u16::MAX as usize) as u16, layout.transcript.height);

    if app.ui.take_selection_reveal() {
        if let Some(line) = app.ui.transcript.selected_line() {
            app.ui.scroll_to_line(line.min(u16::MAX as usize) as u16);
        }
    }
}

pub fn ui(f: &mut Frame, app: &App) {
    let theme = app.ui.theme();
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(theme.background_color)),
        area,
    );

    let layout = compute_layout(area, app.ui.input_line_count());

    if let Some(sidebar) = layout.sidebar {
        render_sidebar(f, app, &theme, sidebar);
    }

    let transcript = Paragraph::new(app.ui.transcript.lines().to_vec())
        .style(Style::default().bg(theme.background_color))
        .scroll((app.ui.scroll_offset, 0));
    f.render_widget(transcript, layout.transcript);

    let input_title = if app.is_in_flight() {
        "Gemini is replying… (Alt+Enter new line, Ctrl+N new chat, Ctrl+C quit)"
    } else {
        "Message Gemini (Enter send, Alt+Enter new line, Ctrl+C quit)"
    };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.input_border_style)
        .title(Span::styled(input_title, theme.input_title_style));
    let inner = input_block.inner(layout.input);
    f.render_widget(input_block, layout.input);
    f.render_widget(app.ui.textarea(), inner);
}

fn render_sidebar(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let text_style = theme.sidebar_text_style;
    let history = if app.session.is_empty() {
        "No chats yet"
    } else {
        "Current Chat"
    };

    let lines = vec![
        Line::from(Span::styled("⚡ Gemini Chat", theme.title_style)),
        Line::from(""),
        Line::from(Span::styled("➕ New Chat   Ctrl+N", text_style)),
        Line::from(Span::styled(
            format!("{}  Ctrl+T", app.ui.theme_mode.toggle_label()),
            text_style,
        )),
        Line::from(Span::styled("📋 Copy reply  Ctrl+Y", text_style)),
        Line::from(Span::styled("↕ Pick reply  Alt+↑/↓", text_style)),
        Line::from(""),
        Line::from(Span::styled("History", theme.title_style)),
        Line::from(Span::styled(history, text_style)),
        Line::from(""),
        Line::from(Span::styled(format!("Model: {}", app.model), theme.hint_style)),
    ];

    let sidebar = Paragraph::new(lines)
        .style(Style::default().bg(theme.sidebar_background))
        .block(
            Block::default()
                .borders(Borders::RIGHT)
                .border_style(theme.hint_style),
        );
    f.render_widget(sidebar, area);
}
