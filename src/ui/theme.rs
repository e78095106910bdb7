use ratatui::style::{Color, Modifier, Style};

/// The two looks the interface can switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }

    /// Label for the toggle affordance, naming the mode it switches to.
    pub fn toggle_label(self) -> &'static str {
        match self {
            ThemeMode::Dark => "🌞 Light Mode",
            ThemeMode::Light => "🌙 Dark Mode",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,
    pub sidebar_background: Color,

    // Transcript
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_prefix_style: Style,
    pub assistant_text_style: Style,
    pub notice_style: Style,
    pub hint_style: Style,
    pub welcome_style: Style,
    pub typing_indicator_style: Style,

    // Chrome
    pub title_style: Style,
    pub sidebar_text_style: Style,
    pub input_border_style: Style,
    pub input_title_style: Style,

    // Input area
    pub input_text_style: Style,
    pub input_cursor_style: Style,
    pub input_cursor_line_style: Style,
}

impl Theme {
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Theme {
            background_color: Color::Rgb(0x11, 0x13, 0x18),
            sidebar_background: Color::Rgb(0x1a, 0x1d, 0x24),
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            assistant_prefix_style: Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::White),
            notice_style: Style::default().fg(Color::LightRed),
            hint_style: Style::default().fg(Color::DarkGray),
            welcome_style: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            typing_indicator_style: Style::default().fg(Color::LightMagenta),

            title_style: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            sidebar_text_style: Style::default().fg(Color::Gray),
            input_border_style: Style::default().fg(Color::Gray),
            input_title_style: Style::default().fg(Color::Gray),

            input_text_style: Style::default().fg(Color::White),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            input_cursor_line_style: Style::default(),
        }
    }

    pub fn light() -> Self {
        Theme {
            background_color: Color::Rgb(0xfa, 0xfa, 0xfa),
            sidebar_background: Color::Rgb(0xec, 0xee, 0xf2),
            user_prefix_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Blue),
            assistant_prefix_style: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::Black),
            notice_style: Style::default().fg(Color::Red),
            hint_style: Style::default().fg(Color::Gray),
            welcome_style: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            typing_indicator_style: Style::default().fg(Color::Magenta),

            title_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
            sidebar_text_style: Style::default().fg(Color::DarkGray),
            input_border_style: Style::default().fg(Color::Black),
            input_title_style: Style::default().fg(Color::DarkGray),

            input_text_style: Style::default().fg(Color::Black),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            input_cursor_line_style: Style::default(),
        }
    }
}
