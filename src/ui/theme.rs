use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_text_style: Style,
    pub image_link_style: Style,
    pub notice_text_style: Style,

    // Chrome
    pub title_style: Style,
    pub busy_indicator_style: Style,
    pub status_style: Style,
    pub sidebar_border_style: Style,
    pub sidebar_active_style: Style,
    pub input_border_style: Style,
    pub input_title_style: Style,
    pub input_text_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            assistant_text_style: Style::default().fg(Color::White),
            image_link_style: Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::UNDERLINED),
            notice_text_style: Style::default().fg(Color::DarkGray),

            title_style: Style::default().fg(Color::Gray),
            busy_indicator_style: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
            status_style: Style::default().fg(Color::DarkGray),
            sidebar_border_style: Style::default().fg(Color::Gray),
            sidebar_active_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            input_border_style: Style::default().fg(Color::Gray),
            input_title_style: Style::default().fg(Color::Gray),
            input_text_style: Style::default().fg(Color::White),
        }
    }
}
