use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::ui::surface::{ChatView, MessageView, ViewRole, BUSY_INDICATOR_TEXT};
use crate::ui::theme::Theme;

const SIDEBAR_WIDTH: u16 = 38;
const INPUT_TITLE: &str =
    "Type a message (/image <prompt> for pictures, /help for help, Ctrl+C to quit)";

fn message_lines(message: &MessageView, theme: &Theme) -> Vec<Line<'static>> {
    match (message.role, message.is_image) {
        (_, true) => vec![Line::from(vec![
            Span::styled("[image] ", theme.notice_text_style),
            Span::styled(message.content.clone(), theme.image_link_style),
        ])],
        (ViewRole::User, false) => message
            .content
            .lines()
            .enumerate()
            .map(|(index, line)| {
                let prefix = if index == 0 { "You: " } else { "     " };
                Line::from(vec![
                    Span::styled(prefix, theme.user_prefix_style),
                    Span::styled(line.to_string(), theme.user_text_style),
                ])
            })
            .collect(),
        (ViewRole::Ai, false) => message
            .content
            .lines()
            .map(|line| Line::from(Span::styled(line.to_string(), theme.assistant_text_style)))
            .collect(),
        (ViewRole::Notice, false) => message
            .content
            .lines()
            .map(|line| Line::from(Span::styled(line.to_string(), theme.notice_text_style)))
            .collect(),
    }
}

/// Transcript lines for the current view, one blank line after each message.
pub fn build_display_lines(view: &ChatView, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in &view.messages {
        lines.extend(message_lines(message, theme));
        lines.push(Line::from(""));
    }
    if view.busy {
        lines.push(Line::from(Span::styled(
            BUSY_INDICATOR_TEXT,
            theme.busy_indicator_style,
        )));
    }
    lines
}

/// Number of rows `lines` occupy when wrapped to `width` columns.
pub fn wrapped_line_count(lines: &[Line<'_>], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = lines
        .iter()
        .map(|line| line.width().div_ceil(width).max(1))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn title(view: &ChatView) -> String {
    let position = match view.active_position() {
        Some(position) => format!("chat {position}/{}", view.sessions.len()),
        None => "no chat".to_string(),
    };
    format!("chatterbox v{} • {}", env!("CARGO_PKG_VERSION"), position)
}

fn draw_sidebar(f: &mut Frame, area: Rect, view: &ChatView, theme: &Theme) {
    let items: Vec<ListItem> = view
        .sessions
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let label = format!("{}. {}", index + 1, entry.preview);
            if Some(entry.id) == view.active {
                ListItem::new(label).style(theme.sidebar_active_style)
            } else {
                ListItem::new(label)
            }
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.sidebar_border_style)
            .title("Chats (Tab to hide, Ctrl+N for new)"),
    );
    f.render_widget(list, area);
}

pub fn ui(f: &mut Frame, view: &ChatView, theme: &Theme) {
    let main_area = if view.panel_expanded {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(f.area());
        draw_sidebar(f, columns[0], view, theme);
        columns[1]
    } else {
        f.area()
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(main_area);

    let lines = build_display_lines(view, theme);
    let available_height = chunks[0].height.saturating_sub(1); // Account for title
    let total_lines = wrapped_line_count(&lines, chunks[0].width);
    let max_offset = total_lines.saturating_sub(available_height);
    let scroll = max_offset.saturating_sub(view.scroll_offset);

    let transcript = Paragraph::new(lines)
        .block(
            Block::default()
                .title(Span::styled(title(view), theme.title_style)),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(transcript, chunks[0]);

    let status = Paragraph::new(Span::styled(
        view.status.clone().unwrap_or_default(),
        theme.status_style,
    ));
    f.render_widget(status, chunks[1]);

    let input = Paragraph::new(Span::styled(view.input.clone(), theme.input_text_style)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.input_border_style)
            .title(Span::styled(INPUT_TITLE, theme.input_title_style)),
    );
    f.render_widget(input, chunks[2]);

    let cursor_x = chunks[2]
        .x
        .saturating_add(1)
        .saturating_add(u16::try_from(Line::from(view.input.as_str()).width()).unwrap_or(u16::MAX))
        .min(chunks[2].right().saturating_sub(2));
    f.set_cursor_position(Position::new(cursor_x, chunks[2].y + 1));
}
