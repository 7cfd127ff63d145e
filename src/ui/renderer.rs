//! Full-screen rendering for the chat view.
//!
//! Rendering is a pure function of the app state: the same transcript
//! always produces the same display lines.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::core::app::ChatApp;
use crate::core::controller::Phase;
use crate::core::message::Role;
use crate::ui::markdown::format_content;

const USER_PREFIX: &str = "You: ";

/// Build the transcript display: banners, messages in insertion order,
/// and the typing indicator.
pub fn build_display_lines(app: &ChatApp) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if app.show_banners {
        if let Some(context) = &app.context {
            lines.push(Line::from(Span::styled(
                "Previously:",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.extend(format_content(
                context,
                Style::default().fg(Color::DarkGray),
            ));
            lines.push(Line::from(""));
        } else {
            let name = app.username.as_deref().unwrap_or("there");
            lines.push(Line::from(Span::styled(
                format!("Welcome, {name}. How are you feeling today?"),
                Style::default().fg(Color::DarkGray),
            )));
            lines.push(Line::from(""));
        }
    }

    for message in app.controller.transcript().messages() {
        match message.role {
            Role::User => {
                let mut content_lines =
                    format_content(&message.content, Style::default().fg(Color::Cyan));
                if let Some(first) = content_lines.first_mut() {
                    first.spans.insert(
                        0,
                        Span::styled(
                            USER_PREFIX,
                            Style::default()
                                .fg(Color::Cyan)
                                .add_modifier(Modifier::BOLD),
                        ),
                    );
                }
                lines.extend(content_lines);
            }
            Role::Counselor => {
                lines.extend(format_content(
                    &message.content,
                    Style::default().fg(Color::White),
                ));
            }
            Role::AppInfo => {
                lines.extend(format_content(
                    &message.content,
                    Style::default().fg(Color::DarkGray),
                ));
            }
            Role::AppError => {
                lines.extend(format_content(
                    &message.content,
                    Style::default().fg(Color::Red),
                ));
            }
        }
        lines.push(Line::from(""));
    }

    match app.controller.phase() {
        Phase::Sending => lines.push(Line::from(Span::styled(
            "Counselor is typing…",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))),
        Phase::EndingSession => lines.push(Line::from(Span::styled(
            "Preparing your session summary…",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))),
        _ => {}
    }

    lines
}

pub fn max_scroll_offset(app: &ChatApp, available_height: u16) -> u16 {
    let total_lines = build_display_lines(app).len() as u16;
    total_lines.saturating_sub(available_height)
}

pub fn ui(f: &mut Frame, app: &mut ChatApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let lines = build_display_lines(app);

    // Account for the title line.
    let available_height = chunks[0].height.saturating_sub(1);
    let total_lines = lines.len() as u16;
    let max_offset = total_lines.saturating_sub(available_height);
    if app.auto_scroll {
        app.scroll_offset = max_offset;
    }
    let scroll_offset = app.scroll_offset.min(max_offset);

    let title = match app.username.as_deref() {
        Some(name) => format!("Confide — {name}"),
        None => "Confide".to_string(),
    };
    let transcript = Paragraph::new(lines)
        .block(Block::default().title(title))
        .wrap(Wrap { trim: true })
        .scroll((scroll_offset, 0));
    f.render_widget(transcript, chunks[0]);

    let input_title = "Type your message (Enter to send, /help for commands)";
    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(input_title))
        .wrap(Wrap { trim: true });
    f.render_widget(input, chunks[1]);

    if let Some(summary) = &app.summary_modal {
        render_summary_modal(f, summary);
    } else {
        f.set_cursor_position((
            chunks[1].x + input_cursor_column(&app.input) + 1,
            chunks[1].y + 1,
        ));
    }
}

/// Cursor column after the typed input. Counts characters, not bytes,
/// so non-ASCII input does not push the cursor past the text.
fn input_cursor_column(input: &str) -> u16 {
    input.chars().count() as u16
}

fn render_summary_modal(f: &mut Frame, summary: &str) {
    let area = centered_rect(60, 50, f.area());
    f.render_widget(Clear, area);

    let mut lines = format_content(summary, Style::default().fg(Color::White));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Enter to begin a new session",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )));

    let modal = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Session Summary"))
        .wrap(Wrap { trim: true });
    f.render_widget(modal, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
