//! Chat view: transcript, prompt input, and the one-time key prompt.

use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use stockpilot_core::{Speaker, TurnStatus};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if !app.has_credential() {
        render_key_entry(frame, app, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(area);

    let items: Vec<ListItem> = app
        .conversation
        .turns()
        .iter()
        .map(|turn| {
            let (label, label_style) = match turn.speaker() {
                Speaker::User => (
                    "You",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Speaker::Assistant => (
                    "Assistant",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
            };
            let content_style = if matches!(turn.status(), TurnStatus::Failed { .. }) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            let mut lines = vec![Line::from(Span::styled(format!("{label}:"), label_style))];
            for line in turn.display_content().lines() {
                lines.push(Line::from(Span::styled(format!("  {line}"), content_style)));
            }
            ListItem::new(Text::from(lines))
        })
        .collect();

    let transcript =
        List::new(items).block(Block::default().borders(Borders::ALL).title("Conversation"));
    frame.render_widget(transcript, chunks[0]);

    let input_title = if app.awaiting_answer() {
        "Prompt (waiting for reply...)"
    } else {
        "Prompt"
    };
    let input = Paragraph::new(app.chat_input.as_str())
        .block(Block::default().borders(Borders::ALL).title(input_title))
        .wrap(Wrap { trim: true });
    frame.render_widget(input, chunks[1]);
}

fn render_key_entry(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let intro = Paragraph::new(
        "The chat assistant needs an API key for the language-model proxy.\n\
         Paste it below and press Enter; it is stored in your config file.",
    )
    .block(Block::default().borders(Borders::ALL).title("Enter API Key"));
    frame.render_widget(intro, chunks[0]);

    let masked = "*".repeat(app.key_input.chars().count());
    let input = Paragraph::new(masked)
        .block(Block::default().borders(Borders::ALL).title("API key"));
    frame.render_widget(input, chunks[1]);
}
