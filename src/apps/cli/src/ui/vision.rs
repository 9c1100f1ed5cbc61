//! Vision view: image path entry, progress, count and saved result.

use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(area);

    let input = Paragraph::new(app.vision.path_input.as_str())
        .block(Block::default().borders(Borders::ALL).title("Image path"))
        .wrap(Wrap { trim: true });
    frame.render_widget(input, chunks[0]);

    let status = if app.vision.analyzing {
        Paragraph::new("Analyzing...").style(Style::default().fg(Color::Yellow))
    } else if let Some(error) = &app.vision.error {
        Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red))
    } else {
        Paragraph::new("Upload an image to get an AI-powered inventory count.")
            .style(Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(status, chunks[1]);

    if let Some(outcome) = &app.vision.outcome {
        let lines = vec![
            Line::styled(
                format!("Detected Count: {}", outcome.object_count),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Line::raw(format!(
                "Annotated image saved to {}",
                outcome.output_path.display()
            )),
        ];
        let result = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Result"));
        frame.render_widget(result, chunks[2]);
    }
}
