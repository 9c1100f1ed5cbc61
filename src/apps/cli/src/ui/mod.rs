/// TUI interface module
///
/// Build terminal user interface using ratatui

pub mod chat;
pub mod vision;

use crate::app::{App, View};
use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame, Terminal,
};
use std::io;

/// Initialize terminal
pub fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal
pub fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let selected = match app.view {
        View::Vision => 0,
        View::Chat => 1,
    };
    let tabs = Tabs::new(vec!["Inventory Vision", "AI Chat Assistant"])
        .select(selected)
        .block(Block::default().borders(Borders::ALL).title("Stockpilot"))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, chunks[0]);

    match app.view {
        View::Vision => vision::render(frame, app, chunks[1]),
        View::Chat => chat::render(frame, app, chunks[1]),
    }

    let hints = Paragraph::new("Tab: switch view | Enter: submit | Esc: quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hints, chunks[2]);
}
