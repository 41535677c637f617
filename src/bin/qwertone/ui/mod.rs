//! TUI for qwertone: configuration header, keyboard grid, now-playing list.

mod keyboard;
pub mod state;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use keyboard::render_keyboard;
use state::UiState;

pub fn render(frame: &mut Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Config header
            Constraint::Min(10),    // Keyboard grid
            Constraint::Length(3),  // Now playing
            Constraint::Length(1),  // Help bar
            Constraint::Length(1),  // Status line
        ])
        .split(frame.area());

    render_header(frame, chunks[0], state);
    render_keyboard(frame, chunks[1], state);
    render_now_playing(frame, chunks[2], state);
    render_help(frame, chunks[3]);
    render_status(frame, chunks[4], state);
}

fn render_header(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().title(" qwertone ").borders(Borders::ALL);

    let scale_style = if state.scale_enabled {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let audio = if state.session_started {
        Span::styled("audio: running", Style::default().fg(Color::Green))
    } else {
        Span::styled("audio: waiting for first key", Style::default().fg(Color::Yellow))
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" Layout: {}  ", state.config.layout.name()),
            Style::default().fg(Color::White),
        ),
        Span::styled(format!("Scale: {}  ", state.config.scale.name()), scale_style),
        Span::styled(
            format!("Key: {}  ", state.root_key_name),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Octave: {:+}  ", state.config.octave),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
        audio,
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_now_playing(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().title(" Now playing ").borders(Borders::ALL);

    let line = if state.held.is_empty() {
        Line::from(Span::styled(
            " hold keys to play ",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut spans = Vec::with_capacity(state.held.len());
        for &(key, freq) in &state.held {
            spans.push(Span::styled(
                format!(" {key} {freq:.1}Hz "),
                Style::default().fg(Color::Green),
            ));
        }
        Line::from(spans)
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        " [Esc] Quit  [F1] Scale  [F2] Layout  [←/→] Root key  [↑/↓] Octave",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}

fn render_status(frame: &mut Frame, area: Rect, state: &UiState) {
    let text = state.status.as_deref().unwrap_or("");
    let status = Paragraph::new(format!(" {text}")).style(Style::default().fg(Color::Yellow));
    frame.render_widget(status, area);
}
