//! Keyboard grid widget: four staggered key rows, highlighting held keys
//! and dimming keys with no mapping under the current layout.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use qwertone::keymap::{self, PhysicalKey, KEY_ROWS};

use super::state::UiState;

pub fn render_keyboard(frame: &mut Frame, area: Rect, state: &UiState) {
    let scale = state.config.scale.definition();

    let mut lines = Vec::with_capacity(KEY_ROWS.len() * 2);
    for (row_index, row) in KEY_ROWS.iter().enumerate() {
        // Stagger the rows like a physical keyboard.
        let mut spans = vec![Span::raw(" ".repeat(1 + row_index * 2))];
        for key in row.chars() {
            let mapped = keymap::degree_offset(
                state.config.layout,
                PhysicalKey::new(key),
                &scale,
                state.config.octave,
                &state.config.options,
            )
            .is_some();
            let held = state.held.iter().any(|&(c, _)| c == key);

            let style = if held {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else if mapped {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(format!(" {key} "), style));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
        lines.push(Line::raw(""));
    }

    let block = Block::default().title(" Keys ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
