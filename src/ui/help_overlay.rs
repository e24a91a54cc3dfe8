//! Help overlay showing all keybindings
//!
//! Renders a centered modal overlay with the dashboard's keyboard shortcuts.

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Renders the help overlay on top of the current view
pub fn render(frame: &mut Frame) {
    let area = frame.area();

    // Calculate centered overlay area
    let overlay_width = 50;
    let overlay_height = 22;
    let overlay_area = super::centered_rect(overlay_width, overlay_height, area);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section_title("Dashboard"),
        help_line("Tab", "Switch weather / alerts"),
        help_line("↑/k, ↓/j", "Move through alerts"),
        help_line("r", "Refresh now (also leaves OFFLINE)"),
        help_line("q", "Quit application"),
        Line::from(""),
        section_title("Location"),
        help_line("/", "Search for a location"),
        help_line("Enter", "Search / choose result"),
        help_line("↑, ↓", "Move through results"),
        help_line("Esc", "Close search"),
        Line::from(""),
        section_title("Status"),
        help_line("(PROJ)", "Projected forecast day"),
        help_line("?", "Toggle this help"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or ? to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, overlay_area);
}

fn section_title(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)))
}

/// Creates a help line with key and description
fn help_line(key: &str, description: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", key), Style::default().fg(Color::Yellow)),
        Span::raw(description.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_help_overlay_renders() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|frame| {
                render(frame);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content().iter().map(|cell| cell.symbol()).collect();

        assert!(content.contains("Help"), "Should render help title");
        assert!(content.contains("Dashboard"), "Should show dashboard section");
        assert!(content.contains("Search for a location"));
    }
}
