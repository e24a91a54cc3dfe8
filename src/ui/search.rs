//! Location search overlay

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{centered_rect, colors};
use crate::app::App;
use crate::data::geocode::MIN_QUERY_CHARS;

/// Builds the overlay contents: the input line, then results or a hint
fn search_lines(app: &App) -> Vec<Line<'static>> {
    let search = &app.search;
    let mut lines = vec![
        Line::from(vec![
            Span::styled("> ", Style::default().fg(colors::HEADER)),
            Span::styled(search.query.clone(), Style::default().fg(colors::PRIMARY)),
            Span::styled("█", Style::default().fg(colors::SECONDARY)),
        ]),
        Line::from(""),
    ];

    if let Some(ref error) = search.error {
        lines.push(Line::from(Span::styled(
            format!("Search failed: {}", error),
            Style::default().fg(colors::FAIL),
        )));
    } else if !search.suggestions.is_empty() {
        for (i, suggestion) in search.suggestions.iter().enumerate() {
            let selected = i == search.selected;
            let style = if selected {
                Style::default()
                    .fg(colors::SELECTED)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors::PRIMARY)
            };
            lines.push(Line::from(vec![
                Span::styled(if selected { "▶ " } else { "  " }, style),
                Span::styled(suggestion.display_name.clone(), style),
                Span::styled(
                    format!(
                        "  ({:.2}, {:.2})",
                        suggestion.coordinates.lat, suggestion.coordinates.lon
                    ),
                    Style::default().fg(colors::UNKNOWN),
                ),
            ]));
        }
    } else if search.searched {
        let hint = if search.query.trim().chars().count() < MIN_QUERY_CHARS {
            format!("Type at least {} characters", MIN_QUERY_CHARS)
        } else {
            "No matching locations".to_string()
        };
        lines.push(Line::from(Span::styled(hint, Style::default().fg(colors::WARN))));
    } else {
        lines.push(Line::from(Span::styled(
            "Type a city name and press Enter",
            Style::default().fg(Color::DarkGray),
        )));
    }

    lines
}

/// Renders the search overlay on top of the dashboard
pub fn render(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 11, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Location Search ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::HEADER));

    frame.render_widget(Paragraph::new(search_lines(app)).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::search_known_locations;
    use crate::ui::test_support::*;

    #[test]
    fn test_render_prompt_before_search() {
        let mut app = test_app();
        app.search.query = "tok".to_string();

        let content = render_to_string(80, 20, |frame| render(frame, &app));

        assert!(content.contains("Location Search"));
        assert!(content.contains("> tok"));
        assert!(content.contains("press Enter"));
    }

    #[test]
    fn test_render_results_marks_selection() {
        let mut app = test_app();
        app.search.query = "an".to_string();
        app.search.suggestions = search_known_locations("an");
        app.search.searched = true;
        app.search.selected = 1;

        let content = render_to_string(80, 20, |frame| render(frame, &app));

        let selected = &app.search.suggestions[1].display_name;
        assert!(content.contains(&format!("▶ {}", selected)));
    }

    #[test]
    fn test_render_short_query_hint() {
        let mut app = test_app();
        app.search.query = "t".to_string();
        app.search.searched = true;

        let content = render_to_string(80, 20, |frame| render(frame, &app));

        assert!(content.contains("Type at least 2 characters"));
    }
}
