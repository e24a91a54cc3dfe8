//! UI rendering module for wxdash
//!
//! This module contains all the rendering logic for the terminal dashboard,
//! using the ratatui library for TUI components.

pub mod alerts;
pub mod dashboard;
pub mod forecast;
pub mod help_overlay;
pub mod search;
pub mod widgets;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use crate::app::{App, AppState, Section};

pub use help_overlay::render as render_help_overlay;

/// Shared color scheme
pub(crate) mod colors {
    use ratatui::style::Color;

    /// Healthy status (green)
    pub const OK: Color = Color::Green;
    /// Degraded status (yellow)
    pub const WARN: Color = Color::Yellow;
    /// Failed status (red)
    pub const FAIL: Color = Color::Red;
    /// Missing data (gray)
    pub const UNKNOWN: Color = Color::DarkGray;
    /// Section headers
    pub const HEADER: Color = Color::Cyan;
    /// Primary text
    pub const PRIMARY: Color = Color::White;
    /// Secondary/dimmed text
    pub const SECONDARY: Color = Color::Gray;
    /// Projected forecast days
    pub const PROJECTED: Color = Color::Magenta;
    /// Highlighted row
    pub const SELECTED: Color = Color::Yellow;
}

/// Renders the whole screen for the current state
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Section body
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    dashboard::render_header(frame, chunks[0], app);

    match app.section {
        Section::Weather => dashboard::render_weather(frame, chunks[1], app),
        Section::Alerts => alerts::render(frame, chunks[1], app),
    }

    dashboard::render_key_hints(frame, chunks[2], app);

    if app.state == AppState::Search {
        search::render(frame, app);
    }
    if app.show_help {
        render_help_overlay(frame);
    }
}

/// Helper function to create a centered rect
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height.min(area.height)),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width.min(area.width)),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}
