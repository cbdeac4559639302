//! Status bar
//!
//! Displays connection state, message count, pending attachment, and the
//! transient status message.

use parley_app::{App, Bridge, ConnectionState};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, bridge: &Bridge, area: Rect) {
    let connection_status = match app.connection_state() {
        ConnectionState::Disconnected => {
            Span::styled("Disconnected", Style::default().fg(Color::Red))
        },
        ConnectionState::Connecting => {
            Span::styled("Connecting...", Style::default().fg(Color::Yellow))
        },
        ConnectionState::Connected { username } => Span::styled(
            format!("Connected as {username}"),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    };

    let mut extras = String::new();
    if app.connection_state().is_connected() {
        extras.push_str(&format!(" | Messages: {}", bridge.messages().len()));
    }
    if let Some(path) = app.pending_image() {
        extras.push_str(&format!(" | Attached: {}", path.display()));
    }
    if let Some(message) = app.status_message() {
        extras.push_str(&format!(" | {message}"));
    }

    let status_line = Line::from(vec![
        Span::raw(" "),
        connection_status,
        Span::styled(extras, Style::default().fg(Color::Gray)),
    ]);

    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
