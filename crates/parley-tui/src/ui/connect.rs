//! Connect form
//!
//! Shows the connection-type toggle and the endpoint/profile fields while
//! disconnected.

use parley_client::ConnectMode;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::input::{ConnectForm, FormField};

const LABEL_WIDTH: usize = 12;
const BORDER_SIZE: u16 = 1;

/// Render the connect form.
pub fn render(frame: &mut Frame, form: &ConnectForm, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Parley — Connect ");

    let mut lines = Vec::new();
    for &field in form.fields() {
        lines.push(field_line(form, field));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        " [Enter] connect   [Tab] next field   [Esc] quit",
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);

    set_cursor(frame, form, area);
}

fn field_line<'a>(form: &'a ConnectForm, field: FormField) -> Line<'a> {
    let focused = form.focus() == field;

    let marker = if focused { "> " } else { "  " };
    let label = format!("{:<LABEL_WIDTH$}", label_for(field));

    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    let value: Span<'a> = match field {
        FormField::Mode => {
            let mode = match form.mode() {
                ConnectMode::Ngrok => "< Ngrok URL >",
                ConnectMode::Local => "< Local host/port >",
            };
            Span::styled(mode, Style::default().fg(Color::Yellow))
        },
        FormField::Photo if form.value(field).is_empty() => {
            Span::styled("(optional path)", Style::default().fg(Color::DarkGray))
        },
        _ => Span::raw(form.value(field)),
    };

    Line::from(vec![Span::raw(marker), Span::styled(label, label_style), value])
}

fn label_for(field: FormField) -> &'static str {
    match field {
        FormField::Mode => "Connection:",
        FormField::Url => "Server URL:",
        FormField::Host => "Host:",
        FormField::Port => "Port:",
        FormField::Username => "Username:",
        FormField::Photo => "Photo:",
    }
}

/// Place the cursor inside the focused text field.
fn set_cursor(frame: &mut Frame, form: &ConnectForm, area: Rect) {
    let focus = form.focus();
    if focus == FormField::Mode {
        return;
    }

    let Some(row) = form.fields().iter().position(|&f| f == focus) else {
        return;
    };

    let prefix = 2 + LABEL_WIDTH as u16; // marker + label
    let cursor_x = area
        .x
        .saturating_add(BORDER_SIZE)
        .saturating_add(prefix)
        .saturating_add(form.focus_cursor() as u16);
    let cursor_y = area.y.saturating_add(BORDER_SIZE).saturating_add(row as u16);

    let max_x = area.x.saturating_add(area.width).saturating_sub(BORDER_SIZE + 1);
    frame.set_cursor_position((cursor_x.min(max_x), cursor_y));
}
