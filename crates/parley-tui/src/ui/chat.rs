//! Chat area
//!
//! Displays the message log with reaction tallies. The `#n` prefixes are
//! the indices `/react` accepts (1 = latest).

use parley_app::Bridge;
use parley_proto::{ChatMessage, ReactionCode};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;

/// Render the chat area.
pub fn render(frame: &mut Frame, bridge: &Bridge, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Messages ");

    let messages = bridge.messages();
    let items: Vec<ListItem> = if messages.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No messages yet",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        let total = messages.len();
        messages
            .iter()
            .enumerate()
            .map(|(index, msg)| message_item(msg, total - index))
            .collect()
    };

    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    let list = List::new(visible_items).block(block);

    frame.render_widget(list, area);
}

fn message_item(msg: &ChatMessage, nth_latest: usize) -> ListItem<'static> {
    let mut spans = vec![
        Span::styled(format!("#{nth_latest:<3}"), Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("<{}>", msg.username),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];

    if let Some(text) = msg.text.as_deref() {
        spans.push(Span::raw(text.to_string()));
    }

    if msg.image.is_some() {
        if msg.text.is_some() {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled("[image]", Style::default().fg(Color::Magenta)));
    }

    let tally = reaction_tally(msg);
    if !tally.is_empty() {
        spans.push(Span::styled(
            format!("  ({tally})"),
            Style::default().fg(Color::Yellow),
        ));
    }

    ListItem::new(Line::from(spans))
}

/// Per-code counts in the fixed vocabulary order, e.g. `heart:2 laugh:1`.
fn reaction_tally(msg: &ChatMessage) -> String {
    ReactionCode::ALL
        .into_iter()
        .filter_map(|code| {
            let count = msg.reactions.iter().filter(|entry| entry.code == code).count();
            (count > 0).then(|| format!("{code}:{count}"))
        })
        .collect::<Vec<_>>()
        .join(" ")
}
