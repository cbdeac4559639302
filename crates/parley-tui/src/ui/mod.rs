//! UI rendering
//!
//! Rendering functions that convert App and Bridge state into terminal
//! output using ratatui widgets. All functions are pure (no I/O), taking
//! state and drawing widgets; the message list renders straight from the
//! client's log behind the bridge.

mod chat;
mod connect;
mod input;
mod status;

use parley_app::{App, Bridge};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::input::InputState;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App, bridge: &Bridge, input: &InputState) {
    const MAIN_AREA_MIN_HEIGHT: u16 = 3;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    if app.connection_state().is_connected() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(MAIN_AREA_MIN_HEIGHT),
                Constraint::Length(INPUT_HEIGHT),
                Constraint::Length(STATUS_HEIGHT),
            ])
            .split(frame.area());

        let [chat_area, input_area, status_area] = chunks.as_ref() else {
            return;
        };

        chat::render(frame, bridge, *chat_area);
        input::render(frame, input.composer(), *input_area);
        status::render(frame, app, bridge, *status_area);
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(MAIN_AREA_MIN_HEIGHT),
                Constraint::Length(STATUS_HEIGHT),
            ])
            .split(frame.area());

        let [form_area, status_area] = chunks.as_ref() else {
            return;
        };

        connect::render(frame, input.form(), *form_area);
        status::render(frame, app, bridge, *status_area);
    }
}
