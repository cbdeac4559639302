//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the
//! interactive state of the application completely decoupled from I/O and
//! protocol mechanics.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Tracks connection state for UI feedback.
//! - Holds the transient status message and the pending image attachment.
//! - Stores terminal dimensions to handle resize events.
//!
//! The message log itself lives in the protocol client (behind the
//! [`crate::Bridge`]); the App never copies it.

use std::path::PathBuf;

use parley_client::ConnectConfig;
use parley_proto::ReactionCode;

use crate::{AppAction, AppEvent, ConnectionState};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies, fully testable without a terminal.
#[derive(Debug, Clone, Default)]
pub struct App {
    /// Connection state.
    connection: ConnectionState,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
    /// Attachment queued for the next send.
    pending_image: Option<PathBuf>,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
}

impl App {
    /// Create a new disconnected App.
    #[must_use]
    pub fn new() -> Self {
        Self { terminal_size: (80, 24), ..Self::default() }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::Connecting => {
                self.connection = ConnectionState::Connecting;
                // A passing validation clears the previous error.
                self.status_message = None;
                vec![AppAction::Render]
            },
            AppEvent::Connected { username } => {
                self.status_message = Some(format!("connected as {username}"));
                self.connection = ConnectionState::Connected { username };
                vec![AppAction::Render]
            },
            AppEvent::Disconnected { reason } => {
                self.connection = ConnectionState::Disconnected;
                self.status_message = match reason {
                    Some(reason) => Some(format!("connection lost: {reason}")),
                    None => Some("disconnected".to_string()),
                };
                vec![AppAction::Render]
            },
            AppEvent::LogChanged => vec![AppAction::Render],
            AppEvent::Error { message } => {
                self.status_message = Some(message);
                vec![AppAction::Render]
            },
        }
    }

    /// Connect with settings from the connect form.
    pub fn connect(&self, config: ConnectConfig, photo_path: Option<PathBuf>) -> Vec<AppAction> {
        vec![AppAction::Connect { config, photo_path }, AppAction::Render]
    }

    /// End the session.
    pub fn disconnect(&self) -> Vec<AppAction> {
        vec![AppAction::Disconnect, AppAction::Render]
    }

    /// Send the composed message, taking the pending attachment with it.
    pub fn send_message(&mut self, text: String) -> Vec<AppAction> {
        let image_path = self.pending_image.take();
        vec![AppAction::SendMessage { text, image_path }, AppAction::Render]
    }

    /// Queue an image attachment for the next send.
    pub fn attach_image(&mut self, path: PathBuf) -> Vec<AppAction> {
        self.status_message = Some(format!("attached {}", path.display()));
        self.pending_image = Some(path);
        vec![AppAction::Render]
    }

    /// React to the n-th latest message (1 = latest).
    pub fn react(&self, nth_latest: usize, code: ReactionCode) -> Vec<AppAction> {
        vec![AppAction::React { nth_latest, code }, AppAction::Render]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Current connection state.
    #[must_use]
    pub fn connection_state(&self) -> &ConnectionState {
        &self.connection
    }

    /// Transient status message. `None` if no message.
    #[must_use]
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Attachment queued for the next send.
    #[must_use]
    pub fn pending_image(&self) -> Option<&PathBuf> {
        self.pending_image.as_ref()
    }

    /// Terminal dimensions (columns, rows).
    #[must_use]
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parley_client::ConnectMode;

    use super::*;

    fn config() -> ConnectConfig {
        ConnectConfig {
            mode: ConnectMode::Ngrok,
            url: "https://x.test".to_string(),
            username: "alice".to_string(),
            ..ConnectConfig::default()
        }
    }

    #[test]
    fn api_connect() {
        let app = App::new();
        let actions = app.connect(config(), None);

        assert!(matches!(
            actions.as_slice(),
            [AppAction::Connect { .. }, AppAction::Render]
        ));
    }

    #[test]
    fn connecting_clears_previous_error() {
        let mut app = App::new();
        app.handle(AppEvent::Error { message: "fill in all fields".to_string() });
        assert!(app.status_message().is_some());

        app.handle(AppEvent::Connecting);

        assert_eq!(app.connection_state(), &ConnectionState::Connecting);
        assert!(app.status_message().is_none());
    }

    #[test]
    fn connected_event_unlocks_messaging() {
        let mut app = App::new();
        app.handle(AppEvent::Connected { username: "alice".to_string() });

        assert!(app.connection_state().is_connected());
        assert_eq!(app.status_message(), Some("connected as alice"));
    }

    #[test]
    fn disconnected_event_reports_reason() {
        let mut app = App::new();
        app.handle(AppEvent::Connected { username: "alice".to_string() });
        app.handle(AppEvent::Disconnected { reason: Some("io error".to_string()) });

        assert_eq!(app.connection_state(), &ConnectionState::Disconnected);
        assert_eq!(app.status_message(), Some("connection lost: io error"));
    }

    #[test]
    fn send_message_takes_the_pending_attachment() {
        let mut app = App::new();
        app.attach_image(PathBuf::from("cat.png"));

        let actions = app.send_message("look".to_string());

        assert!(matches!(
            &actions[0],
            AppAction::SendMessage { text, image_path: Some(path) }
                if text == "look" && path == &PathBuf::from("cat.png")
        ));
        // The attachment is consumed by the send.
        assert!(app.pending_image().is_none());

        let actions = app.send_message("again".to_string());
        assert!(matches!(
            &actions[0],
            AppAction::SendMessage { image_path: None, .. }
        ));
    }

    #[test]
    fn api_react() {
        let app = App::new();
        let actions = app.react(2, ReactionCode::Laugh);

        assert!(matches!(
            actions.as_slice(),
            [AppAction::React { nth_latest: 2, code: ReactionCode::Laugh }, AppAction::Render]
        ));
    }

    #[test]
    fn resize_updates_dimensions() {
        let mut app = App::new();
        let actions = app.handle(AppEvent::Resize(120, 40));

        assert_eq!(app.terminal_size(), (120, 40));
        assert_eq!(actions, vec![AppAction::Render]);
    }
}
