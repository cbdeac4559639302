//! Input state and key handling for the TUI.
//!
//! This module owns all text input state: the connect form while
//! disconnected, and the composer while chatting. Command parsing happens
//! on Enter in the composer.

use std::path::PathBuf;

use parley_app::{App, AppAction, KeyInput};
use parley_client::{ConnectConfig, ConnectMode};

use crate::commands::{self, Command};

/// Single-line text editor (buffer + cursor).
#[derive(Debug, Default, Clone)]
pub struct LineEditor {
    buffer: String,
    cursor: usize,
}

impl LineEditor {
    /// Current text.
    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Current cursor position (bytes; input is ASCII-oriented).
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Take the text, clearing the editor.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    /// Prefill the editor, cursor at the end.
    pub fn set(&mut self, text: String) {
        self.cursor = text.len();
        self.buffer = text;
    }

    /// Apply an editing key. Returns `false` for keys that do not edit.
    pub fn handle_key(&mut self, key: KeyInput) -> bool {
        match key {
            KeyInput::Char(c) => {
                self.buffer.insert(self.cursor, c);
                self.cursor = self.cursor.saturating_add(c.len_utf8());
                true
            },
            KeyInput::Backspace => {
                if self.cursor > 0 {
                    let prev = floor_char_boundary(&self.buffer, self.cursor - 1);
                    self.buffer.remove(prev);
                    self.cursor = prev;
                }
                true
            },
            KeyInput::Delete => {
                if self.cursor < self.buffer.len() {
                    self.buffer.remove(self.cursor);
                }
                true
            },
            KeyInput::Left => {
                if self.cursor > 0 {
                    self.cursor = floor_char_boundary(&self.buffer, self.cursor - 1);
                }
                true
            },
            KeyInput::Right => {
                if self.cursor < self.buffer.len() {
                    let mut next = self.cursor + 1;
                    while !self.buffer.is_char_boundary(next) {
                        next += 1;
                    }
                    self.cursor = next;
                }
                true
            },
            KeyInput::Home => {
                self.cursor = 0;
                true
            },
            KeyInput::End => {
                self.cursor = self.buffer.len();
                true
            },
            _ => false,
        }
    }
}

/// Largest char boundary at or below `index`.
fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Fields of the connect form, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    /// Connection mode toggle.
    Mode,
    /// Server URL (Ngrok mode only).
    Url,
    /// Server host (Local mode only).
    Host,
    /// Server port (Local mode only).
    Port,
    /// Display name.
    Username,
    /// Profile photo path (optional).
    Photo,
}

/// Connect form state.
#[derive(Debug, Default, Clone)]
pub struct ConnectForm {
    mode: ConnectMode,
    focus_index: usize,
    url: LineEditor,
    host: LineEditor,
    port: LineEditor,
    username: LineEditor,
    photo: LineEditor,
}

impl ConnectForm {
    /// Fields visible for the current mode, in focus order.
    #[must_use]
    pub fn fields(&self) -> &'static [FormField] {
        match self.mode {
            ConnectMode::Ngrok => {
                &[FormField::Mode, FormField::Url, FormField::Username, FormField::Photo]
            },
            ConnectMode::Local => &[
                FormField::Mode,
                FormField::Host,
                FormField::Port,
                FormField::Username,
                FormField::Photo,
            ],
        }
    }

    /// Currently focused field.
    #[must_use]
    pub fn focus(&self) -> FormField {
        let fields = self.fields();
        fields[self.focus_index.min(fields.len() - 1)]
    }

    /// Selected connection mode.
    #[must_use]
    pub fn mode(&self) -> ConnectMode {
        self.mode
    }

    /// Current text of a field ([`FormField::Mode`] has none).
    #[must_use]
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Mode => "",
            FormField::Url => self.url.buffer(),
            FormField::Host => self.host.buffer(),
            FormField::Port => self.port.buffer(),
            FormField::Username => self.username.buffer(),
            FormField::Photo => self.photo.buffer(),
        }
    }

    /// Cursor position within the focused field's text.
    #[must_use]
    pub fn focus_cursor(&self) -> usize {
        self.editor(self.focus()).map_or(0, LineEditor::cursor)
    }

    fn editor(&self, field: FormField) -> Option<&LineEditor> {
        match field {
            FormField::Mode => None,
            FormField::Url => Some(&self.url),
            FormField::Host => Some(&self.host),
            FormField::Port => Some(&self.port),
            FormField::Username => Some(&self.username),
            FormField::Photo => Some(&self.photo),
        }
    }

    fn editor_mut(&mut self, field: FormField) -> Option<&mut LineEditor> {
        match field {
            FormField::Mode => None,
            FormField::Url => Some(&mut self.url),
            FormField::Host => Some(&mut self.host),
            FormField::Port => Some(&mut self.port),
            FormField::Username => Some(&mut self.username),
            FormField::Photo => Some(&mut self.photo),
        }
    }

    fn focus_next(&mut self) {
        self.focus_index = (self.focus_index + 1) % self.fields().len();
    }

    fn focus_prev(&mut self) {
        let len = self.fields().len();
        self.focus_index = (self.focus_index + len - 1) % len;
    }

    fn toggle_mode(&mut self) {
        // Entered values survive the toggle; only visibility changes.
        self.mode = match self.mode {
            ConnectMode::Ngrok => ConnectMode::Local,
            ConnectMode::Local => ConnectMode::Ngrok,
        };
        self.focus_index = 0;
    }

    /// Build the connection settings plus the photo path to encode.
    #[must_use]
    pub fn to_config(&self) -> (ConnectConfig, Option<PathBuf>) {
        let config = ConnectConfig {
            mode: self.mode,
            url: self.url.buffer().to_string(),
            host: self.host.buffer().to_string(),
            port: self.port.buffer().to_string(),
            username: self.username.buffer().to_string(),
            profile_photo: None,
        };

        let photo = self.photo.buffer().trim();
        let photo_path = (!photo.is_empty()).then(|| PathBuf::from(photo));

        (config, photo_path)
    }
}

/// Input state for the TUI.
///
/// Routes keys to the connect form or the chat composer depending on the
/// app's connection state.
#[derive(Debug, Default)]
pub struct InputState {
    form: ConnectForm,
    composer: LineEditor,
}

impl InputState {
    /// Create an empty input state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input state with the URL field prefilled.
    #[must_use]
    pub fn with_url(url: String) -> Self {
        let mut state = Self::default();
        state.form.url.set(url);
        state
    }

    /// The connect form (for rendering).
    #[must_use]
    pub fn form(&self) -> &ConnectForm {
        &self.form
    }

    /// The chat composer (for rendering).
    #[must_use]
    pub fn composer(&self) -> &LineEditor {
        &self.composer
    }

    /// Handle a key input event.
    ///
    /// Returns actions to process (may be empty for input-only keys, or
    /// contain protocol actions for submits and commands).
    pub fn handle_key(&mut self, key: KeyInput, app: &mut App) -> Vec<AppAction> {
        if app.connection_state().is_connected() {
            self.handle_chat_key(key, app)
        } else {
            self.handle_form_key(key, app)
        }
    }

    fn handle_form_key(&mut self, key: KeyInput, app: &mut App) -> Vec<AppAction> {
        match key {
            KeyInput::Esc => app.quit(),
            KeyInput::Tab | KeyInput::Down => {
                self.form.focus_next();
                vec![AppAction::Render]
            },
            KeyInput::Up => {
                self.form.focus_prev();
                vec![AppAction::Render]
            },
            KeyInput::Enter => {
                let (config, photo_path) = self.form.to_config();
                app.connect(config, photo_path)
            },
            key => {
                let focus = self.form.focus();
                if focus == FormField::Mode {
                    if matches!(
                        key,
                        KeyInput::Left | KeyInput::Right | KeyInput::Char(' ')
                    ) {
                        self.form.toggle_mode();
                        return vec![AppAction::Render];
                    }
                    return vec![];
                }

                match self.form.editor_mut(focus) {
                    Some(editor) => {
                        if editor.handle_key(key) {
                            vec![AppAction::Render]
                        } else {
                            vec![]
                        }
                    },
                    None => vec![],
                }
            },
        }
    }

    fn handle_chat_key(&mut self, key: KeyInput, app: &mut App) -> Vec<AppAction> {
        match key {
            KeyInput::Esc => app.quit(),
            KeyInput::Enter => self.handle_enter(app),
            KeyInput::Tab => vec![],
            key => {
                if self.composer.handle_key(key) {
                    vec![AppAction::Render]
                } else {
                    vec![]
                }
            },
        }
    }

    /// Handle Enter in the composer: parse the command and call the App API.
    fn handle_enter(&mut self, app: &mut App) -> Vec<AppAction> {
        let text = self.composer.take();

        if text.trim().is_empty() && app.pending_image().is_none() {
            return vec![];
        }

        match commands::parse(&text) {
            Command::Message { text } => app.send_message(text),
            Command::Disconnect => app.disconnect(),
            Command::Quit => app.quit(),
            Command::Image { path } => app.attach_image(path),
            Command::React { nth_latest, code } => app.react(nth_latest, code),
            Command::Unknown { input } => {
                app.set_status(format!("unknown command: {input}"));
                vec![AppAction::Render]
            },
            Command::InvalidArgs { command, error } => {
                app.set_status(format!("/{command}: {error}"));
                vec![AppAction::Render]
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parley_app::AppEvent;

    use super::*;

    fn connected_app() -> App {
        let mut app = App::new();
        app.handle(AppEvent::Connected { username: "alice".to_string() });
        app
    }

    fn type_text(input: &mut InputState, app: &mut App, text: &str) {
        for c in text.chars() {
            input.handle_key(KeyInput::Char(c), app);
        }
    }

    #[test]
    fn form_fields_collect_text() {
        let mut input = InputState::new();
        let mut app = App::new();

        // Focus order in Ngrok mode: Mode, Url, Username, Photo.
        input.handle_key(KeyInput::Tab, &mut app);
        type_text(&mut input, &mut app, "https://x.test");
        input.handle_key(KeyInput::Tab, &mut app);
        type_text(&mut input, &mut app, "alice");

        let (config, photo) = input.form().to_config();
        assert_eq!(config.url, "https://x.test");
        assert_eq!(config.username, "alice");
        assert!(photo.is_none());
    }

    #[test]
    fn mode_toggle_preserves_entered_values() {
        let mut input = InputState::new();
        let mut app = App::new();

        input.handle_key(KeyInput::Tab, &mut app);
        type_text(&mut input, &mut app, "https://x.test");

        // Back to the mode field, toggle to Local and back.
        input.handle_key(KeyInput::Up, &mut app);
        input.handle_key(KeyInput::Right, &mut app);
        assert_eq!(input.form().mode(), ConnectMode::Local);
        input.handle_key(KeyInput::Right, &mut app);
        assert_eq!(input.form().mode(), ConnectMode::Ngrok);

        assert_eq!(input.form().value(FormField::Url), "https://x.test");
    }

    #[test]
    fn enter_on_form_submits_a_connect_action() {
        let mut input = InputState::new();
        let mut app = App::new();

        input.handle_key(KeyInput::Tab, &mut app);
        type_text(&mut input, &mut app, "https://x.test");
        input.handle_key(KeyInput::Tab, &mut app);
        type_text(&mut input, &mut app, "alice");

        let actions = input.handle_key(KeyInput::Enter, &mut app);

        assert!(matches!(
            actions.as_slice(),
            [AppAction::Connect { config, .. }, AppAction::Render]
                if config.username == "alice"
        ));
    }

    #[test]
    fn composer_sends_plain_text() {
        let mut input = InputState::new();
        let mut app = connected_app();

        type_text(&mut input, &mut app, "hello");
        let actions = input.handle_key(KeyInput::Enter, &mut app);

        assert!(matches!(
            actions.as_slice(),
            [AppAction::SendMessage { text, image_path: None }, AppAction::Render]
                if text == "hello"
        ));
        assert!(input.composer().buffer().is_empty());
    }

    #[test]
    fn empty_enter_without_attachment_does_nothing() {
        let mut input = InputState::new();
        let mut app = connected_app();

        let actions = input.handle_key(KeyInput::Enter, &mut app);
        assert!(actions.is_empty());
    }

    #[test]
    fn empty_enter_with_attachment_sends_the_image() {
        let mut input = InputState::new();
        let mut app = connected_app();
        app.attach_image(PathBuf::from("cat.png"));

        let actions = input.handle_key(KeyInput::Enter, &mut app);

        assert!(matches!(
            actions.as_slice(),
            [AppAction::SendMessage { image_path: Some(_), .. }, AppAction::Render]
        ));
    }

    #[test]
    fn react_command_reaches_the_app() {
        let mut input = InputState::new();
        let mut app = connected_app();

        type_text(&mut input, &mut app, "/react 1 heart");
        let actions = input.handle_key(KeyInput::Enter, &mut app);

        assert!(matches!(actions.as_slice(), [AppAction::React { .. }, AppAction::Render]));
    }

    #[test]
    fn backspace_and_cursor_movement() {
        let mut input = InputState::new();
        let mut app = connected_app();

        type_text(&mut input, &mut app, "abc");
        input.handle_key(KeyInput::Backspace, &mut app);
        assert_eq!(input.composer().buffer(), "ab");

        input.handle_key(KeyInput::Home, &mut app);
        assert_eq!(input.composer().cursor(), 0);
        input.handle_key(KeyInput::End, &mut app);
        assert_eq!(input.composer().cursor(), 2);
    }
}
