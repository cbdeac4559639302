//! Async runtime
//!
//! Event loop that drives terminal I/O and coordinates between the App
//! state machine, the Bridge, and the transport. Uses tokio::select! to
//! handle terminal events and server traffic concurrently.
//!
//! Supports two modes:
//! - Simulation mode: in-process server for offline use
//! - Network mode: real WebSocket connection to a remote server

use std::{
    io::{self, stdout},
    path::Path,
};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use parley_app::{App, AppAction, AppEvent, Bridge, KeyInput};
use parley_client::transport::{
    self, ConnectedSocket, ReconnectPolicy, TransportError, TransportEvent,
};
use parley_proto::Envelope;
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::{
    input::InputState,
    server::{self, ServerHandle},
    ui,
};

/// Runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Connection to a server (either in-process or WebSocket).
enum Connection {
    /// In-process simulated server.
    InProcess(ServerHandle),
    /// WebSocket connection to a remote server.
    Socket(ConnectedSocket),
}

impl Connection {
    fn to_server(&self) -> &mpsc::Sender<Envelope> {
        match self {
            Connection::InProcess(h) => &h.to_server,
            Connection::Socket(h) => &h.to_server,
        }
    }

    fn from_server(&mut self) -> &mut mpsc::Receiver<TransportEvent> {
        match self {
            Connection::InProcess(h) => &mut h.from_server,
            Connection::Socket(h) => &mut h.from_server,
        }
    }

    fn stop(&self) {
        match self {
            Connection::InProcess(h) => h.stop(),
            Connection::Socket(h) => h.stop(),
        }
    }
}

/// Connection mode for the runtime.
#[derive(Clone)]
enum ConnectionMode {
    /// Spawn an in-process server on connect.
    Simulation,
    /// Dial the endpoint from the connect form over WebSocket.
    Network,
}

/// One iteration's worth of input for the main loop.
enum LoopEvent {
    /// A terminal event arrived.
    Terminal(Event),
    /// The terminal event stream failed.
    TerminalError(io::Error),
    /// The terminal event stream ended.
    TerminalClosed,
    /// A transport event arrived.
    Transport(TransportEvent),
    /// The transport channel closed without a Down event.
    TransportClosed,
    /// The tick interval fired.
    Tick,
}

impl LoopEvent {
    fn from_terminal(maybe_event: Option<Result<Event, io::Error>>) -> Self {
        match maybe_event {
            Some(Ok(event)) => Self::Terminal(event),
            Some(Err(e)) => Self::TerminalError(e),
            None => Self::TerminalClosed,
        }
    }
}

/// Async runtime for the TUI.
///
/// Manages terminal setup/teardown, the main event loop, and coordinates
/// between the App (view model), Bridge (protocol), and the transport.
pub struct Runtime {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    app: App,
    bridge: Bridge,
    input: InputState,
    connection: Option<Connection>,
    mode: ConnectionMode,
}

impl Runtime {
    /// Create a new runtime in simulation mode.
    pub fn new() -> Result<Self, RuntimeError> {
        Self::create(ConnectionMode::Simulation, None)
    }

    /// Create a new runtime that dials real servers, with the form's URL
    /// field prefilled.
    pub fn with_server(url: String) -> Result<Self, RuntimeError> {
        Self::create(ConnectionMode::Network, Some(url))
    }

    fn create(mode: ConnectionMode, prefill_url: Option<String>) -> Result<Self, RuntimeError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        let input = match prefill_url {
            Some(url) => InputState::with_url(url),
            None => InputState::new(),
        };

        Ok(Self {
            terminal,
            app: App::new(),
            bridge: Bridge::new(),
            input,
            connection: None,
            mode,
        })
    }

    /// Run the main event loop.
    pub async fn run(mut self) -> Result<(), RuntimeError> {
        self.render()?;

        let mut event_stream = EventStream::new();
        let mut tick_interval = tokio::time::interval(std::time::Duration::from_millis(100));

        loop {
            // Resolve the select into a plain value first; handlers need
            // &mut self, which must not overlap the connection borrow.
            let loop_event = if let Some(ref mut conn) = self.connection {
                tokio::select! {
                    maybe_event = event_stream.next() => LoopEvent::from_terminal(maybe_event),
                    transport_event = conn.from_server().recv() => {
                        match transport_event {
                            Some(event) => LoopEvent::Transport(event),
                            None => LoopEvent::TransportClosed,
                        }
                    },
                    _ = tick_interval.tick() => LoopEvent::Tick,
                }
            } else {
                tokio::select! {
                    maybe_event = event_stream.next() => LoopEvent::from_terminal(maybe_event),
                    _ = tick_interval.tick() => LoopEvent::Tick,
                }
            };

            let should_quit = match loop_event {
                LoopEvent::Terminal(event) => self.handle_terminal_event(event).await?,
                LoopEvent::TerminalError(e) => return Err(RuntimeError::Io(e)),
                LoopEvent::TerminalClosed => true,
                LoopEvent::Transport(event) => self.handle_transport_event(event).await?,
                LoopEvent::TransportClosed => {
                    self.teardown_connection();
                    false
                },
                LoopEvent::Tick => {
                    let actions = self.app.handle(AppEvent::Tick);
                    self.process_actions(actions).await?
                },
            };

            if should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Handle a terminal event and return whether to quit.
    async fn handle_terminal_event(&mut self, event: Event) -> Result<bool, RuntimeError> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                match convert_key(key.code) {
                    Some(key_input) => {
                        let actions = self.input.handle_key(key_input, &mut self.app);
                        self.process_actions(actions).await
                    },
                    None => Ok(false),
                }
            },
            Event::Resize(cols, rows) => {
                let actions = self.app.handle(AppEvent::Resize(cols, rows));
                self.process_actions(actions).await
            },
            _ => Ok(false),
        }
    }

    /// Handle one transport event and return whether to quit.
    async fn handle_transport_event(
        &mut self,
        event: TransportEvent,
    ) -> Result<bool, RuntimeError> {
        let events = match event {
            TransportEvent::Up => self.bridge.transport_up(),
            TransportEvent::Envelope(envelope) => self.bridge.handle_envelope(envelope),
            TransportEvent::Down { reason } => {
                self.teardown_connection();
                self.bridge.transport_down(reason)
            },
        };

        self.flush_outgoing().await;
        self.process_app_events(events).await
    }

    /// Process actions returned by the app. Returns true if should quit.
    ///
    /// Uses iterative processing to avoid async recursion between actions
    /// and events.
    async fn process_actions(
        &mut self,
        initial_actions: Vec<AppAction>,
    ) -> Result<bool, RuntimeError> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.render()?,
                    AppAction::Quit => return Ok(true),

                    AppAction::Connect { config, photo_path } => {
                        let events = self.connect(config, photo_path).await;
                        for event in events {
                            pending_actions.extend(self.app.handle(event));
                        }
                    },

                    AppAction::Disconnect => {
                        let events = self.bridge.disconnect();
                        if self.bridge.take_close() {
                            self.teardown_connection();
                        }
                        for event in events {
                            pending_actions.extend(self.app.handle(event));
                        }
                    },

                    AppAction::SendMessage { text, image_path } => {
                        // The send waits for the encode; a failed read
                        // surfaces as a status message and nothing is sent.
                        let image = match image_path {
                            Some(path) => match encode_blob(&path).await {
                                Ok(blob) => Some(blob),
                                Err(e) => {
                                    let event = AppEvent::Error {
                                        message: format!(
                                            "could not read {}: {e}",
                                            path.display()
                                        ),
                                    };
                                    pending_actions.extend(self.app.handle(event));
                                    continue;
                                },
                            },
                            None => None,
                        };

                        let events = self.bridge.send_message(text, image);
                        self.flush_outgoing().await;
                        for event in events {
                            pending_actions.extend(self.app.handle(event));
                        }
                    },

                    AppAction::React { nth_latest, code } => {
                        let events = self.bridge.react_to_nth_latest(nth_latest, code);
                        self.flush_outgoing().await;
                        for event in events {
                            pending_actions.extend(self.app.handle(event));
                        }
                    },
                }
            }
        }
        Ok(false)
    }

    /// Process events from the bridge back to the app.
    async fn process_app_events(&mut self, events: Vec<AppEvent>) -> Result<bool, RuntimeError> {
        for event in events {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Run a connect attempt: encode the photo, validate through the
    /// bridge, and open the connection the client asked for.
    async fn connect(
        &mut self,
        mut config: parley_client::ConnectConfig,
        photo_path: Option<std::path::PathBuf>,
    ) -> Vec<AppEvent> {
        if let Some(path) = photo_path {
            match encode_blob(&path).await {
                Ok(blob) => config.profile_photo = Some(blob),
                Err(e) => {
                    return vec![AppEvent::Error {
                        message: format!("could not read profile photo: {e}"),
                    }];
                },
            }
        }

        let mut events = self.bridge.connect(config);

        if let Some(url) = self.bridge.take_dial() {
            events.extend(self.open_connection(&url).await);
        }

        events
    }

    /// Open the connection for a dial request.
    async fn open_connection(&mut self, url: &str) -> Vec<AppEvent> {
        self.teardown_connection();

        match &self.mode {
            ConnectionMode::Simulation => {
                self.connection = Some(Connection::InProcess(server::spawn_server()));
                vec![]
            },
            ConnectionMode::Network => {
                match transport::connect(url, ReconnectPolicy::default()).await {
                    Ok(socket) => {
                        self.connection = Some(Connection::Socket(socket));
                        vec![]
                    },
                    Err(e) => {
                        tracing::warn!("dial failed: {e}");
                        // Roll the client back to disconnected, then show
                        // the connect failure over the generic message.
                        let mut events = self.bridge.transport_down(None);
                        events.push(AppEvent::Error {
                            message: format!("failed to connect ({e})"),
                        });
                        events
                    },
                }
            },
        }
    }

    /// Drop the current connection, if any.
    fn teardown_connection(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.stop();
        }
    }

    /// Send all pending outgoing envelopes to the server.
    async fn flush_outgoing(&mut self) {
        let envelopes = self.bridge.take_outgoing();
        if envelopes.is_empty() {
            return;
        }

        let Some(conn) = self.connection.as_ref() else {
            tracing::warn!("dropping {} outgoing envelopes: no connection", envelopes.len());
            return;
        };

        for envelope in envelopes {
            if let Err(e) = conn.to_server().send(envelope).await {
                tracing::warn!("failed to queue outgoing envelope: {e}");
            }
        }
    }

    /// Render the UI.
    fn render(&mut self) -> Result<(), RuntimeError> {
        self.terminal.draw(|frame| {
            ui::render(frame, &self.app, &self.bridge, &self.input);
        })?;
        Ok(())
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.teardown_connection();

        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

/// Convert crossterm `KeyCode` to `KeyInput`.
fn convert_key(code: KeyCode) -> Option<KeyInput> {
    match code {
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Backspace => Some(KeyInput::Backspace),
        KeyCode::Delete => Some(KeyInput::Delete),
        KeyCode::Tab => Some(KeyInput::Tab),
        KeyCode::Esc => Some(KeyInput::Esc),
        KeyCode::Left => Some(KeyInput::Left),
        KeyCode::Right => Some(KeyInput::Right),
        KeyCode::Up => Some(KeyInput::Up),
        KeyCode::Down => Some(KeyInput::Down),
        KeyCode::Home => Some(KeyInput::Home),
        KeyCode::End => Some(KeyInput::End),
        _ => None,
    }
}

/// Read a file and base64-encode it for the wire.
async fn encode_blob(path: &Path) -> Result<String, io::Error> {
    let bytes = tokio::fs::read(path).await?;
    Ok(STANDARD.encode(bytes))
}
