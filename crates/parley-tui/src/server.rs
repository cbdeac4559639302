//! In-process simulated server.
//!
//! Implements the named-event protocol over mpsc channels: registration,
//! history replay, message echo with id assignment, and reaction toggling.
//! No network — the runtime uses this in simulation mode so the whole
//! client can be exercised deterministically with a real terminal.

use parley_client::transport::TransportEvent;
use parley_proto::{
    ChatMessage, ClientPayload, Envelope, MessageSend, ReactionEntry, ReactionSend, Registration,
    ServerPayload,
};
use tokio::sync::mpsc;

/// Handle to a running in-process server.
pub struct ServerHandle {
    /// Send envelopes to the server.
    pub to_server: mpsc::Sender<Envelope>,
    /// Receive transport events from the server.
    pub from_server: mpsc::Receiver<TransportEvent>,
    /// Abort handle to stop the server task.
    abort_handle: tokio::task::AbortHandle,
}

impl ServerHandle {
    /// Stop the server.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Spawn an in-process simulated server.
///
/// Returns a handle with channels for envelope transport. The first event
/// on the receiving channel is the connect acknowledgment
/// ([`TransportEvent::Up`]), mirroring what the real transport reports. The
/// server runs as a tokio task until dropped or stopped.
pub fn spawn_server() -> ServerHandle {
    let (client_tx, server_rx) = mpsc::channel::<Envelope>(32);
    let (server_tx, client_rx) = mpsc::channel::<TransportEvent>(32);

    let handle = tokio::spawn(run_server(server_rx, server_tx));

    ServerHandle {
        to_server: client_tx,
        from_server: client_rx,
        abort_handle: handle.abort_handle(),
    }
}

/// Server state: the registered profile and the canonical message list.
#[derive(Default)]
struct ServerState {
    profile: Option<Registration>,
    messages: Vec<ChatMessage>,
    next_id: u64,
}

async fn run_server(
    mut from_client: mpsc::Receiver<Envelope>,
    to_client: mpsc::Sender<TransportEvent>,
) {
    let mut state = ServerState::default();

    if to_client.send(TransportEvent::Up).await.is_err() {
        return;
    }

    while let Some(envelope) = from_client.recv().await {
        let payload = match ClientPayload::from_envelope(&envelope) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("sim server: dropping bad envelope: {e}");
                continue;
            },
        };

        let reply = match payload {
            ClientPayload::Register(registration) => handle_register(&mut state, registration),
            ClientPayload::Message(send) => Some(handle_message(&mut state, send)),
            ClientPayload::Reaction(reaction) => handle_reaction(&mut state, &reaction),
        };

        if let Some(payload) = reply {
            match payload.into_envelope() {
                Ok(reply) => {
                    if to_client.send(TransportEvent::Envelope(reply)).await.is_err() {
                        return;
                    }
                },
                Err(e) => tracing::warn!("sim server: failed to encode reply: {e}"),
            }
        }
    }
}

/// Store the profile and replay the history.
fn handle_register(state: &mut ServerState, registration: Registration) -> Option<ServerPayload> {
    state.profile = Some(registration);
    Some(ServerPayload::History(state.messages.clone()))
}

/// Assign an id, stamp the sender's profile, store, and echo.
fn handle_message(state: &mut ServerState, send: MessageSend) -> ServerPayload {
    state.next_id += 1;

    let (username, profile_photo) = state
        .profile
        .as_ref()
        .map(|p| (p.username.clone(), p.profile_photo.clone()))
        .unwrap_or_else(|| ("anonymous".to_string(), None));

    let message = ChatMessage {
        id: Some(format!("m{}", state.next_id)),
        username,
        profile_photo,
        text: (!send.message.is_empty()).then(|| send.message.clone()),
        image: send.image,
        reactions: Vec::new(),
    };

    state.messages.push(message.clone());
    ServerPayload::Message(message)
}

/// Toggle the reaction and broadcast the full updated message.
///
/// Same author + same code removes the entry; otherwise it is appended.
/// Unknown ids are ignored.
fn handle_reaction(state: &mut ServerState, reaction: &ReactionSend) -> Option<ServerPayload> {
    let message = state
        .messages
        .iter_mut()
        .find(|m| m.id.as_deref() == Some(reaction.message_id.as_str()))?;

    let existing = message
        .reactions
        .iter()
        .position(|entry| entry.author == reaction.username && entry.code == reaction.code);

    match existing {
        Some(index) => {
            message.reactions.remove(index);
        },
        None => {
            message.reactions.push(ReactionEntry {
                author: reaction.username.clone(),
                code: reaction.code,
            });
        },
    }

    Some(ServerPayload::Reaction(message.clone()))
}
