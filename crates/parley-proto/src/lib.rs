//! Wire protocol for the Parley chat service.
//!
//! The protocol is a set of named events carried as JSON text frames over a
//! message-oriented socket. Each frame is an [`Envelope`]: the event name
//! plus an untyped JSON body. Typed payloads are split by direction into
//! [`ClientPayload`] (client→server) and [`ServerPayload`] (server→client),
//! because the `message` and `reaction` event names carry different shapes
//! in each direction.
//!
//! # Components
//!
//! - [`Envelope`]: structural frame (event name + raw JSON body)
//! - [`ClientPayload`] / [`ServerPayload`]: typed payloads with event-name
//!   mapping
//! - [`ChatMessage`], [`ReactionEntry`], [`ReactionCode`]: shared data types
//! - [`ProtocolError`]: decode/encode failures
//!
//! # Invariants
//!
//! Each payload variant maps to exactly one event name per direction
//! (enforced by match exhaustiveness). Round-trip encoding must produce an
//! equivalent value.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod envelope;
mod error;
mod payload;
mod types;

pub use envelope::Envelope;
pub use error::ProtocolError;
pub use payload::{ClientPayload, MessageSend, ReactionSend, Registration, ServerPayload};
pub use types::{ChatMessage, MessageId, ReactionCode, ReactionEntry};
