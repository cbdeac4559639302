//! Client
//!
//! Action-based client state machine for the Parley chat protocol. Manages
//! the connection lifecycle, profile registration, and the synchronized
//! message log.
//!
//! # Architecture
//!
//! The client is Sans-IO: it receives events ([`ClientEvent`]), processes
//! them through pure state machine logic, and returns actions
//! ([`ClientAction`]) for the caller to execute. The caller owns the socket;
//! the client only ever asks for one to be opened ([`ClientAction::Dial`])
//! or closed ([`ClientAction::Close`]).
//!
//! # Components
//!
//! - [`Client`]: the connection and message-sync state machine
//! - [`MessageLog`]: ordered, wholesale-replaceable message store
//! - [`ConnectConfig`]: validated connection settings
//! - [`ClientEvent`] / [`ClientAction`]: inputs and outputs
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::ConnectedSocket`]: WebSocket with the bounded reconnect
//!   policy
//! - [`transport::connect`]: dial a server

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod config;
mod error;
mod event;
mod log;

#[cfg(feature = "transport")]
pub mod transport;

pub use client::{Client, SessionStatus};
pub use config::{ConnectConfig, ConnectMode};
pub use error::ClientError;
pub use event::{ClientAction, ClientEvent};
pub use log::MessageLog;
