//! Application layer for Parley
//!
//! Pure state machines for UI and protocol orchestration. The [`App`] holds
//! the view state (connection, status line, pending attachment); the
//! [`Bridge`] wraps the protocol [`parley_client::Client`] and translates
//! between app actions and client events. Both are free of I/O, so the same
//! code drives the production TUI and the tests.
//!
//! # Components
//!
//! - [`App`]: view-model state machine (connection, status, attachment)
//! - [`Bridge`]: protocol bridge (translates app intents to client events)
//! - [`AppEvent`] / [`AppAction`]: inputs and outputs of the App
//! - [`KeyInput`]: terminal-agnostic key events

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
mod event;
mod input;
mod state;

pub use action::AppAction;
pub use app::App;
pub use bridge::Bridge;
pub use event::AppEvent;
pub use input::KeyInput;
pub use state::ConnectionState;
