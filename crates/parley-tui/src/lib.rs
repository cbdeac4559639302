//! Terminal UI for Parley
//!
//! A crossterm/ratatui shell around [`parley_app`]: terminal I/O, command
//! parsing, and rendering. All protocol orchestration lives in the
//! [`parley_app::Bridge`]; the runtime here only moves events between the
//! terminal, the transport, and the state machines.
//!
//! With no `--server` argument the runtime spawns an in-process simulated
//! server, so the whole client can be exercised without a network.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod commands;
pub mod input;
pub mod runtime;
pub mod server;
pub mod ui;

pub use input::InputState;
pub use runtime::{Runtime, RuntimeError};
