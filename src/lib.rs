//! Workspace root package.
//!
//! Exists only to anchor workspace-wide dev tooling (cargo-husky hooks).
//! All functionality lives in the member crates under `crates/`.
