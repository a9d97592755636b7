//! Arix is a terminal-first concierge that drives a decorative holiday scene
//! through conversation with a remote LLM API.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns session state: the conversation transcript, the morph
//!   state of the scene, visual tuning parameters, and the concierge client
//!   that talks to the remote completion endpoint.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loop that drives user input and display updates.
//! - [`api`] defines the chat payloads exchanged with the remote API.
//! - [`utils`] holds small shared helpers (URL handling, transcript logging).
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which resolves configuration and dispatches
//! into [`ui::chat_loop`] for interactive sessions.

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
