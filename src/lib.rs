//! Confide is a terminal-first client for an AI counseling service.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns runtime state: the chat session, the append-only
//!   transcript, the persisted profile, and the controller that drives
//!   send/receive cycles and the end-of-session flow.
//! - [`api`] defines the wire payloads and the HTTP client used to talk
//!   to the counseling backend.
//! - [`auth`] implements the login and signup flows, including the
//!   client-side validation that runs before any request is sent.
//! - [`ui`] renders the full-screen interface and runs the interactive
//!   event loop that drives user input and display updates.
//! - [`commands`] implements slash-command parsing used by the chat loop.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which dispatches into the auth flows and
//! [`ui::chat_loop`] for interactive sessions.

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod core;
pub mod logging;
pub mod ui;
pub mod utils;
