//! Chat front end: access gate, command dispatch, reply text and the
//! Telegram transport.

pub mod access;
pub mod commands;
pub mod format;
pub mod telegram;

pub use access::{AccessGate, InviteList};
pub use commands::{Command, Dispatcher, Incoming};
