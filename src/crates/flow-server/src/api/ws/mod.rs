//! The three WebSocket endpoints: the event stream, the interactive
//! terminal, and a bare keep-alive.

pub mod keepalive;
pub mod terminal;
pub mod workflow;

pub use keepalive::keepalive_handler;
pub use terminal::terminal_handler;
pub use workflow::workflow_handler;
