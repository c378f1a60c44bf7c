//! HTTP and WebSocket surface for the workflow execution core.
//!
//! This crate owns nothing about *how* a graph runs — that is entirely
//! [`flow_core::GraphExecutor`]'s job. It owns the request/response
//! plumbing around it: workflow CRUD against a [`flow_store::RunStore`],
//! pre-flight validation, the active-run registry (`thread_id ->`
//! cancellation handle) that makes `/cancel` and `/resume` possible, and the
//! three sockets described in [`api::ws`].

pub mod api;
pub mod state;
pub mod version;

pub use state::AppState;
