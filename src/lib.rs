//! Console client for the leilão auction backend.
//!
//! Two collaborating pieces: a stateless REST client ([`api::ApiClient`])
//! for auction lifecycle and bidding operations, and a long-lived SSE
//! client ([`stream::EventStreamClient`]) that routes named notification
//! channels to typed events. Both share one [`config::Config`] carrying the
//! base URL and the session client id.

/// Auction API request/response client.
pub mod api;
/// Command-line argument definitions.
pub mod cli;
/// Stream connection bookkeeping.
pub mod client_state;
/// Runtime configuration model.
pub mod config;
/// Error types used across the crate.
pub mod error;
/// Event bus messages between the stream client and the UI.
pub mod events;
/// Terminal output formatters.
pub mod formatter;
/// Metrics and health status structures.
pub mod monitoring;
/// SSE event-stream client and notification dispatch.
pub mod stream;
/// Tracing/logging initialization.
pub mod tracing_setup;
/// Wire data models for the backend.
pub mod types;
/// Notification presentation loop.
pub mod ui;

/// Primary crate error type.
pub use error::LeilaoError;
