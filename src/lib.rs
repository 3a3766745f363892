//! Learning assistant chat service: a streaming chat endpoint backed by a
//! generative model, with study-material recommendations from a hosted store.

// Strict policy: no unsafe, everything public is documented.
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(non_camel_case_types)]
#![deny(unused_must_use)] // Results and Options must be handled explicitly
#![deny(non_snake_case)]
#![deny(non_upper_case_globals)]
#![deny(nonstandard_style)]
#![forbid(unsafe_op_in_unsafe_fn)]
// Clippy discipline
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::unwrap_in_result)]
#![deny(clippy::module_inception)]
#![deny(clippy::redundant_clone)]
#![deny(clippy::shadow_unrelated)]
#![deny(clippy::too_many_arguments)]
#![deny(clippy::cognitive_complexity)]
#![deny(overflowing_literals)]
#![cfg_attr(
    test,
    allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

/// Chat turn handling: validation, prompt building, frame emission.
pub mod chat;
/// Streaming client and conversation state.
pub mod client;
/// Explicit application configuration.
pub mod config;
/// Generative model abstraction and the Gemini client.
pub mod llm;
/// Learning materials: store access and request classification.
pub mod materials;
/// Localized user-facing messages.
pub mod messages;
/// Streaming wire protocol shared by server and client.
pub mod protocol;
/// HTTP server and API routes.
#[allow(
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::unused_async
)]
pub mod server;
/// Entry helpers to start the server process.
pub mod start_server;
/// Core data model.
pub mod types;

#[cfg(test)]
pub(crate) mod testing;
