//! sora-node library crate.
//!
//! A host plugin node that generates videos through a Sora-compatible HTTP API:
//! build the request, optionally attach a PNG-encoded reference frame, submit
//! the task and poll it until the video URL is ready.

pub mod cli;
pub mod config;
pub mod node;
pub mod sora;
