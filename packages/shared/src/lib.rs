//! Shared utilities for the Irori workspace.
//!
//! - `logger`: tracing subscriber setup for binaries
//! - `time`: clock abstraction and the compact timestamp format

pub mod logger;
pub mod time;
