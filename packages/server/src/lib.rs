//! Irori broadcast chat server library.
//!
//! A capacity-bounded connection registry, a rotating message log, image
//! uploads to a public bucket and best-effort fan-out of every message to the
//! live connections.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod app;
pub mod config;
