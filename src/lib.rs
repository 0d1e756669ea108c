// ABOUTME: Library root for hubsync - exposes the sync engine for the binary and tests.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod error;
pub mod output;
pub mod runtime;
pub mod sync;
pub mod types;
