//! services/api/src/lib.rs
//!
//! The NewsGuardian HTTP and WebSocket service, split from the binaries so the
//! router can be driven directly in integration tests.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
