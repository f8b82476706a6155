pub mod auth;
pub mod chat_task;
pub mod extract;
pub mod inflight;
pub mod middleware;
pub mod pipeline;
pub mod profile;
pub mod protocol;
pub mod rejection;
pub mod rest;
pub mod router;
pub mod state;
pub mod ws_handler;

// Re-export the pieces the binaries and integration tests build the server from.
pub use middleware::require_auth;
pub use router::build_router;
pub use ws_handler::ws_handler;
