//! Library crate for matchday-back, exposing modules for binaries and integration tests.

/// Configuration loaded from the environment.
pub mod config;
/// Records and the stores that persist them.
pub mod dao;
/// Wire payloads exchanged over HTTP and SSE.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// Points and tier arithmetic.
pub mod rating;
/// HTTP routes.
pub mod routes;
/// Business operations behind the routes.
pub mod services;
/// Shared application state and lifecycle state machines.
pub mod state;
