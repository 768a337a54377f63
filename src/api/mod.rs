//! HTTP API exposing the seeker
//!
//! Routes live under `/v1`; every response uses the [`ApiResponse`] envelope.

pub mod response;
pub mod routes;
pub mod server;

pub use response::{ApiResponse, Meta, ServerInfo};
pub use server::{router, ApiServer};
