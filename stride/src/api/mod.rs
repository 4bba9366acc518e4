//! API module for the Stride HTTP server

pub mod auth;
pub mod routes;
pub mod server;

pub use auth::TokenAuth;
pub use server::{ApiServer, ApiServerConfig};
