//! Stride fitness backend server
//!
//! Hosts the mobile API on top of the `stride-bff` adaptation pipeline.
//! Domain data is served from in-process fixtures so the BFF behavior
//! can be exercised end to end without external services.

pub mod api;
pub mod fixtures;

pub use api::{ApiServer, ApiServerConfig, TokenAuth};
pub use fixtures::FixtureStore;
