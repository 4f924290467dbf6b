//! HTTP surface for vodstore: upload, listing, integrity, and artifact
//! delivery endpoints. Exposed as a library so integration tests can build
//! the router with test doubles.

pub mod api_doc;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
