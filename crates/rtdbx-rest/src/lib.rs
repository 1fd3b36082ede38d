//! rtdbx REST - Firebase Realtime Database REST client
//!
//! [`RestClient`] implements the `RtdbClient` contract over the REST API:
//! every path maps to `{database}/{path}.json`, credentials travel in the
//! `auth` query parameter, and query constraints are JSON-encoded query
//! parameters.

pub mod client;
pub mod error;

pub use client::{RestClient, DEFAULT_TIMEOUT};
pub use error::RestError;
