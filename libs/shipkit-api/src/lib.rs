//! Shipkit gateway API
//!
//! GraphQL documents and wire models shared by the console and its tests.

pub mod documents;
pub mod models;

pub use models::*;
