//! Shipkit Console Library
//!
//! Client side of the Shipkit dashboard: gateway transport, session,
//! deployment status polling and action coordination.

pub mod actions;
pub mod app;
pub mod authn;
pub mod cache;
pub mod domain;
pub mod errors;
pub mod filesys;
pub mod forms;
pub mod http;
pub mod logs;
pub mod notify;
pub mod server;
pub mod storage;
pub mod sync;
pub mod utils;
pub mod view;
pub mod workers;
