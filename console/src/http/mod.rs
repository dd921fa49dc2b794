pub mod accounts;
pub mod client;
pub mod deployments;
pub mod endpoint;
pub mod platform;
