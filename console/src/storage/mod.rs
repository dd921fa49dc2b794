//! Local storage: layout, settings and session

pub mod layout;
pub mod session;
pub mod settings;
