//! Authentication: session tokens and the session manager

pub mod session_mngr;
pub mod token;
