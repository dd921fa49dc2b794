pub mod confirm;
pub mod list;
