pub mod list_refresh;
pub mod poller;
