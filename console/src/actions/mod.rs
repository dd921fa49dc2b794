pub mod coordinator;
pub mod fsm;
