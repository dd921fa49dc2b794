mod mocks;

mod test_cache;
mod test_coordinator;
mod test_forms;
mod test_guard;
mod test_list;
mod test_poller;
mod test_wizard;
