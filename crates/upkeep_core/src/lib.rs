pub mod clock;
pub mod config;
pub mod error;
pub mod ledger;
pub mod model;
pub mod notify;
pub mod recurrence;
pub mod reminders;
pub mod store;
pub mod sync;
pub mod task_api;
