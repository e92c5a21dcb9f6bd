//! CLI commands for the exit schedule calculator.

pub mod entry;
pub mod instruments;
pub mod schedule;

pub use entry::{run_entry, EntryArgs};
pub use instruments::run_instruments;
pub use schedule::{run_schedule, run_watch, ScheduleArgs, WatchArgs};
