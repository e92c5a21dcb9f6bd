//! Staged-exit PnL schedule for futures positions.
//!
//! A position exits through fixed-price lumps and repeating grid ladders. Given
//! a mark price this crate decides which exits have triggered, allocates the
//! finite position quantity across them, and reports per-fill and aggregate
//! realized/unrealized PnL in USD.
//!
//! Every calculation is a pure function of its inputs: no I/O, no shared state.

pub mod aggregate;
pub mod calculator;
pub mod config;
pub mod config_loader;
pub mod config_watcher;
pub mod entry;
pub mod error;
pub mod instrument;
pub mod ladder;
pub mod schedule;
pub mod traits;
pub mod types;

pub use aggregate::{aggregate, grid_rollups, GridRollup};
pub use calculator::{compute_schedule_pnl, ScheduleCalculator};
pub use config::{AppConfig, LimitsConfig};
pub use config_loader::ConfigLoader;
pub use config_watcher::ConfigWatcher;
pub use entry::EntryBasis;
pub use error::{Result, ScheduleError};
pub use instrument::PointValueTable;
pub use ladder::{normalize, rung_count, DEFAULT_MAX_RUNGS_PER_LADDER};
pub use schedule::evaluate;
pub use traits::PointValueResolver;
pub use types::{
    Fill, FillKind, FixedExit, GridLadder, GridSort, PositionPlan, Rung, Side, Summary,
};
