//! Typed failures for the schedule calculator.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while validating a plan or computing its schedule.
///
/// Every variant is returned synchronously at the point of detection; the
/// calculator never produces partial output alongside an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The instrument symbol is not in the point-value table.
    #[error("unknown symbol: '{0}'")]
    UnknownSymbol(String),

    /// A fixed-price exit is malformed.
    #[error("invalid fixed exit: {0}")]
    InvalidExit(String),

    /// A grid ladder has a non-positive step or quantity per level.
    #[error("invalid grid ladder '{label}': {reason}")]
    InvalidLadder { label: String, reason: String },

    /// A grid ladder would expand into more rungs than allowed.
    #[error("grid ladder '{label}' expands to {rungs} rungs (limit {max})")]
    LadderTooLarge {
        label: String,
        rungs: usize,
        max: usize,
    },

    /// More quantity was allocated to fills than the position holds.
    #[error("allocated {closed} contracts against a position of {total}")]
    AllocationOverflow { closed: u64, total: u32 },

    /// The position itself is unusable (e.g. zero contracts).
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    /// A points or USD amount left the representable `Decimal` range.
    #[error("arithmetic overflow computing {0}")]
    ArithmeticOverflow(String),

    /// The instrument table holds a non-positive point value.
    #[error("point value for '{symbol}' must be positive, got {value}")]
    InvalidPointValue { symbol: String, value: Decimal },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
