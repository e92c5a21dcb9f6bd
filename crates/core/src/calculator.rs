use rust_decimal::Decimal;

use crate::aggregate::aggregate;
use crate::config::AppConfig;
use crate::error::Result;
use crate::instrument::PointValueTable;
use crate::ladder::{normalize, DEFAULT_MAX_RUNGS_PER_LADDER};
use crate::schedule::evaluate;
use crate::traits::PointValueResolver;
use crate::types::{Fill, PositionPlan, Summary};

/// Prices a [`PositionPlan`] against an injected instrument table.
///
/// Holds no per-call state; one calculator can serve any number of plans
/// from any number of threads.
#[derive(Debug, Clone)]
pub struct ScheduleCalculator<R> {
    resolver: R,
    max_rungs_per_ladder: usize,
}

impl<R: PointValueResolver> ScheduleCalculator<R> {
    pub const fn new(resolver: R) -> Self {
        Self {
            resolver,
            max_rungs_per_ladder: DEFAULT_MAX_RUNGS_PER_LADDER,
        }
    }

    #[must_use]
    pub fn with_max_rungs_per_ladder(mut self, max_rungs_per_ladder: usize) -> Self {
        self.max_rungs_per_ladder = max_rungs_per_ladder;
        self
    }

    pub const fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Point value for `symbol` from the injected table.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSymbol` when the symbol is not supported.
    pub fn point_value(&self, symbol: &str) -> Result<Decimal> {
        self.resolver.point_value(symbol)
    }

    /// Validates the plan, expands its ladders, allocates triggered exits and
    /// summarizes the result. Either both outputs are returned or an error is.
    ///
    /// # Errors
    ///
    /// Returns the first validation, lookup, allocation or overflow error
    /// encountered.
    pub fn compute(&self, plan: &PositionPlan) -> Result<(Vec<Fill>, Summary)> {
        plan.validate()?;
        let point_value = self.resolver.point_value(&plan.symbol)?;
        let rungs = normalize(&plan.grids, self.max_rungs_per_ladder)?;
        let fills = evaluate(plan, &rungs, point_value)?;
        let summary = aggregate(plan, point_value, &fills)?;
        Ok((fills, summary))
    }
}

impl ScheduleCalculator<PointValueTable> {
    /// Builds a calculator from the instrument table and limits in `config`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPointValue` for any non-positive configured point value.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(PointValueTable::from_config(config)?)
            .with_max_rungs_per_ladder(config.limits.max_rungs_per_ladder))
    }
}

impl Default for ScheduleCalculator<PointValueTable> {
    fn default() -> Self {
        Self::new(PointValueTable::default())
    }
}

/// Computes fills and summary for `plan` with default ladder limits.
///
/// # Errors
///
/// See [`ScheduleCalculator::compute`].
pub fn compute_schedule_pnl<R: PointValueResolver>(
    plan: &PositionPlan,
    resolver: R,
) -> Result<(Vec<Fill>, Summary)> {
    ScheduleCalculator::new(resolver).compute(plan)
}
