//! Average entry from either a typed price or the live open PnL.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::types::Side;

/// How the position's cost basis is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryBasis {
    /// Average entry typed directly.
    Average { avg_entry: Decimal },
    /// Back out the average entry from the current price and open PnL in USD.
    FromOpenPnl {
        current_price: Decimal,
        open_pnl_usd: Decimal,
    },
}

impl EntryBasis {
    /// Resolves the average entry price.
    ///
    /// For `FromOpenPnl` the open PnL is spread over `qty` contracts:
    /// `current - pnl / (pv * qty)` long, `current + pnl / (pv * qty)` short.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPosition` for a zero quantity, `InvalidPointValue` for
    /// a non-positive point value and `ArithmeticOverflow` when the derived
    /// price leaves the `Decimal` range.
    pub fn resolve(&self, side: Side, point_value: Decimal, qty: u32) -> Result<Decimal> {
        match *self {
            Self::Average { avg_entry } => Ok(avg_entry),
            Self::FromOpenPnl {
                current_price,
                open_pnl_usd,
            } => {
                if qty == 0 {
                    return Err(ScheduleError::InvalidPosition(
                        "qty must be positive to derive the average entry".to_string(),
                    ));
                }
                if point_value <= Decimal::ZERO {
                    return Err(ScheduleError::InvalidPointValue {
                        symbol: String::new(),
                        value: point_value,
                    });
                }
                let derived = point_value
                    .checked_mul(Decimal::from(qty))
                    .and_then(|usd_per_point| open_pnl_usd.checked_div(usd_per_point))
                    .and_then(|points| match side {
                        Side::Long => current_price.checked_sub(points),
                        Side::Short => current_price.checked_add(points),
                    });
                derived.ok_or_else(|| {
                    ScheduleError::ArithmeticOverflow("average entry".to_string())
                })
            }
        }
    }

    /// Mark price to use when none is given: the current price when the entry
    /// was derived from it, otherwise the average entry itself.
    #[must_use]
    pub fn default_mark(&self, resolved_avg_entry: Decimal) -> Decimal {
        match *self {
            Self::Average { .. } => resolved_avg_entry,
            Self::FromOpenPnl { current_price, .. } => current_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn typed_average_passes_through() {
        let basis = EntryBasis::Average {
            avg_entry: dec!(20150.25),
        };
        assert_eq!(basis.resolve(Side::Short, dec!(20), 3).unwrap(), dec!(20150.25));
        assert_eq!(basis.default_mark(dec!(20150.25)), dec!(20150.25));
    }

    #[test]
    fn long_entry_sits_below_current_when_in_profit() {
        // 2 NQ up $1,000 -> 25 points each.
        let basis = EntryBasis::FromOpenPnl {
            current_price: dec!(20100),
            open_pnl_usd: dec!(1000),
        };
        assert_eq!(basis.resolve(Side::Long, dec!(20), 2).unwrap(), dec!(20075));
        assert_eq!(basis.default_mark(dec!(20075)), dec!(20100));
    }

    #[test]
    fn short_entry_sits_above_current_when_in_profit() {
        let basis = EntryBasis::FromOpenPnl {
            current_price: dec!(20100),
            open_pnl_usd: dec!(1000),
        };
        assert_eq!(basis.resolve(Side::Short, dec!(20), 2).unwrap(), dec!(20125));
    }

    #[test]
    fn losing_long_entry_sits_above_current() {
        let basis = EntryBasis::FromOpenPnl {
            current_price: dec!(100),
            open_pnl_usd: dec!(-40),
        };
        assert_eq!(basis.resolve(Side::Long, dec!(2), 4).unwrap(), dec!(105));
    }

    #[test]
    fn zero_qty_cannot_derive_entry() {
        let basis = EntryBasis::FromOpenPnl {
            current_price: dec!(100),
            open_pnl_usd: dec!(10),
        };
        assert!(matches!(
            basis.resolve(Side::Long, dec!(20), 0),
            Err(ScheduleError::InvalidPosition(_))
        ));
    }

    #[test]
    fn untagged_forms_deserialize() {
        let avg: EntryBasis = serde_json::from_str(r#"{"avg_entry": "100.5"}"#).unwrap();
        assert_eq!(avg, EntryBasis::Average { avg_entry: dec!(100.5) });

        let derived: EntryBasis =
            serde_json::from_str(r#"{"current_price": "101", "open_pnl_usd": "-20"}"#).unwrap();
        assert_eq!(
            derived,
            EntryBasis::FromOpenPnl {
                current_price: dec!(101),
                open_pnl_usd: dec!(-20)
            }
        );
    }

    #[test]
    fn derived_entry_out_of_range_is_an_error() {
        let basis = EntryBasis::FromOpenPnl {
            current_price: Decimal::MAX,
            open_pnl_usd: dec!(-20),
        };
        assert!(matches!(
            basis.resolve(Side::Long, dec!(20), 1),
            Err(ScheduleError::ArithmeticOverflow(_))
        ));
    }
}
