//! Static instrument table: symbol -> USD per point per contract.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::config::AppConfig;
use crate::error::{Result, ScheduleError};
use crate::traits::PointValueResolver;

/// Point values keyed by upper-case symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointValueTable {
    values: BTreeMap<String, Decimal>,
}

impl PointValueTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Adds or replaces one instrument.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPointValue` if `value` is not positive, `UnknownSymbol`
    /// if the symbol is blank.
    pub fn with_symbol(mut self, symbol: &str, value: Decimal) -> Result<Self> {
        let key = normalize_symbol(symbol);
        if key.is_empty() {
            return Err(ScheduleError::UnknownSymbol(symbol.to_string()));
        }
        if value <= Decimal::ZERO {
            return Err(ScheduleError::InvalidPointValue { symbol: key, value });
        }
        self.values.insert(key, value);
        Ok(self)
    }

    /// Builds the table from the `instruments` section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPointValue` for any non-positive entry.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config
            .instruments
            .iter()
            .try_fold(Self::new(), |table, (symbol, value)| {
                table.with_symbol(symbol, *value)
            })
    }

    /// Supported symbols in sorted order with their point values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.values.iter().map(|(s, v)| (s.as_str(), *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for PointValueTable {
    /// E-mini and Micro E-mini Nasdaq-100.
    fn default() -> Self {
        let mut values = BTreeMap::new();
        values.insert("NQ".to_string(), Decimal::from(20));
        values.insert("MNQ".to_string(), Decimal::from(2));
        Self { values }
    }
}

impl PointValueResolver for PointValueTable {
    fn point_value(&self, symbol: &str) -> Result<Decimal> {
        self.values
            .get(&normalize_symbol(symbol))
            .copied()
            .ok_or_else(|| ScheduleError::UnknownSymbol(symbol.to_string()))
    }
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn default_table_resolves_nq_and_mnq() {
        let table = PointValueTable::default();
        assert_eq!(table.point_value("NQ").unwrap(), dec!(20));
        assert_eq!(table.point_value("MNQ").unwrap(), dec!(2));
    }

    #[test]
    fn unknown_symbol_is_rejected() {
        let table = PointValueTable::default();
        assert_eq!(
            table.point_value("XYZ"),
            Err(ScheduleError::UnknownSymbol("XYZ".to_string()))
        );
        assert!(matches!(
            table.point_value(""),
            Err(ScheduleError::UnknownSymbol(_))
        ));
    }

    #[test]
    fn lookup_ignores_case_and_padding() {
        let table = PointValueTable::default();
        assert_eq!(table.point_value(" mnq ").unwrap(), dec!(2));
    }

    #[test]
    fn table_is_extendable() {
        let table = PointValueTable::default()
            .with_symbol("ES", dec!(50))
            .unwrap()
            .with_symbol("mes", dec!(5))
            .unwrap();
        assert_eq!(table.point_value("ES").unwrap(), dec!(50));
        assert_eq!(table.point_value("MES").unwrap(), dec!(5));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn non_positive_point_value_is_rejected() {
        let err = PointValueTable::new().with_symbol("ES", dec!(0)).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidPointValue { .. }));
    }

    #[test]
    fn from_config_uses_configured_instruments() {
        let mut config = AppConfig::default();
        config.instruments.insert("cl".to_string(), dec!(1000));
        let table = PointValueTable::from_config(&config).unwrap();
        assert_eq!(table.point_value("CL").unwrap(), dec!(1000));
        assert_eq!(table.point_value("NQ").unwrap(), dec!(20));
    }
}
