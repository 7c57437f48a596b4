use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::rules::{RuleCategory, RuleTable};

/// First column of the default range (sheet column D).
pub const DEFAULT_START_COLUMN: usize = 3;
/// Last column of the default range (sheet column P).
pub const DEFAULT_END_COLUMN: usize = 15;
/// `0.1` means roughly +/- 10% around the original value.
pub const DEFAULT_VARIATION_FACTOR: f64 = 0.1;

/// One end of the column range, by position or by header name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnBound {
    Index(usize),
    Header(String),
}

impl ColumnBound {
    /// Digits are read as a 0-based index, anything else as a header name.
    pub fn parse(value: &str) -> Self {
        match value.parse::<usize>() {
            Ok(index) => ColumnBound::Index(index),
            Err(_) => ColumnBound::Header(value.to_string()),
        }
    }
}

impl fmt::Display for ColumnBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnBound::Index(index) => write!(f, "{index}"),
            ColumnBound::Header(name) => write!(f, "'{name}'"),
        }
    }
}

/// Which `Sent` value caps an adjacent `Delivered` value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveredCap {
    /// The `Sent` value already written to the output row.
    #[default]
    RandomizedSent,
    /// The `Sent` value from the input row.
    OriginalSent,
}

/// Options for the randomizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomizeOptions {
    /// First column to randomize (inclusive).
    pub start_column: ColumnBound,
    /// Last column to randomize (inclusive); clamped to the table width.
    pub end_column: ColumnBound,
    /// Scales every proportional-noise rule.
    pub variation_factor: f64,
    /// Header name to rule category mapping.
    pub rules: RuleTable,
    pub delivered_cap: DeliveredCap,
    /// Fixed RNG seed; drawn from OS entropy when absent.
    pub seed: Option<u64>,
}

impl Default for RandomizeOptions {
    fn default() -> Self {
        Self {
            start_column: ColumnBound::Index(DEFAULT_START_COLUMN),
            end_column: ColumnBound::Index(DEFAULT_END_COLUMN),
            variation_factor: DEFAULT_VARIATION_FACTOR,
            rules: RuleTable::builtin(),
            delivered_cap: DeliveredCap::default(),
            seed: None,
        }
    }
}

/// Column range resolved against a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRange {
    pub start: usize,
    pub end: usize,
}

impl ColumnRange {
    pub fn columns(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// Summary of a randomization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomizeReport {
    pub run_id: String,
    pub seed: u64,
    /// Row count including the header.
    pub rows: usize,
    pub columns: usize,
    /// `None` when the range falls entirely past the last column.
    pub column_range: Option<ColumnRange>,
    pub cells_randomized: u64,
    pub cells_passed_through: u64,
    pub delivered_capped: u64,
    pub rule_usage: BTreeMap<String, u64>,
    pub duration_ms: u64,
}

impl RandomizeReport {
    pub fn new(run_id: String, seed: u64) -> Self {
        Self {
            run_id,
            seed,
            rows: 0,
            columns: 0,
            column_range: None,
            cells_randomized: 0,
            cells_passed_through: 0,
            delivered_capped: 0,
            rule_usage: BTreeMap::new(),
            duration_ms: 0,
        }
    }

    pub fn record_rule(&mut self, category: RuleCategory) {
        self.cells_randomized += 1;
        *self
            .rule_usage
            .entry(category.as_str().to_string())
            .or_insert(0) += 1;
    }

    pub fn record_pass_through(&mut self) {
        self.cells_passed_through += 1;
    }

    pub fn record_delivered_cap(&mut self) {
        self.delivered_capped += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bounds_from_text() {
        assert_eq!(ColumnBound::parse("4"), ColumnBound::Index(4));
        assert_eq!(
            ColumnBound::parse("Deferred"),
            ColumnBound::Header("Deferred".to_string())
        );
    }

    #[test]
    fn defaults_cover_columns_d_to_p() {
        let options = RandomizeOptions::default();
        assert_eq!(options.start_column, ColumnBound::Index(3));
        assert_eq!(options.end_column, ColumnBound::Index(15));
        assert_eq!(options.variation_factor, 0.1);
        assert_eq!(options.delivered_cap, DeliveredCap::RandomizedSent);
    }

    #[test]
    fn report_counts_rule_usage() {
        let mut report = RandomizeReport::new("run".to_string(), 7);
        report.record_rule(RuleCategory::LowCount);
        report.record_rule(RuleCategory::LowCount);
        report.record_rule(RuleCategory::Default);
        report.record_pass_through();
        assert_eq!(report.cells_randomized, 3);
        assert_eq!(report.cells_passed_through, 1);
        assert_eq!(report.rule_usage.get("low_count"), Some(&2));
    }
}
