use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use sheetjitter_core::{Cell, Table, validate_table};

use crate::errors::RandomizeError;
use crate::model::{ColumnBound, ColumnRange, DeliveredCap, RandomizeOptions, RandomizeReport};
use crate::rules::{DELIVERED_HEADER, RuleCategory, SENT_HEADER, apply_rule, cap_delivered};
use crate::store::TableStore;

/// Output of a randomization pass.
#[derive(Debug, Clone)]
pub struct Randomized {
    pub table: Table,
    pub report: RandomizeReport,
}

/// Rewrites a column range of a table with per-header randomization rules.
#[derive(Debug, Clone, Default)]
pub struct TableRandomizer {
    options: RandomizeOptions,
    run_id: Option<String>,
}

impl TableRandomizer {
    pub fn new(options: RandomizeOptions) -> Self {
        Self {
            options,
            run_id: None,
        }
    }

    /// Tag reports with a caller-chosen id instead of a fresh UUID.
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    /// Read the whole store, randomize it and write it back in one call.
    ///
    /// Nothing is written when the table is malformed or the options do not
    /// resolve against its header.
    pub fn run(&self, store: &mut dyn TableStore) -> Result<RandomizeReport, RandomizeError> {
        let start = Instant::now();
        let location = store.describe();

        let table = store.read_all()?;
        debug!(store = %location, rows = table.rows().len(), "table read");

        let Randomized { table, mut report } = self.randomize(&table)?;
        store.write_all(&table)?;
        report.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            run_id = %report.run_id,
            store = %location,
            rows = report.rows,
            columns = report.columns,
            cells_randomized = report.cells_randomized,
            delivered_capped = report.delivered_capped,
            seed = report.seed,
            duration_ms = report.duration_ms,
            "randomization completed"
        );

        Ok(report)
    }

    /// Build a randomized copy of `table`; the input is never modified.
    pub fn randomize(&self, table: &Table) -> Result<Randomized, RandomizeError> {
        let seed = self.options.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.randomize_with_rng(table, seed, &mut rng)
    }

    fn randomize_with_rng<R: Rng + ?Sized>(
        &self,
        table: &Table,
        seed: u64,
        rng: &mut R,
    ) -> Result<Randomized, RandomizeError> {
        validate_options(&self.options)?;
        validate_table(table)?;

        let run_id = self
            .run_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let names = table.column_names();
        let range = resolve_range(table, &self.options)?;

        let mut report = RandomizeReport::new(run_id, seed);
        let (rows, columns) = table.dimensions();
        report.rows = rows;
        report.columns = columns;
        report.column_range = range;

        info!(
            run_id = %report.run_id,
            rows,
            columns,
            start = range.map(|range| range.start),
            end = range.map(|range| range.end),
            seed,
            "randomization started"
        );

        let Some(range) = range else {
            return Ok(Randomized {
                table: table.clone(),
                report,
            });
        };

        let plan: Vec<(usize, RuleCategory, bool)> = range
            .columns()
            .map(|col| {
                let category = self.options.rules.category(&names[col]);
                (col, category, is_capped_delivered(&names, col))
            })
            .collect();

        let header = table.header().map(<[Cell]>::to_vec).unwrap_or_default();
        let mut output = Vec::with_capacity(rows);
        output.push(header);

        for source in table.data_rows() {
            let mut row = source.clone();
            for &(col, category, capped) in &plan {
                let Some(value) = source[col].as_number() else {
                    report.record_pass_through();
                    continue;
                };

                let mut next = apply_rule(category, value, self.options.variation_factor, rng);
                if capped && category == RuleCategory::VolumePaired {
                    let sent = match self.options.delivered_cap {
                        DeliveredCap::RandomizedSent => row[col - 1].as_number(),
                        DeliveredCap::OriginalSent => source[col - 1].as_number(),
                    };
                    if let Some(sent) = sent
                        && let Some(capped_value) = cap_delivered(next, sent, rng)
                    {
                        next = capped_value;
                        report.record_delivered_cap();
                    }
                }

                row[col] = Cell::Number(next);
                report.record_rule(category);
            }
            output.push(row);
        }

        Ok(Randomized {
            table: Table::new(output),
            report,
        })
    }
}

/// Resolve the configured bounds against the header row.
///
/// Returns `None` when the range starts past the last column.
pub fn resolve_range(
    table: &Table,
    options: &RandomizeOptions,
) -> Result<Option<ColumnRange>, RandomizeError> {
    let start = resolve_bound(table, &options.start_column)?;
    let end = resolve_bound(table, &options.end_column)?;
    if start > end {
        return Err(RandomizeError::InvalidConfig(format!(
            "column range start {} is after end {}",
            options.start_column, options.end_column
        )));
    }

    let last = table.width().saturating_sub(1);
    if start > last {
        warn!(start, columns = table.width(), "column range starts past the last column");
        return Ok(None);
    }

    Ok(Some(ColumnRange {
        start,
        end: end.min(last),
    }))
}

fn resolve_bound(table: &Table, bound: &ColumnBound) -> Result<usize, RandomizeError> {
    match bound {
        ColumnBound::Index(index) => Ok(*index),
        ColumnBound::Header(name) => table.column_index(name).ok_or_else(|| {
            RandomizeError::InvalidConfig(format!("column '{name}' not found in header row"))
        }),
    }
}

fn validate_options(options: &RandomizeOptions) -> Result<(), RandomizeError> {
    if !options.variation_factor.is_finite() || options.variation_factor < 0.0 {
        return Err(RandomizeError::InvalidConfig(format!(
            "variation_factor must be a finite number >= 0, got {}",
            options.variation_factor
        )));
    }
    Ok(())
}

fn is_capped_delivered(names: &[String], col: usize) -> bool {
    col > 0 && names[col] == DELIVERED_HEADER && names[col - 1] == SENT_HEADER
}
