//! Daily Reshaper

use crate::error::ShapeError;
use crate::matrix::DailyMatrix;
use crate::series::RawSeries;
use crate::SLOTS_PER_DAY;
use chrono::NaiveDate;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Reshape configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReshapeConfig {
    /// Timeslots per day (48 for half-hourly metering)
    pub num_obs: usize,
}

impl Default for ReshapeConfig {
    fn default() -> Self {
        Self {
            num_obs: SLOTS_PER_DAY,
        }
    }
}

/// Converts flat meter readings into a day-by-timeslot matrix
#[derive(Debug, Clone, Default)]
pub struct DailyReshaper {
    config: ReshapeConfig,
}

impl DailyReshaper {
    /// Create a new reshaper
    pub fn new(config: ReshapeConfig) -> Self {
        Self { config }
    }

    /// Timeslots per day
    pub fn num_obs(&self) -> usize {
        self.config.num_obs
    }

    /// Reshape keyed readings.
    ///
    /// Rows follow the first-seen order of dates. Each reading lands in the
    /// cell named by its `(date, slot)` key, so input order within a day does
    /// not matter. Duplicate keys and slots past `num_obs` are rejected.
    pub fn reshape(&self, series: &RawSeries) -> Result<DailyMatrix, ShapeError> {
        let num_obs = self.config.num_obs;
        if num_obs == 0 {
            return Err(ShapeError::ZeroSlots);
        }

        let (dates, row_of) = distinct_dates(series.readings.iter().map(|r| r.date));
        let mut cells = Array2::from_elem((dates.len(), num_obs), None);
        let mut seen = Array2::from_elem((dates.len(), num_obs), false);

        for reading in &series.readings {
            if reading.slot >= num_obs {
                return Err(ShapeError::SlotOutOfRange {
                    date: reading.date,
                    slot: reading.slot,
                    num_obs,
                });
            }
            let row = row_of[&reading.date];
            if seen[[row, reading.slot]] {
                return Err(ShapeError::DuplicateSlot {
                    date: reading.date,
                    slot: reading.slot,
                });
            }
            seen[[row, reading.slot]] = true;
            cells[[row, reading.slot]] = reading.value;
        }

        debug!(
            "Reshaped {} readings of {} into {}x{} matrix",
            series.len(),
            series.household,
            dates.len(),
            num_obs
        );

        Ok(DailyMatrix::from_parts(dates, cells))
    }

    /// Reshape positional readings: one value per input row, filled into
    /// slots in the order rows are encountered for each date.
    ///
    /// A date with more rows than `num_obs` is an error, never truncated.
    pub fn reshape_positional(
        &self,
        dates: &[NaiveDate],
        values: &[Option<f64>],
    ) -> Result<DailyMatrix, ShapeError> {
        let num_obs = self.config.num_obs;
        if num_obs == 0 {
            return Err(ShapeError::ZeroSlots);
        }
        if values.len() != dates.len() {
            return Err(ShapeError::LengthMismatch {
                expected: dates.len(),
                actual: values.len(),
            });
        }

        let (distinct, row_of) = distinct_dates(dates.iter().copied());
        let mut cells = Array2::from_elem((distinct.len(), num_obs), None);
        let mut filled = vec![0usize; distinct.len()];

        for (date, &value) in dates.iter().zip(values) {
            let row = row_of[date];
            let slot = filled[row];
            if slot >= num_obs {
                let count = dates.iter().filter(|d| *d == date).count();
                return Err(ShapeError::TooManyReadings {
                    date: *date,
                    count,
                    num_obs,
                });
            }
            cells[[row, slot]] = value;
            filled[row] += 1;
        }

        Ok(DailyMatrix::from_parts(distinct, cells))
    }
}

/// Distinct dates in first-seen order, plus each date's row index
fn distinct_dates(
    dates: impl Iterator<Item = NaiveDate>,
) -> (Vec<NaiveDate>, HashMap<NaiveDate, usize>) {
    let mut order = Vec::new();
    let mut row_of = HashMap::new();
    for date in dates {
        row_of.entry(date).or_insert_with(|| {
            order.push(date);
            order.len() - 1
        });
    }
    (order, row_of)
}
