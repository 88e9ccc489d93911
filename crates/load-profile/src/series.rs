//! Raw Meter Series

use crate::error::ShapeError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One metered net-load value keyed by calendar date and timeslot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Calendar date of the reading
    pub date: NaiveDate,
    /// Timeslot index within the day, in `[0, num_obs)`
    pub slot: usize,
    /// Net load; `None` when the meter reported nothing
    pub value: Option<f64>,
}

impl Reading {
    /// Create a reading
    pub fn new(date: NaiveDate, slot: usize, value: Option<f64>) -> Self {
        Self { date, slot, value }
    }
}

/// Ordered readings for a single household
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    /// Household identifier
    pub household: String,
    /// Readings in input order
    pub readings: Vec<Reading>,
}

impl RawSeries {
    /// Create a series from existing readings
    pub fn new(household: impl Into<String>, readings: Vec<Reading>) -> Self {
        Self {
            household: household.into(),
            readings,
        }
    }

    /// Append a reading
    pub fn push(&mut self, date: NaiveDate, slot: usize, value: Option<f64>) {
        self.readings.push(Reading::new(date, slot, value));
    }

    /// Number of readings
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Check if the series holds no readings
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Split a wide table into one series per household.
    ///
    /// `dates` and `slots` form the shared timestamp grid; each column holds
    /// one household's values on that grid.
    pub fn from_columns(
        dates: &[NaiveDate],
        slots: &[usize],
        columns: &[(String, Vec<Option<f64>>)],
    ) -> Result<Vec<RawSeries>, ShapeError> {
        if slots.len() != dates.len() {
            return Err(ShapeError::LengthMismatch {
                expected: dates.len(),
                actual: slots.len(),
            });
        }

        columns
            .iter()
            .map(|(household, values)| {
                if values.len() != dates.len() {
                    return Err(ShapeError::LengthMismatch {
                        expected: dates.len(),
                        actual: values.len(),
                    });
                }
                let readings = dates
                    .iter()
                    .zip(slots)
                    .zip(values)
                    .map(|((&date, &slot), &value)| Reading::new(date, slot, value))
                    .collect();
                Ok(RawSeries::new(household.clone(), readings))
            })
            .collect()
    }
}
