//! Day-by-Timeslot Matrix

use crate::error::ShapeError;
use crate::series::RawSeries;
use chrono::{Datelike, NaiveDate, Weekday};
use ndarray::{Array2, ArrayView1};
use std::ops::Range;

/// Daily profiles of one household: one row per distinct date, one column
/// per timeslot. Missing cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyMatrix {
    dates: Vec<NaiveDate>,
    cells: Array2<Option<f64>>,
}

impl DailyMatrix {
    /// Build a matrix from explicit rows.
    ///
    /// Every row must have `num_obs` cells.
    pub fn from_rows(
        dates: Vec<NaiveDate>,
        rows: Vec<Vec<Option<f64>>>,
        num_obs: usize,
    ) -> Result<Self, ShapeError> {
        if num_obs == 0 {
            return Err(ShapeError::ZeroSlots);
        }
        if rows.len() != dates.len() {
            return Err(ShapeError::LengthMismatch {
                expected: dates.len(),
                actual: rows.len(),
            });
        }

        let mut cells = Array2::from_elem((dates.len(), num_obs), None);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != num_obs {
                return Err(ShapeError::LengthMismatch {
                    expected: num_obs,
                    actual: row.len(),
                });
            }
            for (j, &value) in row.iter().enumerate() {
                cells[[i, j]] = value;
            }
        }

        Ok(Self { dates, cells })
    }

    pub(crate) fn from_parts(dates: Vec<NaiveDate>, cells: Array2<Option<f64>>) -> Self {
        Self { dates, cells }
    }

    /// Number of days (rows)
    pub fn num_days(&self) -> usize {
        self.dates.len()
    }

    /// Number of timeslots per day (columns)
    pub fn num_obs(&self) -> usize {
        self.cells.ncols()
    }

    /// Row dates in first-seen order
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Cell value, `None` if missing or out of bounds
    pub fn get(&self, day: usize, slot: usize) -> Option<f64> {
        self.cells.get((day, slot)).copied().flatten()
    }

    /// One day's profile
    pub fn row(&self, day: usize) -> ArrayView1<'_, Option<f64>> {
        self.cells.row(day)
    }

    /// Whether every timeslot of the day is present
    pub fn is_complete(&self, day: usize) -> bool {
        self.cells.row(day).iter().all(Option::is_some)
    }

    /// Values of one day over a slot range, or `None` if any cell in the
    /// range is missing.
    pub fn window(&self, day: usize, slots: Range<usize>) -> Option<Vec<f64>> {
        if slots.end > self.num_obs() {
            return None;
        }
        slots.map(|slot| self.cells[[day, slot]]).collect()
    }

    /// Weekday of each row, derived from its date
    pub fn weekdays(&self) -> Vec<Weekday> {
        self.dates.iter().map(|date| date.weekday()).collect()
    }

    /// Flatten back into keyed readings, skipping missing cells
    pub fn to_series(&self, household: impl Into<String>) -> RawSeries {
        let mut series = RawSeries::new(household, Vec::new());
        for (day, &date) in self.dates.iter().enumerate() {
            for (slot, value) in self.cells.row(day).iter().enumerate() {
                if value.is_some() {
                    series.push(date, slot, *value);
                }
            }
        }
        series
    }
}
