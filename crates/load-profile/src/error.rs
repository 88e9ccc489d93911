//! Reshape Error Types

use chrono::NaiveDate;
use thiserror::Error;

/// Errors while building a daily profile matrix
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    /// The grid has no timeslots
    #[error("Number of timeslots per day must be positive")]
    ZeroSlots,

    /// A reading points past the last timeslot of the day
    #[error("Slot {slot} on {date} is outside [0, {num_obs})")]
    SlotOutOfRange {
        date: NaiveDate,
        slot: usize,
        num_obs: usize,
    },

    /// Two readings claim the same (date, slot) cell
    #[error("Duplicate reading for {date} slot {slot}")]
    DuplicateSlot { date: NaiveDate, slot: usize },

    /// Positional input holds more readings for a day than the grid has slots
    #[error("{date} has {count} readings, more than the {num_obs} slots per day")]
    TooManyReadings {
        date: NaiveDate,
        count: usize,
        num_obs: usize,
    },

    /// Parallel input columns disagree on length
    #[error("Column length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}
