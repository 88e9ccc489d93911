//! Daily Load Profiles
//!
//! Turns flat, time-stamped net-load readings into a day-by-timeslot matrix
//! per household.

mod error;
mod matrix;
mod reshape;
mod series;

pub use error::ShapeError;
pub use matrix::DailyMatrix;
pub use reshape::{DailyReshaper, ReshapeConfig};
pub use series::{RawSeries, Reading};

/// Half-hourly slots per day on the reference metering grid
pub const SLOTS_PER_DAY: usize = 48;
