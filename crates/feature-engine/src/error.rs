//! Feature Error Types

use thiserror::Error;

/// Errors during feature extraction and table assembly
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// No day in the subset has a complete slice for the window
    #[error("No eligible days for feature {feature}")]
    InsufficientData { feature: String },

    /// Weekday labels do not line up with matrix rows
    #[error("Expected {expected} weekday labels, got {actual}")]
    LabelMismatch { expected: usize, actual: usize },

    /// Window boundaries do not fit the daily grid
    #[error("Window [{morning_start}, {afternoon_end}) does not fit a {num_obs}-slot day")]
    InvalidBounds {
        morning_start: usize,
        afternoon_end: usize,
        num_obs: usize,
    },

    /// Row width does not match the table
    #[error("Expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Column index past the end of the table
    #[error("Feature column {0} does not exist")]
    UnknownColumn(usize),

    /// Unrecognised class label text
    #[error("Unknown class label: {0}")]
    UnknownLabel(String),

    /// Train/test fraction outside (0, 1)
    #[error("Test fraction {0} must lie strictly between 0 and 1")]
    InvalidSplit(f64),
}
