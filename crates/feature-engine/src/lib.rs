//! Feature Engineering Engine
//!
//! Summarises a household's daily load profiles into a fixed, named feature
//! vector of time-of-day statistics, split by weekday and weekend.

mod error;
mod features;
mod statistics;
mod table;
mod windows;

pub use error::FeatureError;
pub use features::{EmptyWindowPolicy, ExtractorConfig, FeatureExtractor, FeatureVector};
pub use statistics::WindowStatistics;
pub use table::{FeatureTable, Label};
pub use windows::{
    feature_catalogue, feature_names, DaySubset, FeatureSpec, Statistic, TimeWindow,
    WindowBounds, FEATURE_DIMENSION,
};
