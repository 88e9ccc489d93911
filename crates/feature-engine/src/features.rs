//! Feature Vector Assembly

use crate::error::FeatureError;
use crate::statistics::WindowStatistics;
use crate::windows::{
    feature_catalogue, feature_names, DaySubset, Statistic, TimeWindow, WindowBounds,
    FEATURE_DIMENSION,
};
use chrono::Weekday;
use load_profile::DailyMatrix;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// What to do when a feature has no eligible days
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyWindowPolicy {
    /// Reject the whole vector with `FeatureError::InsufficientData`
    #[default]
    Fail,
    /// Emit NaN for the feature and list it in `FeatureVector::undefined`
    Nan,
}

/// Feature extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// First slot of the PV-affected window (inclusive)
    pub morning_start: usize,
    /// First slot after the PV-affected window (exclusive)
    pub afternoon_end: usize,
    /// Policy for features with no eligible days
    #[serde(default)]
    pub empty_window: EmptyWindowPolicy,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            morning_start: 14, // 07:00
            afternoon_end: 42, // 21:00
            empty_window: EmptyWindowPolicy::Fail,
        }
    }
}

/// Load-shape features of one household over one observation period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature values in catalogue order
    pub values: Vec<f64>,
    /// Names of features left undefined (NaN) under `EmptyWindowPolicy::Nan`
    pub undefined: Vec<String>,
}

impl FeatureVector {
    /// Feature names in the same order as `values`
    pub fn names(&self) -> Vec<String> {
        feature_names()
    }

    /// Look up a value by feature name
    pub fn get(&self, name: &str) -> Option<f64> {
        feature_catalogue()
            .iter()
            .position(|spec| spec.name() == name)
            .and_then(|idx| self.values.get(idx).copied())
    }

    /// Whether every feature is defined
    pub fn is_complete(&self) -> bool {
        self.undefined.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Feature extractor over daily profile matrices
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: ExtractorConfig,
}

impl FeatureExtractor {
    /// Create a new feature extractor
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract features using weekdays derived from the matrix dates
    pub fn extract(&self, matrix: &DailyMatrix) -> Result<FeatureVector, FeatureError> {
        self.extract_with_weekdays(matrix, &matrix.weekdays())
    }

    /// Extract features with an explicit weekday label per matrix row.
    ///
    /// Each feature averages a per-day statistic over the days of its subset
    /// whose window slice is fully present. Eligibility is decided per
    /// window, so a day with a gap in the evening still counts at noon.
    pub fn extract_with_weekdays(
        &self,
        matrix: &DailyMatrix,
        weekdays: &[Weekday],
    ) -> Result<FeatureVector, FeatureError> {
        if weekdays.len() != matrix.num_days() {
            return Err(FeatureError::LabelMismatch {
                expected: matrix.num_days(),
                actual: weekdays.len(),
            });
        }

        let bounds = WindowBounds::resolve(
            self.config.morning_start,
            self.config.afternoon_end,
            matrix.num_obs(),
        )?;

        let mut cache: HashMap<(DaySubset, TimeWindow), Option<WindowStatistics>> = HashMap::new();
        let mut values = Vec::with_capacity(FEATURE_DIMENSION);
        let mut undefined = Vec::new();

        for spec in feature_catalogue() {
            let stats = *cache
                .entry((spec.subset, spec.window))
                .or_insert_with(|| window_average(matrix, weekdays, spec.subset, &bounds, spec.window));

            match stats {
                Some(stats) => values.push(pick(&stats, spec.statistic)),
                None => match self.config.empty_window {
                    EmptyWindowPolicy::Fail => {
                        return Err(FeatureError::InsufficientData {
                            feature: spec.name(),
                        })
                    }
                    EmptyWindowPolicy::Nan => {
                        values.push(f64::NAN);
                        undefined.push(spec.name());
                    }
                },
            }
        }

        debug!(
            "Extracted {} features from {} days ({} undefined)",
            values.len(),
            matrix.num_days(),
            undefined.len()
        );

        Ok(FeatureVector { values, undefined })
    }
}

/// Average of per-day window statistics over eligible days of a subset
fn window_average(
    matrix: &DailyMatrix,
    weekdays: &[Weekday],
    subset: DaySubset,
    bounds: &WindowBounds,
    window: TimeWindow,
) -> Option<WindowStatistics> {
    let range = bounds.range(window);
    let days: Vec<WindowStatistics> = weekdays
        .iter()
        .enumerate()
        .filter(|(_, weekday)| subset.includes(**weekday))
        .filter_map(|(day, _)| matrix.window(day, range.clone()))
        .filter_map(|slice| WindowStatistics::compute(&slice))
        .collect();
    WindowStatistics::average(&days)
}

fn pick(stats: &WindowStatistics, statistic: Statistic) -> f64 {
    match statistic {
        Statistic::Mean => stats.mean,
        Statistic::Max => stats.max,
        Statistic::Min => stats.min,
        Statistic::StdDev => stats.std_dev,
        Statistic::Total => stats.total,
    }
}
