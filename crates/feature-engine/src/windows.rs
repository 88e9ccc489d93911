//! Feature Catalogue
//!
//! The feature set is data: every (day subset, time window, statistic)
//! triple below becomes one named column. Extraction walks this table.

use crate::error::FeatureError;
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Number of features in the vector
/// (3 day subsets x (5 windows x 4 stats + 1 total))
pub const FEATURE_DIMENSION: usize = 63;

/// Interior boundaries on the 48-slot grid: 10:00, 14:00, 17:00
const NOON_START: usize = 21;
const AFTERNOON_START: usize = 29;
const EVENING_START: usize = 35;
const REFERENCE_SLOTS: usize = 48;

/// Which days of the week contribute to a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DaySubset {
    AllDays,
    Weekdays,
    Weekends,
}

impl DaySubset {
    pub const ALL: [DaySubset; 3] = [DaySubset::AllDays, DaySubset::Weekdays, DaySubset::Weekends];

    /// Whether a day with this weekday belongs to the subset
    pub fn includes(&self, weekday: Weekday) -> bool {
        let weekend = matches!(weekday, Weekday::Sat | Weekday::Sun);
        match self {
            DaySubset::AllDays => true,
            DaySubset::Weekdays => !weekend,
            DaySubset::Weekends => weekend,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DaySubset::AllDays => "all_days",
            DaySubset::Weekdays => "weekdays",
            DaySubset::Weekends => "weekends",
        }
    }
}

/// Time-of-day segment of the PV-affected part of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeWindow {
    /// `[morning_start, afternoon_end)`
    All,
    /// `[morning_start, 10:00)`
    Morning,
    /// `[10:00, 14:00)`
    Noon,
    /// `[14:00, 17:00)`
    Afternoon,
    /// `[17:00, afternoon_end)`
    Evening,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 5] = [
        TimeWindow::All,
        TimeWindow::Morning,
        TimeWindow::Noon,
        TimeWindow::Afternoon,
        TimeWindow::Evening,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::All => "all",
            TimeWindow::Morning => "morning",
            TimeWindow::Noon => "noon",
            TimeWindow::Afternoon => "afternoon",
            TimeWindow::Evening => "evening",
        }
    }

    /// Statistics reported for this window; the daily total only makes
    /// sense over the whole PV window.
    pub fn statistics(&self) -> &'static [Statistic] {
        match self {
            TimeWindow::All => &[
                Statistic::Mean,
                Statistic::Max,
                Statistic::Min,
                Statistic::StdDev,
                Statistic::Total,
            ],
            _ => &[
                Statistic::Mean,
                Statistic::Max,
                Statistic::Min,
                Statistic::StdDev,
            ],
        }
    }
}

/// Per-day statistic, averaged over eligible days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statistic {
    Mean,
    Max,
    Min,
    StdDev,
    Total,
}

impl Statistic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Max => "max",
            Statistic::Min => "min",
            Statistic::StdDev => "sd",
            Statistic::Total => "total",
        }
    }
}

/// One column of the feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub subset: DaySubset,
    pub window: TimeWindow,
    pub statistic: Statistic,
}

impl FeatureSpec {
    /// Stable column name, e.g. `weekends_noon_sd`
    pub fn name(&self) -> String {
        format!(
            "{}_{}_{}",
            self.subset.as_str(),
            self.window.as_str(),
            self.statistic.as_str()
        )
    }
}

/// All features in output order: day subset, then window, then statistic
pub fn feature_catalogue() -> Vec<FeatureSpec> {
    let mut specs = Vec::with_capacity(FEATURE_DIMENSION);
    for subset in DaySubset::ALL {
        for window in TimeWindow::ALL {
            for &statistic in window.statistics() {
                specs.push(FeatureSpec {
                    subset,
                    window,
                    statistic,
                });
            }
        }
    }
    specs
}

/// Column names in output order
pub fn feature_names() -> Vec<String> {
    feature_catalogue().iter().map(FeatureSpec::name).collect()
}

/// Slot ranges of the five windows on a concrete daily grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowBounds {
    morning_start: usize,
    noon_start: usize,
    afternoon_start: usize,
    evening_start: usize,
    end: usize,
}

impl WindowBounds {
    /// Resolve window ranges for a grid of `num_obs` slots per day.
    ///
    /// Ranges are half-open: `afternoon_end` is the first slot after the PV
    /// window. Interior boundaries scale from the 48-slot grid by rounding to
    /// the nearest slot.
    pub fn resolve(
        morning_start: usize,
        afternoon_end: usize,
        num_obs: usize,
    ) -> Result<Self, FeatureError> {
        if morning_start >= afternoon_end || afternoon_end > num_obs {
            return Err(FeatureError::InvalidBounds {
                morning_start,
                afternoon_end,
                num_obs,
            });
        }

        let end = afternoon_end;
        let clamp = |slot: usize| scale_boundary(slot, num_obs).clamp(morning_start, end);
        let noon_start = clamp(NOON_START);
        let afternoon_start = clamp(AFTERNOON_START).max(noon_start);
        let evening_start = clamp(EVENING_START).max(afternoon_start);

        Ok(Self {
            morning_start,
            noon_start,
            afternoon_start,
            evening_start,
            end,
        })
    }

    /// Slot range covered by a window (may be empty on coarse grids)
    pub fn range(&self, window: TimeWindow) -> Range<usize> {
        match window {
            TimeWindow::All => self.morning_start..self.end,
            TimeWindow::Morning => self.morning_start..self.noon_start,
            TimeWindow::Noon => self.noon_start..self.afternoon_start,
            TimeWindow::Afternoon => self.afternoon_start..self.evening_start,
            TimeWindow::Evening => self.evening_start..self.end,
        }
    }
}

fn scale_boundary(slot: usize, num_obs: usize) -> usize {
    (slot * num_obs + REFERENCE_SLOTS / 2) / REFERENCE_SLOTS
}
