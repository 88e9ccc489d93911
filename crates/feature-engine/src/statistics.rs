//! Window Statistics Computation

use serde::{Deserialize, Serialize};

/// Summary statistics of one day's load over a window of timeslots
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowStatistics {
    /// Mean value
    pub mean: f64,
    /// Maximum value
    pub max: f64,
    /// Minimum value
    pub min: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std_dev: f64,
    /// Sum over the window
    pub total: f64,
}

impl WindowStatistics {
    /// Compute statistics from a slice of values.
    ///
    /// Returns `None` for an empty slice. A single value has no spread, so
    /// its standard deviation is 0.
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;

        let total: f64 = values.iter().sum();
        let mean = total / n;

        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let std_dev = if values.len() >= 2 {
            let m2: f64 = values.iter().map(|&v| (v - mean) * (v - mean)).sum();
            (m2 / (n - 1.0)).sqrt()
        } else {
            0.0
        };

        Some(Self {
            mean,
            max,
            min,
            std_dev,
            total,
        })
    }

    /// Average per-day statistics field by field.
    ///
    /// Returns `None` when no day contributed.
    pub fn average(days: &[WindowStatistics]) -> Option<Self> {
        if days.is_empty() {
            return None;
        }

        let n = days.len() as f64;
        let mut sum = Self::default();
        for day in days {
            sum.mean += day.mean;
            sum.max += day.max;
            sum.min += day.min;
            sum.std_dev += day.std_dev;
            sum.total += day.total;
        }

        Some(Self {
            mean: sum.mean / n,
            max: sum.max / n,
            min: sum.min / n,
            std_dev: sum.std_dev / n,
            total: sum.total / n,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_computation() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = WindowStatistics::compute(&values).unwrap();
        assert!((stats.mean - 3.0).abs() < 1e-12);
        assert!((stats.total - 15.0).abs() < 1e-12);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
    }

    #[test]
    fn test_sample_std_dev() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = WindowStatistics::compute(&values).unwrap();
        // Sum of squared deviations is 32 over 7 degrees of freedom
        assert!((stats.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_single_value_has_no_spread() {
        let stats = WindowStatistics::compute(&[-0.7]).unwrap();
        assert_eq!(stats.mean, -0.7);
        assert_eq!(stats.max, -0.7);
        assert_eq!(stats.min, -0.7);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn test_empty_values() {
        assert!(WindowStatistics::compute(&[]).is_none());
        assert!(WindowStatistics::average(&[]).is_none());
    }

    #[test]
    fn test_average_is_fieldwise() {
        let a = WindowStatistics::compute(&[2.0, 3.0]).unwrap();
        let b = WindowStatistics::compute(&[6.0, 7.0]).unwrap();
        let avg = WindowStatistics::average(&[a, b]).unwrap();
        assert!((avg.mean - 4.5).abs() < 1e-12);
        assert!((avg.max - 5.0).abs() < 1e-12);
        assert!((avg.min - 4.0).abs() < 1e-12);
        assert!((avg.total - 9.0).abs() < 1e-12);
    }
}
