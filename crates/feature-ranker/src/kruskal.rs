//! Kruskal-Wallis Rank-Sum Test
//!
//! Tests whether samples come from the same distribution without assuming
//! normality. The H statistic is corrected for ties and referred to a
//! chi-squared distribution with `groups - 1` degrees of freedom.

use crate::RankError;
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Below this the H statistic is treated as exactly zero
const H_EPSILON: f64 = 1e-12;

/// Outcome of a Kruskal-Wallis test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KruskalWallis {
    /// Tie-corrected H statistic
    pub statistic: f64,
    /// Degrees of freedom (`groups - 1`)
    pub degrees_of_freedom: f64,
    /// Upper-tail p-value in `[0, 1]`
    pub p_value: f64,
}

impl KruskalWallis {
    /// Run the test over two or more groups.
    ///
    /// Fails when a group is empty, a value is not finite, or every value is
    /// tied (the rank statistic is then undefined).
    pub fn test(groups: &[&[f64]]) -> Result<Self, RankError> {
        if groups.len() < 2 {
            return Err(RankError::DegenerateInput(format!(
                "need at least 2 groups, got {}",
                groups.len()
            )));
        }
        if let Some(idx) = groups.iter().position(|g| g.is_empty()) {
            return Err(RankError::DegenerateInput(format!("group {} is empty", idx)));
        }

        let mut pooled: Vec<(f64, usize)> = Vec::new();
        for (group, values) in groups.iter().enumerate() {
            for &v in values.iter() {
                if !v.is_finite() {
                    return Err(RankError::DegenerateInput(format!(
                        "non-finite value {} in group {}",
                        v, group
                    )));
                }
                pooled.push((v, group));
            }
        }
        pooled.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = pooled.len();
        let mut rank_sums = vec![0.0; groups.len()];
        let mut tie_sum = 0.0;

        // Average ranks over runs of equal values
        let mut start = 0;
        while start < n {
            let mut end = start + 1;
            while end < n && pooled[end].0 == pooled[start].0 {
                end += 1;
            }
            let run = (end - start) as f64;
            let avg_rank = (start + end + 1) as f64 / 2.0;
            for &(_, group) in &pooled[start..end] {
                rank_sums[group] += avg_rank;
            }
            tie_sum += run * run * run - run;
            start = end;
        }

        let nf = n as f64;
        let correction = 1.0 - tie_sum / (nf * nf * nf - nf);
        if correction <= 0.0 {
            return Err(RankError::DegenerateInput("all values are tied".to_string()));
        }

        let spread: f64 = rank_sums
            .iter()
            .zip(groups)
            .map(|(r, g)| r * r / g.len() as f64)
            .sum();
        let mut statistic = (12.0 / (nf * (nf + 1.0)) * spread - 3.0 * (nf + 1.0)) / correction;
        if statistic < H_EPSILON {
            statistic = 0.0;
        }

        let degrees_of_freedom = (groups.len() - 1) as f64;
        let p_value = if statistic == 0.0 {
            1.0
        } else {
            match ChiSquared::new(degrees_of_freedom) {
                Ok(chi) => (1.0 - chi.cdf(statistic)).clamp(0.0, 1.0),
                Err(e) => return Err(RankError::DegenerateInput(e.to_string())),
            }
        };

        Ok(Self {
            statistic,
            degrees_of_freedom,
            p_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_separated_groups() {
        let low: &[f64] = &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let high: &[f64] = &[11.0, 12.0, 13.0, 14.0, 15.0, 16.0];
        let result = KruskalWallis::test(&[low, high]).unwrap();

        // 12/156 * (21^2/6 + 57^2/6) - 39
        assert!((result.statistic - 8.307_692).abs() < 1e-5);
        assert_eq!(result.degrees_of_freedom, 1.0);
        assert!(result.p_value < 0.01);
    }

    #[test]
    fn test_tie_correction() {
        let a: &[f64] = &[1.0, 1.0, 2.0];
        let b: &[f64] = &[2.0, 3.0, 3.0];
        let result = KruskalWallis::test(&[a, b]).unwrap();
        assert!((result.statistic - 10.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_identical_groups_give_p_one() {
        let a: &[f64] = &[1.0, 2.0, 3.0, 4.0, 5.0];
        let b: &[f64] = &[5.0, 4.0, 3.0, 2.0, 1.0];
        let result = KruskalWallis::test(&[a, b]).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_all_tied_is_degenerate() {
        let a: &[f64] = &[2.0, 2.0, 2.0];
        let b: &[f64] = &[2.0, 2.0];
        assert!(matches!(
            KruskalWallis::test(&[a, b]),
            Err(RankError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_empty_group_is_degenerate() {
        let a: &[f64] = &[1.0, 2.0];
        let b: &[f64] = &[];
        assert!(KruskalWallis::test(&[a, b]).is_err());
        assert!(KruskalWallis::test(&[a]).is_err());
    }

    #[test]
    fn test_nan_is_rejected() {
        let a: &[f64] = &[1.0, f64::NAN];
        let b: &[f64] = &[3.0, 4.0];
        assert!(KruskalWallis::test(&[a, b]).is_err());
    }

    proptest! {
        #[test]
        fn test_p_value_bounded_and_scale_invariant(
            a in proptest::collection::vec(-100.0f64..100.0, 2..20),
            b in proptest::collection::vec(-100.0f64..100.0, 2..20),
        ) {
            let result = KruskalWallis::test(&[a.as_slice(), b.as_slice()]).unwrap();
            prop_assert!((0.0..=1.0).contains(&result.p_value));

            // Doubling is exact, so ranks and ties are unchanged
            let a2: Vec<f64> = a.iter().map(|v| v * 2.0).collect();
            let b2: Vec<f64> = b.iter().map(|v| v * 2.0).collect();
            let scaled = KruskalWallis::test(&[a2.as_slice(), b2.as_slice()]).unwrap();
            prop_assert_eq!(result.statistic, scaled.statistic);
        }
    }
}
