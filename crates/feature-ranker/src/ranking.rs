//! Feature Ranking by Significance

use crate::kruskal::KruskalWallis;
use crate::RankError;
use feature_engine::{FeatureTable, Label};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankerConfig {
    /// Number of most significant features to keep
    pub top_k: usize,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self { top_k: 12 }
    }
}

/// p-value of one feature column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Column index in the source table
    pub index: usize,
    /// Column name
    pub name: String,
    /// Kruskal-Wallis p-value, lower is more discriminative
    pub p_value: f64,
}

/// Features ordered by ascending p-value; ties keep column order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificanceRanking {
    entries: Vec<FeatureImportance>,
}

impl SignificanceRanking {
    /// Build a ranking from unordered scores
    pub fn new(mut entries: Vec<FeatureImportance>) -> Self {
        // sort_by is stable, so equal p-values stay in column order
        entries.sort_by(|a, b| a.p_value.total_cmp(&b.p_value));
        Self { entries }
    }

    /// Entries, most significant first
    pub fn entries(&self) -> &[FeatureImportance] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Column indices of the `k` most significant features
    pub fn top_k(&self, k: usize) -> Vec<usize> {
        self.entries.iter().take(k).map(|e| e.index).collect()
    }

    /// p-value of a named feature
    pub fn p_value(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.p_value)
    }
}

/// Scores features by their power to separate PV from non-PV households
#[derive(Debug, Clone, Default)]
pub struct FeatureRanker {
    config: RankerConfig,
}

impl FeatureRanker {
    /// Create a new ranker
    pub fn new(config: RankerConfig) -> Self {
        Self { config }
    }

    /// p-value of a Kruskal-Wallis test between the PV and non-PV values
    pub fn importance(values: &[f64], labels: &[Label]) -> Result<f64, RankError> {
        if values.len() != labels.len() {
            return Err(RankError::LengthMismatch {
                values: values.len(),
                labels: labels.len(),
            });
        }

        let (pv, non_pv): (Vec<(f64, Label)>, Vec<(f64, Label)>) = values
            .iter()
            .copied()
            .zip(labels.iter().copied())
            .partition(|(_, label)| *label == Label::Pv);
        let pv: Vec<f64> = pv.into_iter().map(|(v, _)| v).collect();
        let non_pv: Vec<f64> = non_pv.into_iter().map(|(v, _)| v).collect();

        Ok(KruskalWallis::test(&[pv.as_slice(), non_pv.as_slice()])?.p_value)
    }

    /// Score every column of a table.
    ///
    /// Fails on the first column whose test is undefined, naming it.
    pub fn rank(&self, table: &FeatureTable) -> Result<SignificanceRanking, RankError> {
        let mut entries = Vec::with_capacity(table.width());
        for (index, name) in table.names().iter().enumerate() {
            let column = table.column(index)?.to_vec();
            let p_value =
                Self::importance(&column, table.labels()).map_err(|e| RankError::Feature {
                    feature: name.clone(),
                    source: Box::new(e),
                })?;
            debug!("Feature {} p={:.3e}", name, p_value);
            entries.push(FeatureImportance {
                index,
                name: name.clone(),
                p_value,
            });
        }

        let ranking = SignificanceRanking::new(entries);
        if let Some(best) = ranking.entries().first() {
            info!(
                "Ranked {} features over {} households, best {} (p={:.3e})",
                ranking.len(),
                table.len(),
                best.name,
                best.p_value
            );
        }
        Ok(ranking)
    }

    /// Column indices of the configured number of top features
    pub fn select(&self, ranking: &SignificanceRanking) -> Vec<usize> {
        ranking.top_k(self.config.top_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn labels(pv: usize, non_pv: usize) -> Vec<Label> {
        let mut l = vec![Label::Pv; pv];
        l.extend(vec![Label::NonPv; non_pv]);
        l
    }

    #[test]
    fn test_importance_separated_groups() {
        let values = vec![-3.0, -2.5, -2.8, -3.1, -2.9, -2.7, 4.0, 4.2, 3.9, 4.1, 4.4, 3.8];
        let p = FeatureRanker::importance(&values, &labels(6, 6)).unwrap();
        assert!(p < 0.01);
    }

    #[test]
    fn test_importance_same_distribution() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        let p = FeatureRanker::importance(&values, &labels(5, 5)).unwrap();
        assert_eq!(p, 1.0);
    }

    #[test]
    fn test_importance_single_class_is_degenerate() {
        let err = FeatureRanker::importance(&[1.0, 2.0], &labels(2, 0)).unwrap_err();
        assert!(matches!(err, RankError::DegenerateInput(_)));
    }

    #[test]
    fn test_importance_length_mismatch() {
        let err = FeatureRanker::importance(&[1.0, 2.0, 3.0], &labels(1, 1)).unwrap_err();
        assert_eq!(err, RankError::LengthMismatch { values: 3, labels: 2 });
    }

    #[test]
    fn test_rank_orders_by_p_value_with_stable_ties() {
        // Column 0 is noise, column 1 separates, columns 2 and 3 are identical
        let rows = Array2::from_shape_vec(
            (8, 4),
            vec![
                1.0, 0.0, 5.0, 5.0, //
                2.0, 0.1, 6.0, 6.0, //
                3.0, 0.2, 7.0, 7.0, //
                4.0, 0.3, 8.0, 8.0, //
                4.0, 9.0, 8.0, 8.0, //
                3.0, 9.1, 5.0, 5.0, //
                2.0, 9.2, 6.0, 6.0, //
                1.0, 9.3, 7.5, 7.5,
            ],
        )
        .unwrap();
        let names = vec!["noise".into(), "signal".into(), "twin_a".into(), "twin_b".into()];
        let households = (0..8).map(|i| format!("h{}", i)).collect();
        let table = FeatureTable::from_rows(names, households, rows, labels(4, 4)).unwrap();

        let ranker = FeatureRanker::new(RankerConfig { top_k: 2 });
        let ranking = ranker.rank(&table).unwrap();

        assert_eq!(ranking.len(), 4);
        assert_eq!(ranking.entries()[0].name, "signal");
        let twin_a = ranking.entries().iter().position(|e| e.name == "twin_a").unwrap();
        let twin_b = ranking.entries().iter().position(|e| e.name == "twin_b").unwrap();
        assert_eq!(twin_b, twin_a + 1);
        assert_eq!(ranker.select(&ranking)[0], 1);
        assert_eq!(ranking.p_value("noise"), Some(1.0));
    }

    #[test]
    fn test_rank_names_degenerate_column() {
        let rows = Array2::from_shape_vec((4, 2), vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0, 4.0, 0.0])
            .unwrap();
        let names = vec!["ok".into(), "flat".into()];
        let households = (0..4).map(|i| format!("h{}", i)).collect();
        let table = FeatureTable::from_rows(names, households, rows, labels(2, 2)).unwrap();

        match FeatureRanker::default().rank(&table) {
            Err(RankError::Feature { feature, .. }) => assert_eq!(feature, "flat"),
            other => panic!("expected feature error, got {:?}", other),
        }
    }
}
