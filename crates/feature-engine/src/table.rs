//! Labelled Feature Table

use crate::error::FeatureError;
use crate::features::FeatureVector;
use crate::windows::feature_names;
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ground-truth class of a household
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// Behind-the-meter PV generation
    Pv,
    /// No PV generation
    NonPv,
}

impl Label {
    /// Numeric class code (PV = 0, non-PV = 1)
    pub fn code(&self) -> u8 {
        match self {
            Label::Pv => 0,
            Label::NonPv => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Pv => "pv",
            Label::NonPv => "non_pv",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pv" | "0" | "true" => Ok(Label::Pv),
            "non_pv" | "nonpv" | "1" | "false" => Ok(Label::NonPv),
            other => Err(FeatureError::UnknownLabel(other.to_string())),
        }
    }
}

/// Households by features, with a class label per row
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    names: Vec<String>,
    households: Vec<String>,
    rows: Array2<f64>,
    labels: Vec<Label>,
}

impl FeatureTable {
    /// Empty table with the given column names
    pub fn new(names: Vec<String>) -> Self {
        let width = names.len();
        Self {
            names,
            households: Vec::new(),
            rows: Array2::zeros((0, width)),
            labels: Vec::new(),
        }
    }

    /// Empty table over the full feature catalogue
    pub fn with_catalogue() -> Self {
        Self::new(feature_names())
    }

    /// Build a table from raw rows
    pub fn from_rows(
        names: Vec<String>,
        households: Vec<String>,
        rows: Array2<f64>,
        labels: Vec<Label>,
    ) -> Result<Self, FeatureError> {
        if rows.ncols() != names.len() {
            return Err(FeatureError::DimensionMismatch {
                expected: names.len(),
                actual: rows.ncols(),
            });
        }
        if labels.len() != rows.nrows() || households.len() != rows.nrows() {
            return Err(FeatureError::LabelMismatch {
                expected: rows.nrows(),
                actual: labels.len().min(households.len()),
            });
        }
        Ok(Self {
            names,
            households,
            rows,
            labels,
        })
    }

    /// Append one household's feature vector with its label
    pub fn push(
        &mut self,
        household: impl Into<String>,
        features: &FeatureVector,
        label: Label,
    ) -> Result<(), FeatureError> {
        if features.values.len() != self.names.len() {
            return Err(FeatureError::DimensionMismatch {
                expected: self.names.len(),
                actual: features.values.len(),
            });
        }
        self.rows
            .push_row(ArrayView1::from(&features.values))
            .map_err(|_| FeatureError::DimensionMismatch {
                expected: self.names.len(),
                actual: features.values.len(),
            })?;
        self.households.push(household.into());
        self.labels.push(label);
        Ok(())
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.nrows()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.nrows() == 0
    }

    /// Number of feature columns
    pub fn width(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn households(&self) -> &[String] {
        &self.households
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Feature matrix without the label column
    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.rows.view()
    }

    /// One feature column
    pub fn column(&self, idx: usize) -> Result<ArrayView1<'_, f64>, FeatureError> {
        if idx >= self.width() {
            return Err(FeatureError::UnknownColumn(idx));
        }
        Ok(self.rows.column(idx))
    }

    /// Keep only the given columns, in the given order
    pub fn select(&self, columns: &[usize]) -> Result<FeatureTable, FeatureError> {
        if let Some(&bad) = columns.iter().find(|&&c| c >= self.width()) {
            return Err(FeatureError::UnknownColumn(bad));
        }
        Ok(Self {
            names: columns.iter().map(|&c| self.names[c].clone()).collect(),
            households: self.households.clone(),
            rows: self.rows.select(Axis(1), columns),
            labels: self.labels.clone(),
        })
    }

    /// Keep only the given rows, in the given order
    pub fn subset(&self, rows: &[usize]) -> FeatureTable {
        Self {
            names: self.names.clone(),
            households: rows.iter().map(|&r| self.households[r].clone()).collect(),
            rows: self.rows.select(Axis(0), rows),
            labels: rows.iter().map(|&r| self.labels[r]).collect(),
        }
    }

    /// Split rows at random into (train, test).
    ///
    /// The test part receives `round(len * test_fraction)` rows. The same
    /// seed always yields the same split.
    pub fn split(
        &self,
        test_fraction: f64,
        seed: u64,
    ) -> Result<(FeatureTable, FeatureTable), FeatureError> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(FeatureError::InvalidSplit(test_fraction));
        }

        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(&mut StdRng::seed_from_u64(seed));

        let test_len = (self.len() as f64 * test_fraction).round() as usize;
        let (test, train) = order.split_at(test_len);
        Ok((self.subset(train), self.subset(test)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn table() -> FeatureTable {
        FeatureTable::from_rows(
            vec!["a".into(), "b".into(), "c".into()],
            vec!["h1".into(), "h2".into(), "h3".into(), "h4".into()],
            array![
                [1.0, 10.0, 100.0],
                [2.0, 20.0, 200.0],
                [3.0, 30.0, 300.0],
                [4.0, 40.0, 400.0]
            ],
            vec![Label::Pv, Label::Pv, Label::NonPv, Label::NonPv],
        )
        .unwrap()
    }

    #[test]
    fn test_select_reorders_columns() {
        let selected = table().select(&[2, 0]).unwrap();
        assert_eq!(selected.names(), &["c".to_string(), "a".to_string()]);
        assert_eq!(selected.column(0).unwrap()[1], 200.0);
        assert_eq!(selected.labels().len(), 4);
        assert_eq!(table().select(&[3]).unwrap_err(), FeatureError::UnknownColumn(3));
    }

    #[test]
    fn test_push_checks_width() {
        let mut t = FeatureTable::new(vec!["a".into(), "b".into()]);
        let ok = FeatureVector {
            values: vec![1.0, 2.0],
            undefined: Vec::new(),
        };
        let bad = FeatureVector {
            values: vec![1.0],
            undefined: Vec::new(),
        };
        t.push("h1", &ok, Label::Pv).unwrap();
        assert!(t.push("h2", &bad, Label::NonPv).is_err());
        assert_eq!(t.len(), 1);
        assert_eq!(t.households(), &["h1".to_string()]);
    }

    #[test]
    fn test_split_is_seeded_partition() {
        let t = table();
        let (train, test) = t.split(0.25, 7).unwrap();
        assert_eq!(train.len(), 3);
        assert_eq!(test.len(), 1);

        let mut all: Vec<String> = train.households().to_vec();
        all.extend_from_slice(test.households());
        all.sort();
        assert_eq!(all, vec!["h1", "h2", "h3", "h4"]);

        let (again, _) = t.split(0.25, 7).unwrap();
        assert_eq!(again, train);
        assert!(t.split(1.0, 7).is_err());
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!("PV".parse::<Label>().unwrap(), Label::Pv);
        assert_eq!(" non_pv ".parse::<Label>().unwrap(), Label::NonPv);
        assert_eq!(Label::NonPv.code(), 1);
        assert!("maybe".parse::<Label>().is_err());
    }
}
