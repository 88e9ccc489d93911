//! Principal Component Projection

use crate::BenchmarkError;
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use tracing::debug;

/// Relative eigenvalue floor below which total variance counts as zero
const VARIANCE_EPSILON: f64 = 1e-12;

/// Mean-centred (not variance-scaled) principal component analysis
#[derive(Debug, Clone, PartialEq)]
pub struct Pca {
    /// Column means of the training data
    mean: Array1<f64>,
    /// Loadings, one column per component
    components: Array2<f64>,
    /// Variance along each kept component
    explained_variance: Vec<f64>,
    /// Sum of all eigenvalues
    total_variance: f64,
}

impl Pca {
    /// Fit `n_components` principal axes to the rows of `x`.
    ///
    /// Each axis is sign-normalised so its largest loading is positive,
    /// making the projection reproducible.
    pub fn fit(x: ArrayView2<'_, f64>, n_components: usize) -> Result<Self, BenchmarkError> {
        let (rows, cols) = x.dim();
        if rows < 2 || rows < cols {
            return Err(BenchmarkError::Projection(format!(
                "{} rows cannot span {} columns",
                rows, cols
            )));
        }
        if cols < n_components {
            return Err(BenchmarkError::Projection(format!(
                "{} columns cannot yield {} components",
                cols, n_components
            )));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(BenchmarkError::Projection(
                "input holds non-finite values".to_string(),
            ));
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| BenchmarkError::Projection("empty input".to_string()))?;
        let centered = &x - &mean;
        let covariance = centered.t().dot(&centered) / (rows as f64 - 1.0);

        let eigen = SymmetricEigen::new(DMatrix::from_fn(cols, cols, |i, j| covariance[[i, j]]));
        let total_variance: f64 = eigen.eigenvalues.iter().map(|v| v.max(0.0)).sum();
        if total_variance <= VARIANCE_EPSILON {
            return Err(BenchmarkError::Projection(
                "training features have zero variance".to_string(),
            ));
        }

        let mut order: Vec<usize> = (0..cols).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

        let mut components = Array2::zeros((cols, n_components));
        let mut explained_variance = Vec::with_capacity(n_components);
        for (k, &idx) in order.iter().take(n_components).enumerate() {
            let axis = eigen.eigenvectors.column(idx);
            let pivot = axis
                .iter()
                .copied()
                .fold(0.0f64, |acc, v| if v.abs() > acc.abs() { v } else { acc });
            let sign = if pivot < 0.0 { -1.0 } else { 1.0 };
            for i in 0..cols {
                components[[i, k]] = sign * axis[i];
            }
            explained_variance.push(eigen.eigenvalues[idx].max(0.0));
        }

        debug!(
            "PCA on {}x{}: explained variance {:?} of {:.4}",
            rows, cols, explained_variance, total_variance
        );

        Ok(Self {
            mean,
            components,
            explained_variance,
            total_variance,
        })
    }

    /// Project rows onto the fitted components
    pub fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, BenchmarkError> {
        if x.ncols() != self.mean.len() {
            return Err(BenchmarkError::ColumnMismatch {
                expected: self.mean.len(),
                actual: x.ncols(),
            });
        }
        let centered = &x - &self.mean;
        Ok(centered.dot(&self.components))
    }

    /// Loadings, one column per component
    pub fn components(&self) -> &Array2<f64> {
        &self.components
    }

    /// Share of total variance captured by each kept component
    pub fn explained_variance_ratio(&self) -> Vec<f64> {
        self.explained_variance
            .iter()
            .map(|v| v / self.total_variance)
            .collect()
    }
}
