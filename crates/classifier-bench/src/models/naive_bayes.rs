use super::{label_for, Model, TrainSettings};
use crate::TrainingError;
use feature_engine::Label;
use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use std::f64::consts::PI;

/// Gaussian naive Bayes
///
/// The hyperparameter is a variance floor expressed as a fraction of the
/// largest per-column variance.
#[derive(Debug, Clone, PartialEq)]
pub struct NaiveBayes {
    /// Per class (PV, non-PV): log prior
    log_prior: [f64; 2],
    /// Per class: column means
    mean: [Vec<f64>; 2],
    /// Per class: smoothed column variances
    variance: [Vec<f64>; 2],
}

impl NaiveBayes {
    fn log_likelihood(&self, class: usize, row: ArrayView1<'_, f64>) -> f64 {
        let mut ll = self.log_prior[class];
        for (j, &v) in row.iter().enumerate() {
            let var = self.variance[class][j];
            let d = v - self.mean[class][j];
            ll -= 0.5 * ((2.0 * PI * var).ln() + d * d / var);
        }
        ll
    }
}

fn moments(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var)
}

impl Model for NaiveBayes {
    type Params = f64;

    const NAME: &'static str = "NaiveBayes";

    fn grid() -> Vec<f64> {
        vec![1e-9, 1e-6, 1e-3, 1e-1]
    }

    fn hyperparameter(params: f64) -> Option<f64> {
        Some(params)
    }

    fn fit(
        x: ArrayView2<'_, f64>,
        y: &[Label],
        var_smoothing: f64,
        _settings: &TrainSettings,
        _rng: &mut StdRng,
    ) -> Result<Self, TrainingError> {
        let n = y.len();
        let cols = x.ncols();

        let epsilon = var_smoothing
            * x.columns()
                .into_iter()
                .map(|c| moments(&c.to_vec()).1)
                .fold(0.0, f64::max);

        let mut model = NaiveBayes {
            log_prior: [0.0; 2],
            mean: [vec![0.0; cols], vec![0.0; cols]],
            variance: [vec![0.0; cols], vec![0.0; cols]],
        };

        for class in 0..2 {
            let rows: Vec<usize> = (0..n)
                .filter(|&i| usize::from(y[i].code()) == class)
                .collect();
            if rows.is_empty() {
                return Err(TrainingError::SingleClass { model: Self::NAME });
            }
            model.log_prior[class] = (rows.len() as f64 / n as f64).ln();
            for j in 0..cols {
                let values: Vec<f64> = rows.iter().map(|&i| x[[i, j]]).collect();
                let (mean, var) = moments(&values);
                let var = var + epsilon;
                if var <= 0.0 {
                    return Err(TrainingError::Singular { model: Self::NAME });
                }
                model.mean[class][j] = mean;
                model.variance[class][j] = var;
            }
        }
        Ok(model)
    }

    fn inputs(&self) -> usize {
        self.mean[0].len()
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> Label {
        label_for(self.log_likelihood(1, row) > self.log_likelihood(0, row))
    }
}
