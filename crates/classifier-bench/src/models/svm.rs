use super::{label_for, Model, Standardizer, TrainSettings};
use crate::TrainingError;
use feature_engine::Label;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::rngs::StdRng;

/// Soft-margin linear SVM on standardized inputs
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSvm {
    scaler: Standardizer,
    weights: Array1<f64>,
    bias: f64,
}

/// 0.5 |w|^2 + C * mean hinge loss
fn objective(z: &Array2<f64>, t: &[f64], w: &Array1<f64>, b: f64, cost: f64) -> f64 {
    let hinge: f64 = z
        .rows()
        .into_iter()
        .zip(t)
        .map(|(row, &ti)| (1.0 - ti * (row.dot(w) + b)).max(0.0))
        .sum();
    0.5 * w.dot(w) + cost * hinge / t.len() as f64
}

impl Model for LinearSvm {
    type Params = f64;

    const NAME: &'static str = "SVM";

    fn grid() -> Vec<f64> {
        vec![0.01, 0.1, 1.0, 10.0, 100.0]
    }

    fn hyperparameter(params: f64) -> Option<f64> {
        Some(params)
    }

    fn fit(
        x: ArrayView2<'_, f64>,
        y: &[Label],
        cost: f64,
        settings: &TrainSettings,
        _rng: &mut StdRng,
    ) -> Result<Self, TrainingError> {
        let scaler = Standardizer::fit(x);
        let z = scaler.transform(x);
        let t: Vec<f64> = y
            .iter()
            .map(|l| if *l == Label::NonPv { 1.0 } else { -1.0 })
            .collect();
        let n = t.len() as f64;

        let mut w = Array1::<f64>::zeros(x.ncols());
        let mut b = 0.0;
        let mut best = (w.clone(), b, objective(&z, &t, &w, b, cost));

        for step in 1..=settings.max_iterations {
            let mut grad_w = w.clone();
            let mut grad_b = 0.0;
            for (row, &ti) in z.rows().into_iter().zip(&t) {
                if ti * (row.dot(&w) + b) < 1.0 {
                    grad_w.scaled_add(-cost * ti / n, &row);
                    grad_b -= cost * ti / n;
                }
            }

            let eta = settings.learning_rate / ((step as f64).sqrt() * cost.max(1.0));
            w.scaled_add(-eta, &grad_w);
            b -= eta * grad_b;

            let value = objective(&z, &t, &w, b, cost);
            if !value.is_finite() {
                return Err(TrainingError::NonFinite { model: Self::NAME });
            }
            if value < best.2 {
                best = (w.clone(), b, value);
            }
        }

        let (weights, bias, _) = best;
        Ok(Self {
            scaler,
            weights,
            bias,
        })
    }

    fn inputs(&self) -> usize {
        self.scaler.len()
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> Label {
        let z = self.scaler.apply(row);
        label_for(z.dot(&self.weights) + self.bias > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::separable;
    use rand::SeedableRng;

    #[test]
    fn test_separates_blobs() {
        let (x, y) = separable(30);
        let mut rng = StdRng::seed_from_u64(0);
        let svm = LinearSvm::fit(x.view(), &y, 1.0, &TrainSettings::default(), &mut rng).unwrap();
        assert_eq!(svm.predict(x.view()), y);
    }

    #[test]
    fn test_first_column_carries_the_weight() {
        let (x, y) = separable(30);
        let mut rng = StdRng::seed_from_u64(0);
        let svm = LinearSvm::fit(x.view(), &y, 10.0, &TrainSettings::default(), &mut rng).unwrap();
        assert!(svm.weights[0] > 0.0);
        assert!(svm.weights[0] > svm.weights[1].abs());
    }
}
