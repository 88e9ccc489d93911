use super::{label_for, targets, Model, Standardizer, TrainSettings};
use crate::TrainingError;
use feature_engine::Label;
use nalgebra::{DMatrix, DVector};
use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use tracing::trace;

/// Penalty on slope coefficients; keeps separable data finite
const RIDGE: f64 = 1e-4;
/// Relative deviance change treated as converged
const TOLERANCE: f64 = 1e-8;
const MAX_IRLS_ITERATIONS: usize = 200;
const MAX_STEP_HALVINGS: usize = 30;
/// Fitted probabilities are kept this far from 0 and 1
const PROB_FLOOR: f64 = 1e-10;

/// Binomial GLM with logit link, fitted by iteratively reweighted least
/// squares
#[derive(Debug, Clone, PartialEq)]
pub struct Glm {
    scaler: Standardizer,
    /// Intercept followed by one slope per input
    coefficients: Vec<f64>,
}

fn sigmoid(eta: f64) -> f64 {
    1.0 / (1.0 + (-eta).exp())
}

/// Design matrix with a leading intercept column
fn design(z: &ndarray::Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(z.nrows(), z.ncols() + 1, |i, j| {
        if j == 0 {
            1.0
        } else {
            z[[i, j - 1]]
        }
    })
}

fn fitted(design: &DMatrix<f64>, beta: &DVector<f64>) -> DVector<f64> {
    (design * beta).map(|eta| sigmoid(eta).clamp(PROB_FLOOR, 1.0 - PROB_FLOOR))
}

/// Deviance plus the ridge penalty
fn penalized_deviance(y: &DVector<f64>, mu: &DVector<f64>, beta: &DVector<f64>) -> f64 {
    let deviance: f64 = y
        .iter()
        .zip(mu.iter())
        .map(|(&yi, &mi)| -2.0 * (yi * mi.ln() + (1.0 - yi) * (1.0 - mi).ln()))
        .sum();
    let slopes: f64 = beta.iter().skip(1).map(|b| b * b).sum();
    deviance + RIDGE * slopes
}

impl Model for Glm {
    type Params = ();

    const NAME: &'static str = "GLM";

    fn grid() -> Vec<()> {
        vec![()]
    }

    fn hyperparameter(_params: ()) -> Option<f64> {
        None
    }

    fn fit(
        x: ArrayView2<'_, f64>,
        y: &[Label],
        _params: (),
        _settings: &TrainSettings,
        _rng: &mut StdRng,
    ) -> Result<Self, TrainingError> {
        let scaler = Standardizer::fit(x);
        let design = design(&scaler.transform(x));
        let p = design.ncols();
        let y = DVector::from_vec(targets(y));

        let mut penalty = DMatrix::<f64>::identity(p, p) * RIDGE;
        penalty[(0, 0)] = 0.0;

        let mut beta = DVector::<f64>::zeros(p);
        let mut mu = fitted(&design, &beta);
        let mut deviance = penalized_deviance(&y, &mu, &beta);

        for iteration in 0..MAX_IRLS_ITERATIONS {
            let weights = mu.map(|m| m * (1.0 - m));
            let weighted = DMatrix::from_fn(design.nrows(), p, |i, j| design[(i, j)] * weights[i]);
            let hessian = design.transpose() * weighted + &penalty;
            let gradient = design.transpose() * (&y - &mu) - &penalty * &beta;

            let step = hessian
                .cholesky()
                .map(|c| c.solve(&gradient))
                .ok_or(TrainingError::Singular { model: Self::NAME })?;

            // Halve until the penalized deviance stops rising
            let mut scale = 1.0;
            let mut candidate = &beta + &step;
            let mut candidate_mu = fitted(&design, &candidate);
            let mut candidate_deviance = penalized_deviance(&y, &candidate_mu, &candidate);
            let mut halvings = 0;
            while candidate_deviance > deviance && halvings < MAX_STEP_HALVINGS {
                scale *= 0.5;
                candidate = &beta + &step * scale;
                candidate_mu = fitted(&design, &candidate);
                candidate_deviance = penalized_deviance(&y, &candidate_mu, &candidate);
                halvings += 1;
            }
            if !candidate_deviance.is_finite() || candidate.iter().any(|b| !b.is_finite()) {
                return Err(TrainingError::NonFinite { model: Self::NAME });
            }
            // No descent direction left
            if candidate_deviance > deviance {
                trace!("GLM stalled at iteration {}", iteration);
                return Ok(Self::from_beta(scaler, &beta));
            }

            let change = (deviance - candidate_deviance).abs() / (candidate_deviance.abs() + 0.1);
            beta = candidate;
            mu = candidate_mu;
            deviance = candidate_deviance;
            if change < TOLERANCE {
                trace!("GLM converged after {} iterations", iteration + 1);
                return Ok(Self::from_beta(scaler, &beta));
            }
        }

        Err(TrainingError::NotConverged {
            model: Self::NAME,
            iterations: MAX_IRLS_ITERATIONS,
        })
    }

    fn inputs(&self) -> usize {
        self.scaler.len()
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> Label {
        let z = self.scaler.apply(row);
        let eta = self.coefficients[0]
            + z.iter()
                .zip(&self.coefficients[1..])
                .map(|(v, b)| v * b)
                .sum::<f64>();
        label_for(eta > 0.0)
    }
}

impl Glm {
    fn from_beta(scaler: Standardizer, beta: &DVector<f64>) -> Self {
        Self {
            scaler,
            coefficients: beta.iter().copied().collect(),
        }
    }

    /// Probability of the non-PV class for one row
    pub fn probability(&self, row: ArrayView1<'_, f64>) -> f64 {
        let z = self.scaler.apply(row);
        let eta = self.coefficients[0]
            + z.iter()
                .zip(&self.coefficients[1..])
                .map(|(v, b)| v * b)
                .sum::<f64>();
        sigmoid(eta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::separable;
    use ndarray::array;
    use rand::SeedableRng;

    #[test]
    fn test_separable_data_stays_finite() {
        let (x, y) = separable(30);
        let mut rng = StdRng::seed_from_u64(0);
        let glm = Glm::fit(x.view(), &y, (), &TrainSettings::default(), &mut rng).unwrap();
        assert!(glm.coefficients.iter().all(|b| b.is_finite()));
        assert_eq!(glm.predict(x.view()), y);
    }

    #[test]
    fn test_overlapping_classes_give_calibrated_probabilities() {
        // Non-PV more likely as x grows, with overlap
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0]];
        let y = [
            Label::Pv,
            Label::Pv,
            Label::Pv,
            Label::NonPv,
            Label::Pv,
            Label::NonPv,
            Label::NonPv,
            Label::NonPv,
        ];
        let mut rng = StdRng::seed_from_u64(0);
        let glm = Glm::fit(x.view(), &y, (), &TrainSettings::default(), &mut rng).unwrap();
        let low = glm.probability(array![0.0].view());
        let high = glm.probability(array![7.0].view());
        assert!(low < 0.2);
        assert!(high > 0.8);
        // Symmetric data puts the boundary at the centre
        assert!((glm.probability(array![3.5].view()) - 0.5).abs() < 1e-6);
    }
}
