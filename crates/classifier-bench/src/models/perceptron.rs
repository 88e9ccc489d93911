use super::{label_for, targets, Model, Standardizer, TrainSettings};
use crate::TrainingError;
use feature_engine::Label;
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::Rng;

/// Initial weights are drawn from `[-INIT_RANGE, INIT_RANGE]`
const INIT_RANGE: f64 = 0.7;

/// Feed-forward network with a single logistic hidden unit
#[derive(Debug, Clone, PartialEq)]
pub struct Perceptron {
    scaler: Standardizer,
    /// Input to hidden weights
    hidden_weights: Array1<f64>,
    hidden_bias: f64,
    /// Hidden to output weight
    output_weight: f64,
    output_bias: f64,
}

fn sigmoid(v: f64) -> f64 {
    1.0 / (1.0 + (-v).exp())
}

impl Perceptron {
    /// (hidden activation, output activation)
    fn forward(&self, z: ArrayView1<'_, f64>) -> (f64, f64) {
        let h = sigmoid(z.dot(&self.hidden_weights) + self.hidden_bias);
        (h, sigmoid(self.output_weight * h + self.output_bias))
    }

    fn is_finite(&self) -> bool {
        self.hidden_weights.iter().all(|w| w.is_finite())
            && self.hidden_bias.is_finite()
            && self.output_weight.is_finite()
            && self.output_bias.is_finite()
    }
}

impl Model for Perceptron {
    /// Weight decay
    type Params = f64;

    const NAME: &'static str = "Perceptron";

    fn grid() -> Vec<f64> {
        vec![0.0, 1e-4, 1e-3, 1e-2, 1e-1]
    }

    fn hyperparameter(params: f64) -> Option<f64> {
        Some(params)
    }

    fn fit(
        x: ArrayView2<'_, f64>,
        y: &[Label],
        decay: f64,
        settings: &TrainSettings,
        rng: &mut StdRng,
    ) -> Result<Self, TrainingError> {
        let scaler = Standardizer::fit(x);
        let z = scaler.transform(x);
        let t = targets(y);
        let n = t.len() as f64;

        let mut net = Perceptron {
            hidden_weights: Array1::from_shape_fn(x.ncols(), |_| {
                rng.gen_range(-INIT_RANGE..=INIT_RANGE)
            }),
            hidden_bias: rng.gen_range(-INIT_RANGE..=INIT_RANGE),
            output_weight: rng.gen_range(-INIT_RANGE..=INIT_RANGE),
            output_bias: rng.gen_range(-INIT_RANGE..=INIT_RANGE),
            scaler,
        };

        for _ in 0..settings.max_iterations {
            // Cross-entropy gradients, averaged over rows
            let mut grad_hidden = Array1::<f64>::zeros(x.ncols());
            let mut grad_hidden_bias = 0.0;
            let mut grad_output = 0.0;
            let mut grad_output_bias = 0.0;
            for (row, &ti) in z.rows().into_iter().zip(&t) {
                let (h, o) = net.forward(row);
                let delta_out = o - ti;
                grad_output += delta_out * h;
                grad_output_bias += delta_out;
                let delta_hidden = delta_out * net.output_weight * h * (1.0 - h);
                grad_hidden.scaled_add(delta_hidden, &row);
                grad_hidden_bias += delta_hidden;
            }

            let eta = settings.learning_rate;
            grad_hidden /= n;
            grad_hidden.scaled_add(decay, &net.hidden_weights);
            net.hidden_weights.scaled_add(-eta, &grad_hidden);
            net.hidden_bias -= eta * grad_hidden_bias / n;
            net.output_weight -= eta * (grad_output / n + decay * net.output_weight);
            net.output_bias -= eta * grad_output_bias / n;

            if !net.is_finite() {
                return Err(TrainingError::NonFinite { model: Self::NAME });
            }
        }

        Ok(net)
    }

    fn inputs(&self) -> usize {
        self.scaler.len()
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> Label {
        let z = self.scaler.apply(row);
        label_for(self.forward(z.view()).1 > 0.5)
    }
}
