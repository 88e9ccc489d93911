use super::{label_for, Model, TrainSettings};
use crate::TrainingError;
use feature_engine::Label;
use nalgebra::{DMatrix, DVector};
use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;

/// Ridge added to the pooled covariance, relative to its mean diagonal
const SHRINKAGE: f64 = 1e-9;

/// Linear discriminant analysis with a pooled within-class covariance
#[derive(Debug, Clone, PartialEq)]
pub struct Lda {
    /// Per class: Sigma^-1 mu
    direction: [DVector<f64>; 2],
    /// Per class: -0.5 mu' Sigma^-1 mu + ln prior
    offset: [f64; 2],
}

impl Lda {
    fn discriminant(&self, class: usize, row: ArrayView1<'_, f64>) -> f64 {
        self.offset[class]
            + row
                .iter()
                .zip(self.direction[class].iter())
                .map(|(v, d)| v * d)
                .sum::<f64>()
    }
}

impl Model for Lda {
    type Params = ();

    const NAME: &'static str = "LDA";

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
        let (n, p) = x.dim();
        if n <= 2 {
            return Err(TrainingError::Singular { model: Self::NAME });
        }

        let mut means = [DVector::<f64>::zeros(p), DVector::<f64>::zeros(p)];
        let mut counts = [0usize; 2];
        for (row, label) in x.rows().into_iter().zip(y) {
            let class = usize::from(label.code());
            counts[class] += 1;
            for (j, v) in row.iter().enumerate() {
                means[class][j] += v;
            }
        }
        if counts.contains(&0) {
            return Err(TrainingError::SingleClass { model: Self::NAME });
        }
        for class in 0..2 {
            means[class] /= counts[class] as f64;
        }

        let mut pooled = DMatrix::<f64>::zeros(p, p);
        for (row, label) in x.rows().into_iter().zip(y) {
            let class = usize::from(label.code());
            let d = DVector::from_iterator(p, row.iter().copied()) - &means[class];
            pooled += &d * d.transpose();
        }
        pooled /= (n - 2) as f64;

        let ridge = SHRINKAGE * pooled.trace() / p as f64;
        for j in 0..p {
            pooled[(j, j)] += ridge;
        }
        let inverse = pooled
            .try_inverse()
            .ok_or(TrainingError::Singular { model: Self::NAME })?;

        let mut offset = [0.0; 2];
        let direction = [&inverse * &means[0], &inverse * &means[1]];
        for class in 0..2 {
            let prior = counts[class] as f64 / n as f64;
            offset[class] = -0.5 * means[class].dot(&direction[class]) + prior.ln();
        }
        if offset.iter().any(|o| !o.is_finite())
            || direction.iter().any(|d| d.iter().any(|v| !v.is_finite()))
        {
            return Err(TrainingError::NonFinite { model: Self::NAME });
        }

        Ok(Self { direction, offset })
    }

    fn inputs(&self) -> usize {
        self.direction[0].len()
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> Label {
        label_for(self.discriminant(1, row) > self.discriminant(0, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::separable;
    use ndarray::array;
    use rand::SeedableRng;

    #[test]
    fn test_separates_blobs() {
        let (x, y) = separable(30);
        let mut rng = StdRng::seed_from_u64(0);
        let lda = Lda::fit(x.view(), &y, (), &TrainSettings::default(), &mut rng).unwrap();
        assert_eq!(lda.predict(x.view()), y);
    }

    #[test]
    fn test_collinear_inputs_are_singular() {
        // Second column is a copy of the first and every point sits on its
        // class mean, so the pooled covariance is zero
        let x = array![[1.0, 1.0], [1.0, 1.0], [3.0, 3.0], [3.0, 3.0]];
        let y = [Label::Pv, Label::Pv, Label::NonPv, Label::NonPv];
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            Lda::fit(x.view(), &y, (), &TrainSettings::default(), &mut rng),
            Err(TrainingError::Singular { model: "LDA" })
        );
    }
}
