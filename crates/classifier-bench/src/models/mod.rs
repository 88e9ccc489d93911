//! Linear Classifier Families
//!
//! Each family implements [`Model`]; the closed set is enumerated by
//! [`ClassifierKind`]. Targets are coded 1.0 for non-PV and 0.0 for PV.

mod glm;
mod lda;
mod naive_bayes;
mod perceptron;
mod svm;

pub use glm::Glm;
pub use lda::Lda;
pub use naive_bayes::NaiveBayes;
pub use perceptron::Perceptron;
pub use svm::LinearSvm;

use crate::validation::{select_params, Folds};
use crate::TrainingError;
use feature_engine::Label;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Iteration limits shared by the gradient-trained families
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainSettings {
    /// Gradient steps for SVM and perceptron
    pub max_iterations: usize,
    /// Base step size
    pub learning_rate: f64,
}

impl Default for TrainSettings {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            learning_rate: 0.5,
        }
    }
}

/// A trainable binary classifier
pub trait Model: Sized {
    /// Hyperparameter searched by cross-validation
    type Params: Copy + fmt::Debug;

    const NAME: &'static str;

    /// Candidates in search order
    fn grid() -> Vec<Self::Params>;

    /// Numeric value of a candidate for reporting
    fn hyperparameter(params: Self::Params) -> Option<f64>;

    fn fit(
        x: ArrayView2<'_, f64>,
        y: &[Label],
        params: Self::Params,
        settings: &TrainSettings,
        rng: &mut StdRng,
    ) -> Result<Self, TrainingError>;

    /// Number of input columns the model was fitted on
    fn inputs(&self) -> usize;

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> Label;

    fn predict(&self, x: ArrayView2<'_, f64>) -> Vec<Label> {
        x.rows().into_iter().map(|row| self.predict_row(row)).collect()
    }
}

/// Share of predictions equal to the truth
pub(crate) fn accuracy(predicted: &[Label], truth: &[Label]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let hits = predicted
        .iter()
        .zip(truth)
        .filter(|(p, t)| p == t)
        .count();
    hits as f64 / truth.len() as f64
}

/// 0/1 regression targets
pub(crate) fn targets(y: &[Label]) -> Vec<f64> {
    y.iter().map(|l| f64::from(l.code())).collect()
}

pub(crate) fn label_for(non_pv: bool) -> Label {
    if non_pv {
        Label::NonPv
    } else {
        Label::Pv
    }
}

/// Reject inputs no family can learn from
pub(crate) fn check_training(
    x: ArrayView2<'_, f64>,
    y: &[Label],
    model: &'static str,
) -> Result<(), TrainingError> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(TrainingError::EmptyTrainingSet);
    }
    if x.nrows() != y.len() {
        return Err(TrainingError::DimensionMismatch {
            expected: x.nrows(),
            actual: y.len(),
        });
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(TrainingError::NonFinite { model });
    }
    let first = y[0];
    if y.iter().all(|&l| l == first) {
        return Err(TrainingError::SingleClass { model });
    }
    Ok(())
}

/// Per-column z-scoring fitted on training rows
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl Standardizer {
    pub fn fit(x: ArrayView2<'_, f64>) -> Self {
        let mean = x
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(x.ncols()));
        // Constant columns are centred only
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 1e-12 { s } else { 1.0 });
        Self { mean, scale }
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    pub fn apply(&self, row: ArrayView1<'_, f64>) -> Array1<f64> {
        (&row - &self.mean) / &self.scale
    }

    pub fn transform(&self, x: ArrayView2<'_, f64>) -> Array2<f64> {
        (&x - &self.mean) / &self.scale
    }
}

/// The five benchmarked families, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    NaiveBayes,
    LinearSvm,
    Glm,
    Lda,
    Perceptron,
}

impl ClassifierKind {
    pub const ALL: [ClassifierKind; 5] = [
        ClassifierKind::NaiveBayes,
        ClassifierKind::LinearSvm,
        ClassifierKind::Glm,
        ClassifierKind::Lda,
        ClassifierKind::Perceptron,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ClassifierKind::NaiveBayes => NaiveBayes::NAME,
            ClassifierKind::LinearSvm => LinearSvm::NAME,
            ClassifierKind::Glm => Glm::NAME,
            ClassifierKind::Lda => Lda::NAME,
            ClassifierKind::Perceptron => Perceptron::NAME,
        }
    }

    /// Tune on `cv_folds` round-robin folds, then refit on all rows
    pub fn train(
        self,
        x: ArrayView2<'_, f64>,
        y: &[Label],
        cv_folds: usize,
        settings: &TrainSettings,
        rng: &mut StdRng,
    ) -> Result<TunedClassifier, TrainingError> {
        match self {
            ClassifierKind::NaiveBayes => {
                tune::<NaiveBayes>(x, y, cv_folds, settings, rng, TrainedClassifier::NaiveBayes)
            }
            ClassifierKind::LinearSvm => {
                tune::<LinearSvm>(x, y, cv_folds, settings, rng, TrainedClassifier::LinearSvm)
            }
            ClassifierKind::Glm => tune::<Glm>(x, y, cv_folds, settings, rng, TrainedClassifier::Glm),
            ClassifierKind::Lda => tune::<Lda>(x, y, cv_folds, settings, rng, TrainedClassifier::Lda),
            ClassifierKind::Perceptron => {
                tune::<Perceptron>(x, y, cv_folds, settings, rng, TrainedClassifier::Perceptron)
            }
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn tune<M: Model>(
    x: ArrayView2<'_, f64>,
    y: &[Label],
    cv_folds: usize,
    settings: &TrainSettings,
    rng: &mut StdRng,
    wrap: fn(M) -> TrainedClassifier,
) -> Result<TunedClassifier, TrainingError> {
    check_training(x, y, M::NAME)?;
    let folds = Folds::round_robin(x.nrows(), cv_folds);
    let (params, cv_accuracy) = select_params::<M>(x, y, &folds, settings, rng)?;
    let model = M::fit(x, y, params, settings, rng)?;
    Ok(TunedClassifier {
        classifier: wrap(model),
        hyperparameter: M::hyperparameter(params),
        cv_accuracy,
    })
}

/// A fitted classifier of any family
#[derive(Debug, Clone)]
pub enum TrainedClassifier {
    NaiveBayes(NaiveBayes),
    LinearSvm(LinearSvm),
    Glm(Glm),
    Lda(Lda),
    Perceptron(Perceptron),
}

impl TrainedClassifier {
    pub fn kind(&self) -> ClassifierKind {
        match self {
            TrainedClassifier::NaiveBayes(_) => ClassifierKind::NaiveBayes,
            TrainedClassifier::LinearSvm(_) => ClassifierKind::LinearSvm,
            TrainedClassifier::Glm(_) => ClassifierKind::Glm,
            TrainedClassifier::Lda(_) => ClassifierKind::Lda,
            TrainedClassifier::Perceptron(_) => ClassifierKind::Perceptron,
        }
    }

    fn inputs(&self) -> usize {
        match self {
            TrainedClassifier::NaiveBayes(m) => m.inputs(),
            TrainedClassifier::LinearSvm(m) => m.inputs(),
            TrainedClassifier::Glm(m) => m.inputs(),
            TrainedClassifier::Lda(m) => m.inputs(),
            TrainedClassifier::Perceptron(m) => m.inputs(),
        }
    }

    /// Label every row
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<Label>, TrainingError> {
        if x.ncols() != self.inputs() {
            return Err(TrainingError::DimensionMismatch {
                expected: self.inputs(),
                actual: x.ncols(),
            });
        }
        Ok(match self {
            TrainedClassifier::NaiveBayes(m) => m.predict(x),
            TrainedClassifier::LinearSvm(m) => m.predict(x),
            TrainedClassifier::Glm(m) => m.predict(x),
            TrainedClassifier::Lda(m) => m.predict(x),
            TrainedClassifier::Perceptron(m) => m.predict(x),
        })
    }
}

/// A classifier with the hyperparameter cross-validation chose for it
#[derive(Debug, Clone)]
pub struct TunedClassifier {
    pub classifier: TrainedClassifier,
    pub hyperparameter: Option<f64>,
    /// Mean held-out accuracy of the winning candidate; `None` when the
    /// family has nothing to tune
    pub cv_accuracy: Option<f64>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ndarray::Array2;
    use rand::SeedableRng;

    /// Two blobs split on the sign of the first column
    pub(crate) fn separable(rows: usize) -> (Array2<f64>, Vec<Label>) {
        let mut x = Array2::zeros((rows, 2));
        let mut y = Vec::with_capacity(rows);
        for i in 0..rows {
            let jitter = (i % 7) as f64 * 0.1;
            if i % 2 == 0 {
                x[[i, 0]] = -2.0 - jitter;
                y.push(Label::Pv);
            } else {
                x[[i, 0]] = 2.0 + jitter;
                y.push(Label::NonPv);
            }
            x[[i, 1]] = ((i * 3) % 5) as f64 * 0.2 - 0.4;
        }
        (x, y)
    }

    #[test]
    fn test_all_kinds_in_report_order() {
        let names: Vec<&str> = ClassifierKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names, vec!["NaiveBayes", "SVM", "GLM", "LDA", "Perceptron"]);
    }

    #[test]
    fn test_accuracy() {
        let truth = [Label::Pv, Label::NonPv, Label::Pv, Label::NonPv];
        let predicted = [Label::Pv, Label::Pv, Label::Pv, Label::NonPv];
        assert_eq!(accuracy(&predicted, &truth), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_check_training_rejects_single_class() {
        let x = Array2::zeros((3, 2));
        let y = [Label::Pv; 3];
        assert_eq!(
            check_training(x.view(), &y, "GLM"),
            Err(TrainingError::SingleClass { model: "GLM" })
        );
    }

    #[test]
    fn test_standardizer_centres_and_scales() {
        let x = ndarray::array![[1.0, 5.0], [3.0, 5.0]];
        let z = Standardizer::fit(x.view()).transform(x.view());
        assert_eq!(z, ndarray::array![[-1.0, 0.0], [1.0, 0.0]]);
    }

    #[test]
    fn test_every_kind_trains_on_separable_data() {
        let (x, y) = separable(40);
        for kind in ClassifierKind::ALL {
            let mut rng = StdRng::seed_from_u64(7);
            let tuned = kind
                .train(x.view(), &y, 5, &TrainSettings::default(), &mut rng)
                .unwrap();
            assert_eq!(tuned.classifier.kind(), kind);
            let predicted = tuned.classifier.predict(x.view()).unwrap();
            assert_eq!(predicted.len(), 40);
        }
    }

    #[test]
    fn test_predict_checks_width() {
        let (x, y) = separable(20);
        let mut rng = StdRng::seed_from_u64(1);
        let tuned = ClassifierKind::Lda
            .train(x.view(), &y, 4, &TrainSettings::default(), &mut rng)
            .unwrap();
        let wide = Array2::zeros((2, 3));
        assert!(matches!(
            tuned.classifier.predict(wide.view()),
            Err(TrainingError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }
}
