//! Classifier Benchmark
//!
//! Projects labelled feature tables onto their first two principal
//! components and compares five linear classifiers, each tuned by k-fold
//! cross-validation, on held-out accuracy.

mod benchmark;
pub mod models;
mod pca;
mod validation;

pub use benchmark::{
    BenchmarkConfig, BenchmarkReport, ClassificationBenchmark, ClassifierScore, Score,
};
pub use models::{ClassifierKind, Model, TrainSettings, TrainedClassifier, TunedClassifier};
pub use pca::Pca;
pub use validation::Folds;

use serde::Serialize;
use thiserror::Error;

/// Errors that fail a whole benchmark run
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BenchmarkError {
    #[error("Projection failed: {0}")]
    Projection(String),
    #[error("Cross-validation needs between 2 and {rows} folds, got {folds}")]
    InvalidFolds { folds: usize, rows: usize },
    #[error("Test table has {actual} features, training table has {expected}")]
    ColumnMismatch { expected: usize, actual: usize },
    #[error("Test table is empty")]
    EmptyTestSet,
}

/// Errors while fitting or applying a single classifier
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum TrainingError {
    #[error("Training set is empty")]
    EmptyTrainingSet,
    #[error("{model} needs both classes in its training set")]
    SingleClass { model: &'static str },
    #[error("{model} did not converge after {iterations} iterations")]
    NotConverged { model: &'static str, iterations: usize },
    #[error("Singular covariance in {model}")]
    Singular { model: &'static str },
    #[error("{model} produced non-finite parameters")]
    NonFinite { model: &'static str },
    #[error("Expected {expected} inputs, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
