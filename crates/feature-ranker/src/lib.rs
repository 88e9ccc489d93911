//! Feature Significance Ranking
//!
//! Scores each feature column by how well it separates labelled groups,
//! using the Kruskal-Wallis rank-sum test.

mod kruskal;
mod ranking;

pub use kruskal::KruskalWallis;
pub use ranking::{FeatureImportance, FeatureRanker, RankerConfig, SignificanceRanking};

use feature_engine::FeatureError;
use thiserror::Error;

/// Errors during significance ranking
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankError {
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),
    #[error("Got {values} values but {labels} labels")]
    LengthMismatch { values: usize, labels: usize },
    #[error("Feature {feature}: {source}")]
    Feature {
        feature: String,
        #[source]
        source: Box<RankError>,
    },
    #[error(transparent)]
    Table(#[from] FeatureError),
}
