//! Model loading and inference components

pub mod fallback;
pub mod inference;
pub mod loader;

pub use fallback::DemoScorer;
pub use inference::{ClassOutput, Classifier, OnnxClassifier, OnnxRegressor, Regressor, Scorer};
pub use loader::{ArtifactPaths, ModelLoader, ModelRole};

use crate::config::AppConfig;
use crate::feature_extractor::FeatureMatrix;
use crate::types::prediction::{PredictionResult, PredictionSource};
use anyhow::Result;
use tracing::{info, warn};

/// Either the trained predictor pair or the demo fallback
pub enum ScoringEngine {
    Trained(Scorer),
    Demo(DemoScorer),
}

impl ScoringEngine {
    /// Load both predictors, or fall back to demo output if either is missing.
    ///
    /// An artifact that exists but fails to load is an error, not a fallback.
    pub fn load(config: &AppConfig) -> Result<Self> {
        let paths = ArtifactPaths::from_config(&config.models);

        let missing = paths.missing();
        if !missing.is_empty() {
            for path in &missing {
                warn!(path = %path.display(), "Model artifact not found");
            }
            warn!("Falling back to DEMO predictions; output will be marked prediction_source=demo");
            return Ok(Self::demo(config.synthetic.seed));
        }

        paths.verify_schema()?;

        let loader = ModelLoader::new(config.models.onnx_threads)?;
        let classifier = loader.load(ModelRole::Classifier, &paths)?;
        let regressor = loader.load(ModelRole::Regressor, &paths)?;

        info!(
            classifier = %paths.classifier.display(),
            regressor = %paths.regressor.display(),
            "Scoring engine initialized with trained models"
        );

        Ok(Self::Trained(Scorer::new(
            Box::new(OnnxClassifier::new(classifier)?),
            Box::new(OnnxRegressor::new(regressor)?),
        )))
    }

    /// Demo engine with a fixed seed
    pub fn demo(seed: u64) -> Self {
        Self::Demo(DemoScorer::new(seed))
    }

    /// Whether this engine emits model or demo predictions
    pub fn source(&self) -> PredictionSource {
        match self {
            Self::Trained(_) => PredictionSource::Model,
            Self::Demo(_) => PredictionSource::Demo,
        }
    }

    /// Score a feature batch, one result per row
    pub fn score(&mut self, features: &FeatureMatrix) -> Result<Vec<PredictionResult>> {
        match self {
            Self::Trained(scorer) => scorer.score(features),
            Self::Demo(demo) => Ok(demo.score(features.rows())),
        }
    }
}
