//! ONNX model loader

use crate::config::ModelsConfig;
use crate::feature_extractor::{FeatureSchema, FEATURE_COUNT};
use anyhow::{bail, Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Loaded ONNX model with metadata
pub struct LoadedModel {
    /// Model name
    pub name: String,
    /// ONNX Runtime session
    pub session: Session,
    /// Input name for the model
    pub input_name: String,
    /// Output names, in session order
    pub output_names: Vec<String>,
}

/// On-disk locations of the predictor artifacts
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub classifier: PathBuf,
    pub regressor: PathBuf,
    pub schema: PathBuf,
}

impl ArtifactPaths {
    /// Resolve artifact paths from configuration
    pub fn from_config(config: &ModelsConfig) -> Self {
        let dir = Path::new(&config.models_dir);
        Self {
            classifier: dir.join(&config.classifier_file),
            regressor: dir.join(&config.regressor_file),
            schema: dir.join(&config.schema_file),
        }
    }

    /// Predictor artifacts that do not exist on disk
    pub fn missing(&self) -> Vec<&Path> {
        [self.classifier.as_path(), self.regressor.as_path()]
            .into_iter()
            .filter(|p| !p.exists())
            .collect()
    }

    /// Check the schema sidecar, if present, against the mapper's layout.
    ///
    /// A missing sidecar only warns; a mismatching one is fatal.
    pub fn verify_schema(&self) -> Result<()> {
        if !self.schema.exists() {
            warn!(
                path = %self.schema.display(),
                "Feature schema sidecar not found, cannot verify feature order"
            );
            return Ok(());
        }

        let expected = FeatureSchema::load(&self.schema)?;
        FeatureSchema::current()
            .ensure_matches(&expected)
            .with_context(|| {
                format!(
                    "Models in {} were fitted on a different feature layout",
                    self.schema.display()
                )
            })?;

        info!(
            version = expected.version,
            features = expected.features.len(),
            "Feature schema verified"
        );
        Ok(())
    }
}

/// Which of the two predictors an artifact holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelRole {
    Classifier,
    Regressor,
}

impl ModelRole {
    pub fn name(&self) -> &'static str {
        match self {
            ModelRole::Classifier => "classifier",
            ModelRole::Regressor => "regressor",
        }
    }

    /// Artifact path for this role
    pub fn path<'a>(&self, paths: &'a ArtifactPaths) -> &'a Path {
        match self {
            ModelRole::Classifier => &paths.classifier,
            ModelRole::Regressor => &paths.regressor,
        }
    }
}

/// The single feature-matrix input a predictor must expose
fn select_input(role: ModelRole, inputs: &[String]) -> Result<String> {
    match inputs {
        [only] => Ok(only.clone()),
        [] => bail!("{} model declares no inputs", role.name()),
        many => bail!(
            "{} model declares {} inputs ({:?}), expected one [rows, {}] feature input",
            role.name(),
            many.len(),
            many,
            FEATURE_COUNT
        ),
    }
}

/// Opens ONNX sessions for the classifier/regressor artifacts
pub struct ModelLoader {
    /// Intra-op threads per session
    onnx_threads: usize,
}

impl ModelLoader {
    /// Initialize ONNX Runtime once for the process
    pub fn new(onnx_threads: usize) -> Result<Self> {
        ort::init()
            .with_name("business-risk-scoring")
            .commit()
            .context("Failed to initialize ONNX Runtime")?;
        debug!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Open the artifact for `role` and check it takes one feature-matrix input.
    pub fn load(&self, role: ModelRole, paths: &ArtifactPaths) -> Result<LoadedModel> {
        let path = role.path(paths);

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load {} from {}", role.name(), path.display()))?;

        let input_names: Vec<String> = session.inputs.iter().map(|i| i.name.clone()).collect();
        let input_name = select_input(role, &input_names)?;
        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();

        info!(
            model = role.name(),
            path = %path.display(),
            input = %input_name,
            input_type = ?session.inputs[0].input_type,
            expected_features = FEATURE_COUNT,
            outputs = ?output_names,
            "Model loaded"
        );

        Ok(LoadedModel {
            name: role.name().to_string(),
            session,
            input_name,
            output_names,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_extractor::FEATURE_SCHEMA_VERSION;
    use tempfile::tempdir;

    fn models_config(dir: &Path) -> ModelsConfig {
        ModelsConfig {
            models_dir: dir.to_string_lossy().into_owned(),
            ..ModelsConfig::default()
        }
    }

    #[test]
    fn test_missing_artifacts() {
        let dir = tempdir().unwrap();
        let paths = ArtifactPaths::from_config(&models_config(dir.path()));
        assert_eq!(paths.missing().len(), 2);

        std::fs::write(&paths.classifier, b"stub").unwrap();
        assert_eq!(paths.missing(), vec![paths.regressor.as_path()]);
    }

    #[test]
    fn test_role_paths() {
        let paths = ArtifactPaths::from_config(&ModelsConfig::default());
        assert_eq!(
            ModelRole::Classifier.path(&paths),
            Path::new("models/xgboost_classifier.onnx")
        );
        assert_eq!(
            ModelRole::Regressor.path(&paths),
            Path::new("models/xgboost_regressor.onnx")
        );
    }

    #[test]
    fn test_select_input() {
        let single = vec!["float_input".to_string()];
        assert_eq!(select_input(ModelRole::Classifier, &single).unwrap(), "float_input");

        assert!(select_input(ModelRole::Regressor, &[]).is_err());

        let two = vec!["a".to_string(), "b".to_string()];
        let err = select_input(ModelRole::Classifier, &two).unwrap_err();
        assert!(err.to_string().contains("declares 2 inputs"));
    }

    #[test]
    fn test_verify_schema_absent_is_ok() {
        let dir = tempdir().unwrap();
        let paths = ArtifactPaths::from_config(&models_config(dir.path()));
        assert!(paths.verify_schema().is_ok());
    }

    #[test]
    fn test_verify_schema_mismatch_fails() {
        let dir = tempdir().unwrap();
        let paths = ArtifactPaths::from_config(&models_config(dir.path()));

        let mut schema = FeatureSchema::current();
        schema.features.reverse();
        std::fs::write(&paths.schema, serde_json::to_vec(&schema).unwrap()).unwrap();
        assert!(paths.verify_schema().is_err());

        std::fs::write(
            &paths.schema,
            serde_json::to_vec(&FeatureSchema::current()).unwrap(),
        )
        .unwrap();
        assert!(paths.verify_schema().is_ok());
        assert_eq!(
            FeatureSchema::load(&paths.schema).unwrap().version,
            FEATURE_SCHEMA_VERSION
        );
    }
}
