//! Classifier/regressor inference and scoring

use crate::feature_extractor::FeatureMatrix;
use crate::models::loader::LoadedModel;
use crate::types::prediction::{PredictionResult, PredictionSource};
use anyhow::{anyhow, bail, Context, Result};
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, Tensor};
use tracing::{debug, warn};

/// Per-row classifier output
#[derive(Debug, Clone, PartialEq)]
pub struct ClassOutput {
    /// Discrete class predicted by the classifier
    pub label: i64,
    /// Probability of the positive (default) class
    pub positive_probability: f64,
}

/// A fitted binary classifier.
pub trait Classifier {
    /// Predict label and positive-class probability for every row.
    fn classify(&mut self, features: &FeatureMatrix) -> Result<Vec<ClassOutput>>;
}

/// A fitted regressor producing one raw value per row.
pub trait Regressor {
    fn regress(&mut self, features: &FeatureMatrix) -> Result<Vec<f64>>;
}

/// Scores feature batches with a classifier/regressor pair
pub struct Scorer {
    classifier: Box<dyn Classifier>,
    regressor: Box<dyn Regressor>,
}

impl Scorer {
    pub fn new(classifier: Box<dyn Classifier>, regressor: Box<dyn Regressor>) -> Self {
        Self {
            classifier,
            regressor,
        }
    }

    /// Produce one prediction per input row.
    ///
    /// The flag is the classifier's own label, never re-derived from the
    /// probability.
    pub fn score(&mut self, features: &FeatureMatrix) -> Result<Vec<PredictionResult>> {
        if features.is_empty() {
            return Ok(Vec::new());
        }

        let classes = self
            .classifier
            .classify(features)
            .context("Classifier inference failed")?;
        let raw_scores = self
            .regressor
            .regress(features)
            .context("Regressor inference failed")?;

        if classes.len() != features.rows() {
            bail!(
                "Classifier returned {} rows for {} inputs",
                classes.len(),
                features.rows()
            );
        }
        if raw_scores.len() != features.rows() {
            bail!(
                "Regressor returned {} rows for {} inputs",
                raw_scores.len(),
                features.rows()
            );
        }

        classes
            .into_iter()
            .zip(raw_scores)
            .enumerate()
            .map(|(row, (class, raw))| {
                if !raw.is_finite() {
                    bail!("Regressor produced non-finite score {} for row {}", raw, row);
                }
                Ok(PredictionResult::from_raw(
                    class.positive_probability,
                    class.label != 0,
                    raw,
                    PredictionSource::Model,
                ))
            })
            .collect()
    }
}

/// Build the `[rows, cols]` input tensor for a feature batch
fn input_tensor(features: &FeatureMatrix) -> Result<Tensor<f32>> {
    let shape = vec![features.rows() as i64, features.cols() as i64];
    Tensor::from_array((shape, features.as_slice().to_vec()))
        .context("Failed to create input tensor")
}

/// Binary classifier backed by an ONNX session
pub struct OnnxClassifier {
    model: LoadedModel,
    /// Output holding the discrete class, if the export has one
    label_output: Option<String>,
    /// Output holding class probabilities
    probability_output: String,
}

impl OnnxClassifier {
    /// Wrap a loaded model, resolving its label and probability outputs.
    pub fn new(model: LoadedModel) -> Result<Self> {
        let (label_output, probability_output) = resolve_outputs(&model.output_names)
            .with_context(|| format!("Model {} is not a usable classifier", model.name))?;
        if label_output.is_none() {
            warn!(
                model = %model.name,
                "Classifier has no label output, flags will use argmax of probabilities"
            );
        }
        Ok(Self {
            model,
            label_output,
            probability_output,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&mut self, features: &FeatureMatrix) -> Result<Vec<ClassOutput>> {
        let rows = features.rows();
        let tensor = input_tensor(features)?;
        let model_name = self.model.name.clone();

        let outputs = self
            .model
            .session
            .run(ort::inputs![&self.model.input_name => tensor])?;

        let output = outputs
            .get(self.probability_output.as_str())
            .ok_or_else(|| {
                anyhow!("Output {} missing from {}", self.probability_output, model_name)
            })?;
        let probabilities = extract_class_probabilities(output, rows)?;

        let labels: Vec<i64> = match self.label_output.as_deref().and_then(|n| outputs.get(n)) {
            Some(label_output) => {
                let (_, data) = label_output.try_extract_tensor::<i64>()?;
                data.to_vec()
            }
            None => probabilities.iter().map(|p| argmax(p)).collect(),
        };

        if labels.len() != rows || probabilities.len() != rows {
            bail!(
                "Model {} returned {} labels and {} probability rows for {} inputs",
                model_name,
                labels.len(),
                probabilities.len(),
                rows
            );
        }

        let results: Vec<ClassOutput> = labels
            .into_iter()
            .zip(probabilities)
            .map(|(label, probs)| ClassOutput {
                label,
                positive_probability: positive_class(&probs),
            })
            .collect();

        debug!(model = %model_name, rows = rows, "Classifier inference complete");
        Ok(results)
    }
}

/// Regressor backed by an ONNX session
pub struct OnnxRegressor {
    model: LoadedModel,
    output_name: String,
}

impl OnnxRegressor {
    pub fn new(model: LoadedModel) -> Result<Self> {
        let output_name = model
            .output_names
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("Model {} has no outputs", model.name))?;
        Ok(Self { model, output_name })
    }
}

impl Regressor for OnnxRegressor {
    fn regress(&mut self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        let rows = features.rows();
        let tensor = input_tensor(features)?;

        let outputs = self
            .model
            .session
            .run(ort::inputs![&self.model.input_name => tensor])?;

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            anyhow!("Output {} missing from {}", self.output_name, self.model.name)
        })?;
        let (_, data) = output.try_extract_tensor::<f32>()?;

        // Shape is [rows] or [rows, 1]; both flatten to one value per row.
        if data.len() != rows {
            bail!(
                "Model {} returned {} values for {} inputs",
                self.model.name,
                data.len(),
                rows
            );
        }

        debug!(model = %self.model.name, rows = rows, "Regressor inference complete");
        Ok(data.iter().map(|&v| v as f64).collect())
    }
}

/// Pick the label output (optional) and the probability output by name.
///
/// The probability output is the one named like "prob", otherwise the first
/// output that is not the label.
pub(crate) fn resolve_outputs(names: &[String]) -> Result<(Option<String>, String)> {
    let label = names.iter().find(|n| n.contains("label")).cloned();
    let probability = names
        .iter()
        .find(|n| n.contains("prob"))
        .or_else(|| names.iter().find(|n| !n.contains("label")))
        .cloned()
        .ok_or_else(|| anyhow!("No probability output among {:?}", names))?;
    Ok((label, probability))
}

/// Per-row class probabilities from either a `[rows, classes]` tensor or a
/// `seq(map(int64, float))` output.
fn extract_class_probabilities(
    output: &ort::value::DynValue,
    rows: usize,
) -> Result<Vec<Vec<f64>>> {
    if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
        return split_probability_rows(data, rows);
    }

    if DynSequenceValueType::can_downcast(&output.dtype()) {
        return extract_from_sequence_map(output);
    }

    Err(anyhow!("Unsupported probability output type"))
}

/// Split a flat row-major `[rows, classes]` tensor into per-row vectors.
pub(crate) fn split_probability_rows(data: &[f32], rows: usize) -> Result<Vec<Vec<f64>>> {
    if rows == 0 || data.is_empty() || data.len() % rows != 0 {
        bail!(
            "Probability tensor of {} values does not split into {} rows",
            data.len(),
            rows
        );
    }
    let classes = data.len() / rows;
    Ok(data
        .chunks(classes)
        .map(|row| row.iter().map(|&p| p as f64).collect())
        .collect())
}

/// Extract probabilities from seq(map(int64, float)), as emitted by
/// ZipMap-style classifier exports.
fn extract_from_sequence_map(output: &ort::value::DynValue) -> Result<Vec<Vec<f64>>> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow!("Failed to downcast to sequence: {}", e))?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

    maps.iter()
        .map(|map_value| -> Result<Vec<f64>> {
            let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;
            Ok(class_map_probabilities(kv_pairs))
        })
        .collect()
}

/// Dense probabilities indexed by class id. Binary maps always yield at
/// least two entries; classes absent from the map read as 0.
pub(crate) fn class_map_probabilities(kv_pairs: Vec<(i64, f32)>) -> Vec<f64> {
    let classes = kv_pairs
        .iter()
        .filter(|(class_id, _)| *class_id >= 0)
        .map(|(class_id, _)| *class_id as usize + 1)
        .max()
        .unwrap_or(0)
        .max(2);
    let mut probs = vec![0.0; classes];
    for (class_id, prob) in kv_pairs {
        if class_id >= 0 {
            probs[class_id as usize] = prob as f64;
        }
    }
    probs
}

/// Probability of class 1; single-column outputs already are that probability.
fn positive_class(probs: &[f64]) -> f64 {
    match probs.len() {
        0 => 0.0,
        1 => probs[0],
        _ => probs[1],
    }
}

/// Class decision for exports without a label output.
///
/// A single-column output carries only the positive-class probability and
/// no decision rule, so it is cut at 0.5, the default binary objective's
/// threshold.
fn argmax(probs: &[f64]) -> i64 {
    if probs.len() == 1 {
        return i64::from(probs[0] > 0.5);
    }
    probs
        .iter()
        .enumerate()
        .fold((0usize, f64::NEG_INFINITY), |best, (idx, &p)| {
            if p > best.1 {
                (idx, p)
            } else {
                best
            }
        })
        .0 as i64
}
