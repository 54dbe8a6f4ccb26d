//! Prediction result data structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower bound of the risk score range
pub const MIN_RISK_SCORE: f64 = 0.0;
/// Upper bound of the risk score range
pub const MAX_RISK_SCORE: f64 = 100.0;

/// Upper (inclusive) edge of the Low band
pub const LOW_BAND_MAX: f64 = 40.0;
/// Upper (inclusive) edge of the Medium band
pub const MEDIUM_BAND_MAX: f64 = 75.0;

/// Clip a raw regressor output into the risk score range.
///
/// Hard floor and ceiling, not a rescale.
pub fn clip_risk_score(raw: f64) -> f64 {
    raw.clamp(MIN_RISK_SCORE, MAX_RISK_SCORE)
}

/// Risk band derived from a clipped risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// All bands, lowest first
    pub const ALL: [RiskBand; 3] = [RiskBand::Low, RiskBand::Medium, RiskBand::High];

    /// Step function over the clipped score; bins are closed on the upper end.
    pub fn from_score(score: f64) -> Self {
        if score <= LOW_BAND_MAX {
            RiskBand::Low
        } else if score <= MEDIUM_BAND_MAX {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Low => "Low",
            RiskBand::Medium => "Medium",
            RiskBand::High => "High",
        }
    }

    /// Lending recommendation shown to operators
    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskBand::Low => "Eligible for standard lending terms",
            RiskBand::Medium => "Recommend enhanced monitoring or collateral",
            RiskBand::High => "Not recommended for unsecured lending",
        }
    }

    fn status(&self) -> &'static str {
        match self {
            RiskBand::Low => "LOW RISK",
            RiskBand::Medium => "MEDIUM RISK",
            RiskBand::High => "HIGH RISK",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a prediction came from.
///
/// Demo predictions are synthetic and must never be mistaken for model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    /// Produced by the loaded classifier and regressor
    Model,
    /// Produced by the synthetic fallback because artifacts were missing
    Demo,
}

impl PredictionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionSource::Model => "model",
            PredictionSource::Demo => "demo",
        }
    }
}

impl fmt::Display for PredictionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scoring output for one business record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Probability of the positive (default) class, 0.0 - 1.0
    pub default_probability: f64,
    /// Classifier's own discrete decision
    pub default_flag: bool,
    /// Clipped risk score, 0 - 100
    pub risk_score: f64,
    /// Band derived from `risk_score`
    pub risk_band: RiskBand,
    pub source: PredictionSource,
}

impl PredictionResult {
    /// Assemble a result from raw predictor outputs.
    ///
    /// The score is clipped and the band derived here so the two can never
    /// disagree.
    pub fn from_raw(
        default_probability: f64,
        default_flag: bool,
        raw_risk_score: f64,
        source: PredictionSource,
    ) -> Self {
        let risk_score = clip_risk_score(raw_risk_score);
        Self {
            default_probability,
            default_flag,
            risk_score,
            risk_band: RiskBand::from_score(risk_score),
            source,
        }
    }

    /// Flag as written to reports (0/1)
    pub fn default_flag_value(&self) -> u8 {
        u8::from(self.default_flag)
    }

    /// One-line human-readable assessment
    pub fn assessment(&self) -> String {
        format!(
            "{} | Score: {:.1} | Default Prob: {:.1}% | {}",
            self.risk_band.status(),
            self.risk_score,
            self.default_probability * 100.0,
            self.risk_band.recommendation()
        )
    }
}
