//! Synthetic predictions used when model artifacts are missing.
//!
//! Every result is tagged [`PredictionSource::Demo`]; nothing produced here
//! reflects a trained model.

use crate::types::prediction::{PredictionResult, PredictionSource};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Flag threshold applied to demo probabilities
const DEMO_FLAG_THRESHOLD: f64 = 0.5;

/// Seeded generator of clearly-labelled demo predictions
pub struct DemoScorer {
    rng: StdRng,
}

impl DemoScorer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Produce `rows` demo predictions.
    pub fn score(&mut self, rows: usize) -> Vec<PredictionResult> {
        (0..rows)
            .map(|_| {
                let probability = self.rng.gen_range(0.05..0.6);
                let raw_score = probability * 100.0 + self.rng.gen_range(-10.0..10.0);
                PredictionResult::from_raw(
                    probability,
                    probability > DEMO_FLAG_THRESHOLD,
                    raw_score,
                    PredictionSource::Demo,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::prediction::RiskBand;

    #[test]
    fn test_demo_predictions_are_labelled() {
        let mut scorer = DemoScorer::new(42);
        let results = scorer.score(50);

        assert_eq!(results.len(), 50);
        for result in &results {
            assert_eq!(result.source, PredictionSource::Demo);
            assert!((0.05..0.6).contains(&result.default_probability));
            assert_eq!(result.default_flag, result.default_probability > 0.5);
            assert!((0.0..=100.0).contains(&result.risk_score));
            assert!(RiskBand::ALL.contains(&result.risk_band));
        }
    }

    #[test]
    fn test_demo_is_deterministic_per_seed() {
        let a = DemoScorer::new(7).score(5);
        let b = DemoScorer::new(7).score(5);
        assert_eq!(a, b);
    }
}
