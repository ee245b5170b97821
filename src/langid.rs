use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageGuess {
    pub language: String,
    pub probability: f64,
}

/// Ranked language identification, most probable first. May return an empty
/// list; callers treat errors and empty lists the same way.
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, sample: &str) -> Result<Vec<LanguageGuess>>;
}

/// Trigram-based detection via `whatlang`. Deterministic for a given sample.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, sample: &str) -> Result<Vec<LanguageGuess>> {
        let info = whatlang::detect(sample)
            .ok_or_else(|| anyhow!("no recognizable language features in sample"))?;
        Ok(vec![LanguageGuess {
            language: info.lang().code().to_string(),
            probability: info.confidence(),
        }])
    }
}
