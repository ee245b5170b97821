//! Ground-truth-free quality score for extracted text.
//!
//! The score is a sum of five independent signals computed on the trimmed
//! text: a logarithmic length term, a symbol-noise penalty, a word-density
//! term, a language-confidence term and a structural-noise penalty. The sum is
//! floored at zero. Given the same text and the same detector behavior the
//! result is always identical.

use crate::langid::LanguageDetector;
use anyhow::Result;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

pub const LANGUAGE_SAMPLE_CHARS: usize = 5000;

const LENGTH_CAP: f64 = 100.0;
const GARBAGE_WEIGHT: f64 = 150.0;
const HEALTHY_DENSITY_BONUS: f64 = 25.0;
const BAD_DENSITY_PENALTY: f64 = -40.0;
const LANGUAGE_WEIGHT: f64 = 40.0;
const WHITESPACE_RUN_PENALTY: f64 = 15.0;
const SPACED_CHARS_PENALTY: f64 = 20.0;

/// Per-term view of a score. `garbage` and `word_density` carry their sign;
/// `noise_penalty` is subtracted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub length: f64,
    pub garbage: f64,
    pub word_density: f64,
    pub language: f64,
    pub noise_penalty: f64,
    pub total: f64,
}

pub struct Scorer {
    detector: Arc<dyn LanguageDetector>,
    garbage: Regex,
    word: Regex,
    newline_run: Regex,
    space_run: Regex,
    spaced_chars: Regex,
}

impl Scorer {
    pub fn new(detector: Arc<dyn LanguageDetector>) -> Result<Self> {
        Ok(Self {
            detector,
            garbage: Regex::new(r#"[^\w\s.,!?;:'"()\[\]{}\-]"#)?,
            word: Regex::new(r"\w+")?,
            newline_run: Regex::new(r"\n{5,}")?,
            space_run: Regex::new(r" {6,}")?,
            spaced_chars: Regex::new(r"\b(?:\w ){4,}\w\b")?,
        })
    }

    pub fn score(&self, text: &str) -> f64 {
        self.breakdown(text).total
    }

    pub fn breakdown(&self, text: &str) -> ScoreBreakdown {
        let text = text.trim();
        if text.is_empty() {
            return ScoreBreakdown::default();
        }

        let len = text.chars().count();
        let len_f = len as f64;

        let length = (len_f.ln_1p() * 10.0).min(LENGTH_CAP);

        let garbage_count = self.garbage.find_iter(text).count();
        let garbage = -(garbage_count as f64 / len_f) * GARBAGE_WEIGHT;

        let word_count = self.word.find_iter(text).count();
        let avg_word_len = if word_count > 0 {
            len_f / word_count as f64
        } else {
            0.0
        };
        let word_density = density_term(avg_word_len);

        let language = self.language_term(text);

        let mut noise_penalty = 0.0;
        if self.newline_run.is_match(text) || self.space_run.is_match(text) {
            noise_penalty += WHITESPACE_RUN_PENALTY;
        }
        if self.spaced_chars.is_match(text) {
            noise_penalty += SPACED_CHARS_PENALTY;
        }

        let raw = length + garbage + word_density + language - noise_penalty;
        let total = raw.max(0.0);

        debug!(
            "score breakdown length={:.1} garbage={:.1} density={:.1} lang={:.1} noise=-{:.1} total={:.1}",
            length, garbage, word_density, language, noise_penalty, total
        );

        ScoreBreakdown {
            length,
            garbage,
            word_density,
            language,
            noise_penalty,
            total,
        }
    }

    fn language_term(&self, text: &str) -> f64 {
        let sample = leading_chars(text, LANGUAGE_SAMPLE_CHARS);
        match self.detector.detect(sample) {
            Ok(guesses) => guesses
                .first()
                .map(|g| g.probability)
                .filter(|p| p.is_finite())
                .map_or(0.0, |p| p * LANGUAGE_WEIGHT),
            Err(err) => {
                debug!("language detection failed, contributing 0: {err:#}");
                0.0
            }
        }
    }
}

fn density_term(avg_word_len: f64) -> f64 {
    if (3.0..=12.0).contains(&avg_word_len) {
        HEALTHY_DENSITY_BONUS
    } else if avg_word_len > 25.0 || avg_word_len < 2.0 {
        BAD_DENSITY_PENALTY
    } else {
        0.0
    }
}

fn leading_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
