use crate::report::{Candidate, ExtractionResult, NO_WINNER};
use std::time::Duration;

pub const ALL_FAILED: &str = "All extractors failed.";
pub const NOTHING_ROUTED: &str = "No extractors available for this file type.";

/// Picks the highest-scoring successful candidate. Ties go to the earliest
/// candidate in execution order. Every candidate is kept in the result.
pub fn select(candidates: Vec<Candidate>) -> ExtractionResult {
    let mut best: Option<(usize, f64)> = None;
    for (i, c) in candidates.iter().enumerate() {
        if !c.succeeded() {
            continue;
        }
        let score = c.score();
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((i, score));
        }
    }

    match best {
        Some((i, score)) => ExtractionResult {
            source: candidates[i].engine.clone(),
            score,
            text: candidates[i].text().to_string(),
            candidates,
            error: None,
            elapsed: Duration::ZERO,
        },
        None => {
            let error = if candidates.is_empty() {
                NOTHING_ROUTED
            } else {
                ALL_FAILED
            };
            ExtractionResult {
                source: NO_WINNER.to_string(),
                score: 0.0,
                text: String::new(),
                candidates,
                error: Some(error.to_string()),
                elapsed: Duration::ZERO,
            }
        }
    }
}
