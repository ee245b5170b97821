use crate::{capability::Capability, report::Candidate, score::Scorer};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Attempts every capability exactly once, in order. A failing engine is
/// recorded and never stops the loop.
pub fn run_candidates(
    capabilities: &[&dyn Capability],
    path: &Path,
    scorer: &Scorer,
) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(capabilities.len());

    for cap in capabilities {
        let name = cap.name();
        info!("attempting extraction with [{name}]");
        let started = Instant::now();

        let candidate = match cap.extract(path) {
            Ok(text) => {
                let score = scorer.score(&text);
                info!(
                    "[{name}] score={score:.2} chars={} elapsed_ms={}",
                    text.chars().count(),
                    started.elapsed().as_millis()
                );
                Candidate::extracted(name, text, score)
            }
            Err(err) => {
                warn!("[{name}] failed: {err:#}");
                Candidate::failed(name, format!("{err:#}"))
            }
        };

        candidates.push(candidate.with_elapsed(started.elapsed()));
    }

    candidates
}
