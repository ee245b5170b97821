use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// `source` of a result with no successful candidate.
pub const NO_WINNER: &str = "None";

/// Wire value of `score` for a failed attempt.
pub const FAILED_SCORE: f64 = -1.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Extracted { text: String, score: f64 },
    Failed { error: String },
}

/// One engine's attempt against one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub engine: String,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

impl Candidate {
    pub fn extracted(engine: impl Into<String>, text: impl Into<String>, score: f64) -> Self {
        Self {
            engine: engine.into(),
            outcome: Outcome::Extracted {
                text: text.into(),
                score,
            },
            elapsed: Duration::ZERO,
        }
    }

    pub fn failed(engine: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            outcome: Outcome::Failed {
                error: error.into(),
            },
            elapsed: Duration::ZERO,
        }
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, Outcome::Extracted { .. })
    }

    /// The computed score, or [`FAILED_SCORE`] for a failed attempt.
    pub fn score(&self) -> f64 {
        match &self.outcome {
            Outcome::Extracted { score, .. } => *score,
            Outcome::Failed { .. } => FAILED_SCORE,
        }
    }

    pub fn text(&self) -> &str {
        match &self.outcome {
            Outcome::Extracted { text, .. } => text,
            Outcome::Failed { .. } => "",
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Extracted { .. } => None,
            Outcome::Failed { error } => Some(error),
        }
    }
}

#[derive(Serialize)]
struct DebugEntry<'a> {
    source: &'a str,
    score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl Serialize for Candidate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DebugEntry {
            source: &self.engine,
            score: self.score(),
            error: self.error(),
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub source: String,
    pub score: f64,
    pub text: String,
    #[serde(rename = "debug")]
    pub candidates: Vec<Candidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl ExtractionResult {
    pub fn has_winner(&self) -> bool {
        self.source != NO_WINNER
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    /// Human-readable report: winner banner, text, then every attempt.
    pub fn render(&self, show_debug: bool) -> Report<'_> {
        Report {
            result: self,
            show_debug,
        }
    }
}

/// Display adapter returned by [`ExtractionResult::render`].
pub struct Report<'a> {
    result: &'a ExtractionResult,
    show_debug: bool,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.result;
        let rule = "=".repeat(50);
        writeln!(f, "\n{rule}")?;
        writeln!(f, "BEST EXTRACTOR: {}", r.source)?;
        writeln!(f, "CONFIDENCE SCORE: {:.2}", r.score)?;
        writeln!(f, "PROCESSING TIME: {:.2}s", r.elapsed.as_secs_f64())?;
        if let Some(err) = &r.error {
            writeln!(f, "ERROR: {err}")?;
        }
        writeln!(f, "{rule}\n")?;
        writeln!(f, "{}", r.text)?;

        if !self.show_debug {
            return Ok(());
        }
        writeln!(f, "\n{rule}")?;
        writeln!(f, "DEBUG REPORT (All Extractor Scores):")?;
        for c in &r.candidates {
            match c.error() {
                Some(err) => writeln!(f, " - {}: failed (Error: {err})", c.engine)?,
                None => writeln!(
                    f,
                    " - {}: {:.2} ({} ms)",
                    c.engine,
                    c.score(),
                    c.elapsed.as_millis()
                )?,
            }
        }
        writeln!(f, "{rule}")
    }
}
