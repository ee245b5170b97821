use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a whole `process()` call. Per-engine failures never
/// surface here; they are recorded on the candidate instead.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("input does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("unknown engine: {name} (available: {available})")]
    UnknownEngine { name: String, available: String },
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate capability name: {0}")]
    DuplicateName(String),

    #[error("routing table for {kind} references unregistered engine: {name}")]
    UnknownRoute { kind: &'static str, name: String },
}
