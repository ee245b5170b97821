pub mod python;
pub mod types;

pub use python::{PythonCapability, PythonRunner, ENGINE_NAMES};
pub use types::{ExtractIn, ExtractOut};

use crate::{capability::CapabilityRegistry, config::Config};
use anyhow::Result;
use std::sync::Arc;

/// Registers every runner-backed engine. Called once at startup.
pub fn default_registry(cfg: &Config) -> Result<CapabilityRegistry> {
    let runner = Arc::new(PythonRunner::new(cfg)?);
    let mut registry = CapabilityRegistry::new();
    for name in ENGINE_NAMES {
        let timeout = cfg.engines.timeout_for(name);
        registry.register(Box::new(PythonCapability::new(name, runner.clone(), timeout)))?;
    }
    Ok(registry)
}
