use crate::{
    capability::{Capability, CapabilityRegistry},
    error::{ProcessError, RegistryError},
    execute::run_candidates,
    report::ExtractionResult,
    router::{DocumentKind, Router},
    score::Scorer,
    select::select,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub path: PathBuf,
    pub explicit_engine: Option<String>,
}

impl ExtractionRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            explicit_engine: None,
        }
    }

    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.explicit_engine = Some(engine.into());
        self
    }
}

pub struct Pipeline {
    registry: Arc<CapabilityRegistry>,
    router: Router,
    scorer: Scorer,
}

impl Pipeline {
    /// Fails if the routing table names an engine the registry lacks.
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        router: Router,
        scorer: Scorer,
    ) -> Result<Self, RegistryError> {
        for kind in [
            DocumentKind::Pdf,
            DocumentKind::Image,
            DocumentKind::WordDocument,
            DocumentKind::Html,
        ] {
            let missing = router
                .engines_for(kind)
                .iter()
                .find(|n| !registry.contains(n));
            if let Some(name) = missing {
                return Err(RegistryError::UnknownRoute {
                    kind: kind.as_str(),
                    name: name.clone(),
                });
            }
        }
        Ok(Self {
            registry,
            router,
            scorer,
        })
    }

    pub fn process(
        &self,
        path: &Path,
        explicit_engine: Option<&str>,
    ) -> Result<ExtractionResult, ProcessError> {
        if !path.exists() {
            return Err(ProcessError::InputNotFound(path.to_path_buf()));
        }

        let capabilities = match explicit_engine {
            Some(name) => vec![self.lookup(name)?],
            None => self
                .router
                .route(path)
                .iter()
                .filter_map(|name| self.registry.get(name))
                .collect(),
        };

        info!(
            "processing {} with {} engine(s)",
            path.display(),
            capabilities.len()
        );

        let started = Instant::now();
        let candidates = run_candidates(&capabilities, path, &self.scorer);
        let mut result = select(candidates);
        result.elapsed = started.elapsed();

        debug!(
            "winner={} score={:.2} elapsed_ms={}",
            result.source,
            result.score,
            result.elapsed.as_millis()
        );
        Ok(result)
    }

    pub fn run(&self, req: &ExtractionRequest) -> Result<ExtractionResult, ProcessError> {
        self.process(&req.path, req.explicit_engine.as_deref())
    }

    fn lookup(&self, name: &str) -> Result<&dyn Capability, ProcessError> {
        self.registry.get(name).ok_or_else(|| ProcessError::UnknownEngine {
            name: name.to_string(),
            available: self.registry.names().join(", "),
        })
    }
}
