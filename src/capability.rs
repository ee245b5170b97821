use crate::error::RegistryError;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// A text extraction engine. Implementations own whatever heavy state they
/// need and must not mutate it per request.
pub trait Capability: Send + Sync {
    fn name(&self) -> &str;
    fn extract(&self, path: &Path) -> Result<String>;
}

/// Name-keyed set of capabilities, built once at startup and shared
/// read-only afterwards.
#[derive(Default)]
pub struct CapabilityRegistry {
    entries: Vec<Box<dyn Capability>>,
    by_name: BTreeMap<String, usize>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, cap: Box<dyn Capability>) -> Result<(), RegistryError> {
        let name = cap.name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        self.by_name.insert(name, self.entries.len());
        self.entries.push(cap);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Capability> {
        self.by_name.get(name).map(|&i| self.entries[i].as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|c| c.name()).collect()
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
