pub mod capability;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod execute;
pub mod langid;
pub mod pipeline;
pub mod report;
pub mod router;
pub mod score;
pub mod select;
pub mod util;

pub use capability::{Capability, CapabilityRegistry};
pub use error::{ProcessError, RegistryError};
pub use pipeline::{ExtractionRequest, Pipeline};
pub use report::{Candidate, ExtractionResult, Outcome, Report};
