//! fixflow Core Library
//!
//! The fix orchestration core of an automated remediation pipeline:
//! component splitting, specialist routing and backend fallback selection.

pub mod catalog;
pub mod metrics;
pub mod obs;
pub mod orchestration;
pub mod settings;
pub mod specialist;
pub mod splitter;
pub mod telemetry;

pub use fixflow_domain::{
    content_digest, Component, ComponentType, DomainError, FixResponse, Issue,
};

pub use catalog::{
    builtin_catalog, spawn_probe_loop, AvailabilityProbe, CatalogError, CatalogResult,
    CredentialProbe, FallbackChain, ModelCatalog, ModelKey, ModelProfile, ProbeOutcome,
};

pub use orchestration::{
    FixInvoker, FixOrchestrator, FixOutcome, FixPlan, FixRequest, OrchestrationError,
    OrchestrationResult,
};

pub use settings::{FixflowSettings, SettingsError, SettingsResult};

pub use specialist::{
    builtin_registry, Capability, ExpertiseLevel, Specialist, SpecialistError, SpecialistRegistry,
    SpecialistResult, SpecialistSelector, SpecialistStats,
};

pub use splitter::{
    ChunkError, ChunkErrorKind, ComponentSplitter, SplitConfig, SplitError, SplitOutcome,
    SplitResult,
};

/// Version of the fixflow-core library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
