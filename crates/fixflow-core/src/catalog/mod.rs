//! Backend model catalog: profiles, availability probing, competency
//! ranking and fallback resolution.
//!
//! The catalog is an explicit value shared by `Arc`. Profile release flags
//! never change after construction; probes write only the endpoint flag.

pub mod error;
pub mod fallback;
pub mod probe;
pub mod profile;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub use error::{CatalogError, CatalogResult};
pub use fallback::{FallbackChain, LOCAL_ONLY, PRIMARY, WITH_FALLBACK};
pub use probe::{credential_var, AvailabilityProbe, CredentialProbe, ProbeOutcome, NOT_RELEASED};
pub use profile::{ModelKey, ModelProfile};

use crate::metrics::METRICS;
use crate::obs;

/// Profiles in catalog order plus named fallback chains.
#[derive(Debug, Default)]
pub struct ModelCatalog {
    profiles: Vec<ModelProfile>,
    chains: BTreeMap<String, FallbackChain>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a profile. Keys are unique.
    pub fn add_profile(&mut self, profile: ModelProfile) -> CatalogResult<()> {
        if self.profiles.iter().any(|p| p.key() == profile.key()) {
            return Err(CatalogError::DuplicateModel(profile.key().clone()));
        }
        self.profiles.push(profile);
        Ok(())
    }

    /// Define (or replace) a named chain. Every entry must be in the catalog.
    pub fn add_chain(&mut self, strategy: &str, chain: FallbackChain) -> CatalogResult<()> {
        if let Some(missing) = chain.entries().iter().find(|k| self.find(k).is_none()) {
            return Err(CatalogError::UnknownModel(missing.clone()));
        }
        self.chains.insert(strategy.to_string(), chain);
        Ok(())
    }

    fn find(&self, key: &ModelKey) -> Option<&ModelProfile> {
        self.profiles.iter().find(|p| p.key() == key)
    }

    pub fn profile(&self, key: &ModelKey) -> CatalogResult<&ModelProfile> {
        self.find(key)
            .ok_or_else(|| CatalogError::UnknownModel(key.clone()))
    }

    pub fn profiles(&self) -> &[ModelProfile] {
        &self.profiles
    }

    pub fn chain(&self, strategy: &str) -> CatalogResult<&FallbackChain> {
        self.chains
            .get(strategy)
            .ok_or_else(|| CatalogError::UnknownStrategy(strategy.to_string()))
    }

    pub fn strategies(&self) -> Vec<&str> {
        self.chains.keys().map(String::as_str).collect()
    }

    /// Probe a profile without recording the result.
    pub fn probe(&self, key: &ModelKey, probe: &dyn AvailabilityProbe) -> CatalogResult<ProbeOutcome> {
        Ok(probe.probe(self.profile(key)?))
    }

    /// Probe a profile and store the outcome in its endpoint flag.
    pub fn update_availability(
        &self,
        key: &ModelKey,
        probe: &dyn AvailabilityProbe,
    ) -> CatalogResult<ProbeOutcome> {
        let profile = self.profile(key)?;
        Ok(Self::apply_probe(profile, probe))
    }

    fn apply_probe(profile: &ModelProfile, probe: &dyn AvailabilityProbe) -> ProbeOutcome {
        let outcome = probe.probe(profile);
        profile.set_endpoint_available(outcome.available);
        METRICS.inc_probes();
        obs::emit_availability_probed(
            profile.name(),
            profile.provider(),
            outcome.available,
            &outcome.reason,
        );
        outcome
    }

    /// Probe every profile in catalog order.
    pub fn refresh(&self, probe: &dyn AvailabilityProbe) -> Vec<(ModelKey, ProbeOutcome)> {
        self.profiles
            .iter()
            .map(|p| (p.key().clone(), Self::apply_probe(p, probe)))
            .collect()
    }

    /// All profiles scored by mean competency over the distinct `codes`,
    /// best first. Ties keep catalog order.
    pub fn rank_for_codes<S: AsRef<str>>(&self, codes: &[S]) -> Vec<(ModelKey, f64)> {
        let distinct: Vec<&str> = codes
            .iter()
            .map(|c| c.as_ref())
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .collect();
        let mut ranked: Vec<(ModelKey, f64)> = self
            .profiles
            .iter()
            .map(|p| (p.key().clone(), p.mean_competency(&distinct)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Highest-ranked profile whose endpoint is currently available.
    pub fn best_available_for_codes<S: AsRef<str>>(&self, codes: &[S]) -> Option<ModelKey> {
        self.rank_for_codes(codes)
            .into_iter()
            .map(|(key, _)| key)
            .find(|key| self.find(key).is_some_and(ModelProfile::endpoint_available))
    }

    /// Walk the named chain and return the first reachable backend.
    pub fn resolve(&self, strategy: &str) -> CatalogResult<ModelKey> {
        let chain = self.chain(strategy)?;
        let mut tried = Vec::with_capacity(chain.len());
        for (position, key) in chain.entries().iter().enumerate() {
            let profile = self.profile(key)?;
            if profile.endpoint_available() {
                obs::emit_backend_resolved(strategy, profile.name(), profile.provider(), position);
                return Ok(key.clone());
            }
            debug!(strategy = %strategy, backend = %key, "backend unreachable, trying next");
            tried.push(key.clone());
        }
        METRICS.inc_fallbacks_exhausted();
        obs::emit_backend_unavailable(strategy, tried.len());
        Err(CatalogError::ModelUnavailable {
            strategy: strategy.to_string(),
            tried,
        })
    }
}

/// The built-in profiles and the `primary`, `with_fallback` and
/// `local_only` chains.
pub fn builtin_catalog() -> ModelCatalog {
    let profiles = vec![
        ModelProfile::new("claude-3-5-sonnet", "anthropic", true)
            .with_competency("E501", 0.9)
            .with_competency("F401", 0.95)
            .with_competency("F841", 0.9)
            .with_competency("F821", 0.85)
            .with_competency("E711", 0.95)
            .with_competency("W291", 0.95)
            .with_use_case("complex refactors")
            .with_use_case("multi-issue batches"),
        ModelProfile::new("gpt-4o", "openai", true)
            .with_competency("E501", 0.85)
            .with_competency("F401", 0.9)
            .with_competency("F841", 0.85)
            .with_competency("F821", 0.8)
            .with_competency("E711", 0.9)
            .with_competency("W291", 0.95)
            .with_use_case("general fixes"),
        ModelProfile::new("gpt-4o-mini", "openai", true)
            .with_competency("E501", 0.7)
            .with_competency("F401", 0.8)
            .with_competency("W291", 0.9)
            .with_use_case("cheap formatting fixes"),
        ModelProfile::new("llama-3.1-70b", "groq", true)
            .with_competency("E501", 0.7)
            .with_competency("F401", 0.75)
            .with_competency("W291", 0.85)
            .with_use_case("low-latency fixes"),
        ModelProfile::new("codellama", "ollama", true)
            .with_competency("E501", 0.6)
            .with_competency("F401", 0.65)
            .with_competency("W291", 0.8)
            .with_use_case("offline fixes"),
    ];

    let mut catalog = ModelCatalog::new();
    for profile in profiles {
        if let Err(err) = catalog.add_profile(profile) {
            warn!(error = %err, "skipping built-in model profile");
        }
    }
    let chains = [
        (PRIMARY, FallbackChain::of(&[("claude-3-5-sonnet", "anthropic")])),
        (
            WITH_FALLBACK,
            FallbackChain::of(&[
                ("claude-3-5-sonnet", "anthropic"),
                ("gpt-4o", "openai"),
                ("gpt-4o-mini", "openai"),
                ("llama-3.1-70b", "groq"),
                ("codellama", "ollama"),
            ]),
        ),
        (LOCAL_ONLY, FallbackChain::of(&[("codellama", "ollama")])),
    ];
    for (strategy, chain) in chains {
        if let Err(err) = catalog.add_chain(strategy, chain) {
            warn!(strategy, error = %err, "skipping built-in fallback chain");
        }
    }
    catalog
}

/// Run [`ModelCatalog::refresh`] every `interval` until `shutdown` flips to
/// `true` or its sender is dropped. The first refresh runs immediately.
pub fn spawn_probe_loop(
    catalog: Arc<ModelCatalog>,
    probe: Arc<dyn AvailabilityProbe>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let outcomes = catalog.refresh(probe.as_ref());
                    let available = outcomes.iter().filter(|(_, o)| o.available).count();
                    debug!(profiles = outcomes.len(), available, "probe loop refreshed catalog");
                    METRICS.flush();
                }
            }
        }
        debug!("probe loop stopped");
    })
}
