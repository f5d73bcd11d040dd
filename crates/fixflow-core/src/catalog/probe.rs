//! Availability probes.
//!
//! A probe never touches the network. [`CredentialProbe`] treats a provider
//! as reachable when its credential variable is present in an environment
//! snapshot; providers that run locally need no credential.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::ModelProfile;

/// Result of probing one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub available: bool,
    pub reason: String,
}

impl ProbeOutcome {
    pub fn available(reason: impl Into<String>) -> Self {
        Self {
            available: true,
            reason: reason.into(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            available: false,
            reason: reason.into(),
        }
    }
}

/// Reason reported for profiles whose release flag is off.
pub const NOT_RELEASED: &str = "not released";

/// Decides whether a profile's endpoint can currently be reached.
pub trait AvailabilityProbe: Send + Sync {
    /// Reachability evidence for a released profile.
    fn check(&self, profile: &ModelProfile) -> ProbeOutcome;

    /// Full probe: unreleased profiles are never available.
    fn probe(&self, profile: &ModelProfile) -> ProbeOutcome {
        if !profile.release_available() {
            return ProbeOutcome::unavailable(NOT_RELEASED);
        }
        self.check(profile)
    }
}

/// Credential variable a provider needs, or `None` for local providers.
pub fn credential_var(provider: &str) -> Option<String> {
    match provider.to_lowercase().as_str() {
        "ollama" | "lmstudio" | "local" => None,
        "anthropic" => Some("ANTHROPIC_API_KEY".to_string()),
        "openai" => Some("OPENAI_API_KEY".to_string()),
        "groq" => Some("GROQ_API_KEY".to_string()),
        other => Some(format!(
            "{}_API_KEY",
            other.to_uppercase().replace(['-', '.'], "_")
        )),
    }
}

#[derive(Debug, Clone)]
enum EnvSource {
    Process,
    Fixed(HashMap<String, String>),
}

/// Checks provider credentials against the process environment or a fixed map.
#[derive(Debug, Clone)]
pub struct CredentialProbe {
    source: EnvSource,
}

impl CredentialProbe {
    /// Read credentials from the process environment at probe time.
    pub fn from_env() -> Self {
        Self {
            source: EnvSource::Process,
        }
    }

    /// Read credentials from a fixed snapshot.
    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            source: EnvSource::Fixed(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn lookup(&self, var: &str) -> Option<String> {
        match &self.source {
            EnvSource::Process => std::env::var(var).ok(),
            EnvSource::Fixed(vars) => vars.get(var).cloned(),
        }
    }
}

impl Default for CredentialProbe {
    fn default() -> Self {
        Self::from_env()
    }
}

impl AvailabilityProbe for CredentialProbe {
    fn check(&self, profile: &ModelProfile) -> ProbeOutcome {
        let Some(var) = credential_var(profile.provider()) else {
            return ProbeOutcome::available("local provider");
        };
        match self.lookup(&var) {
            Some(value) if !value.trim().is_empty() => {
                ProbeOutcome::available(format!("{var} present"))
            }
            _ => ProbeOutcome::unavailable(format!("missing {var}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreleased_is_never_available() {
        let probe = CredentialProbe::with_vars([("OPENAI_API_KEY", "sk-test")]);
        let profile = ModelProfile::new("gpt-next", "openai", false);
        assert_eq!(probe.probe(&profile), ProbeOutcome::unavailable(NOT_RELEASED));
    }

    #[test]
    fn test_credential_presence_decides() {
        let probe = CredentialProbe::with_vars([("OPENAI_API_KEY", "sk-test"), ("GROQ_API_KEY", "  ")]);
        assert!(probe.probe(&ModelProfile::new("gpt-4o", "openai", true)).available);

        let groq = probe.probe(&ModelProfile::new("llama", "groq", true));
        assert!(!groq.available);
        assert_eq!(groq.reason, "missing GROQ_API_KEY");

        assert!(!probe.probe(&ModelProfile::new("claude", "anthropic", true)).available);
    }

    #[test]
    fn test_local_provider_needs_no_credential() {
        let probe = CredentialProbe::with_vars(Vec::<(String, String)>::new());
        assert!(probe.probe(&ModelProfile::new("codellama", "ollama", true)).available);
    }

    #[test]
    fn test_credential_var_for_unknown_provider() {
        assert_eq!(credential_var("together-ai").as_deref(), Some("TOGETHER_AI_API_KEY"));
        assert_eq!(credential_var("Ollama"), None);
    }
}
