//! Catalog probing, fallback resolution and the periodic probe loop.

use std::sync::Arc;
use std::time::Duration;

use fixflow_core::catalog::{LOCAL_ONLY, NOT_RELEASED, PRIMARY, WITH_FALLBACK};
use fixflow_core::{
    builtin_catalog, spawn_probe_loop, AvailabilityProbe, CatalogError, CredentialProbe,
    FallbackChain, ModelCatalog, ModelKey, ModelProfile,
};
use tokio::sync::watch;

fn no_credentials() -> CredentialProbe {
    CredentialProbe::with_vars(Vec::<(String, String)>::new())
}

#[test]
fn test_credentials_decide_resolution() {
    let catalog = builtin_catalog();

    catalog.refresh(&CredentialProbe::with_vars([("OPENAI_API_KEY", "sk-test")]));
    assert_eq!(
        catalog.resolve(WITH_FALLBACK).unwrap(),
        ModelKey::new("gpt-4o", "openai")
    );

    catalog.refresh(&CredentialProbe::with_vars([("ANTHROPIC_API_KEY", "sk-ant")]));
    assert_eq!(
        catalog.resolve(PRIMARY).unwrap(),
        ModelKey::new("claude-3-5-sonnet", "anthropic")
    );

    catalog.refresh(&no_credentials());
    match catalog.resolve(PRIMARY) {
        Err(CatalogError::ModelUnavailable { tried, .. }) => {
            assert_eq!(tried, vec![ModelKey::new("claude-3-5-sonnet", "anthropic")]);
        }
        other => panic!("expected ModelUnavailable, got {other:?}"),
    }
    assert_eq!(
        catalog.resolve(LOCAL_ONLY).unwrap(),
        ModelKey::new("codellama", "ollama")
    );
}

#[test]
fn test_unreleased_model_is_skipped_even_with_credentials() {
    let mut catalog = ModelCatalog::new();
    catalog
        .add_profile(ModelProfile::new("preview", "openai", false))
        .unwrap();
    catalog
        .add_profile(ModelProfile::new("stable", "openai", true))
        .unwrap();
    catalog
        .add_chain(
            WITH_FALLBACK,
            FallbackChain::of(&[("preview", "openai"), ("stable", "openai")]),
        )
        .unwrap();

    let probe = CredentialProbe::with_vars([("OPENAI_API_KEY", "sk-test")]);
    let outcomes = catalog.refresh(&probe);
    assert_eq!(outcomes[0].1.reason, NOT_RELEASED);
    assert!(outcomes[1].1.available);

    assert_eq!(catalog.resolve(WITH_FALLBACK).unwrap(), ModelKey::new("stable", "openai"));
    let preview = catalog.profile(&ModelKey::new("preview", "openai")).unwrap();
    assert!(!preview.release_available());
}

#[test]
fn test_best_available_prefers_competency() {
    let catalog = builtin_catalog();
    catalog.refresh(&CredentialProbe::with_vars([
        ("OPENAI_API_KEY", "sk-test"),
        ("GROQ_API_KEY", "gsk-test"),
    ]));
    assert_eq!(
        catalog.best_available_for_codes(&["F401", "E501"]),
        Some(ModelKey::new("gpt-4o", "openai"))
    );
    let ranked = catalog.rank_for_codes(&["F401", "E501"]);
    assert_eq!(ranked[0].0, ModelKey::new("claude-3-5-sonnet", "anthropic"));
}

#[tokio::test]
async fn test_probe_loop_refreshes_until_shutdown() {
    let catalog = Arc::new(builtin_catalog());
    let probe: Arc<dyn AvailabilityProbe> = Arc::new(no_credentials());
    let (tx, rx) = watch::channel(false);

    let handle = spawn_probe_loop(
        Arc::clone(&catalog),
        probe,
        Duration::from_millis(20),
        rx,
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    let local = catalog.profile(&ModelKey::new("codellama", "ollama")).unwrap();
    assert!(local.endpoint_available());

    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("probe loop stops on shutdown")
        .unwrap();
}

#[tokio::test]
async fn test_probe_loop_stops_when_sender_dropped() {
    let catalog = Arc::new(builtin_catalog());
    let (tx, rx) = watch::channel(false);
    let handle = spawn_probe_loop(
        catalog,
        Arc::new(no_credentials()),
        Duration::from_secs(3600),
        rx,
    );
    drop(tx);
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("probe loop stops when the sender is gone")
        .unwrap();
}
