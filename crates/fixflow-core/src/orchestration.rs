//! Fix orchestration: split a file, route its issues to specialists,
//! resolve a backend and run fix attempts through an injected invoker.

use std::sync::Arc;

use async_trait::async_trait;
use fixflow_domain::{Component, ComponentType, DomainError, FixResponse, Issue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn, Instrument};
use uuid::Uuid;

use crate::catalog::{CatalogError, ModelCatalog, ModelKey};
use crate::metrics::METRICS;
use crate::obs;
use crate::settings::FixflowSettings;
use crate::specialist::{SpecialistError, SpecialistRegistry, SpecialistSelector};
use crate::splitter::{
    analyze, ChunkError, ComponentSplitter, SplitError, SplitOutcome, MODULE_PREAMBLE,
};

/// Errors surfaced by planning and execution.
#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    #[error(transparent)]
    Split(#[from] SplitError),

    #[error(transparent)]
    Specialist(#[from] SpecialistError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("invocation failed: {0}")]
    Invocation(String),
}

/// Result type for orchestration.
pub type OrchestrationResult<T> = std::result::Result<T, OrchestrationError>;

/// Everything the invocation collaborator needs for one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixRequest {
    pub id: Uuid,
    pub file_path: String,
    pub component_name: String,
    pub component_type: ComponentType,
    pub start_line: usize,
    pub end_line: usize,
    /// SHA-256 hex of the component content the prompts were built from.
    pub content_digest: String,
    pub specialist: String,
    pub specialization_score: f64,
    pub issues: Vec<Issue>,
    pub system_prompt: String,
    pub user_prompt: String,
    pub target: ModelKey,
}

/// Requests for one file plus whatever could not be placed.
#[derive(Debug, Clone, Default)]
pub struct FixPlan {
    pub requests: Vec<FixRequest>,
    /// Issues whose line falls outside every component.
    pub unassigned: Vec<Issue>,
    /// Windows that contributed nothing to the split.
    pub chunk_errors: Vec<ChunkError>,
}

impl FixPlan {
    pub fn issue_count(&self) -> usize {
        self.requests.iter().map(|r| r.issues.len()).sum::<usize>() + self.unassigned.len()
    }
}

/// Validated reply for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct FixOutcome {
    pub request_id: Uuid,
    pub specialist: String,
    pub target: ModelKey,
    pub response: FixResponse,
}

/// The invocation collaborator: sends a request to its target backend and
/// returns the raw reply text.
#[async_trait]
pub trait FixInvoker: Send + Sync {
    async fn invoke(&self, request: &FixRequest) -> anyhow::Result<String>;
}

/// Ties the splitter, selector and catalog together for one host.
#[derive(Debug)]
pub struct FixOrchestrator {
    settings: FixflowSettings,
    splitter: ComponentSplitter,
    selector: SpecialistSelector,
    catalog: Arc<ModelCatalog>,
}

impl FixOrchestrator {
    pub fn new(
        settings: FixflowSettings,
        registry: Arc<SpecialistRegistry>,
        catalog: Arc<ModelCatalog>,
    ) -> Self {
        let splitter = ComponentSplitter::new(settings.pool_workers);
        Self::with_splitter(settings, splitter, registry, catalog)
    }

    pub fn with_splitter(
        settings: FixflowSettings,
        splitter: ComponentSplitter,
        registry: Arc<SpecialistRegistry>,
        catalog: Arc<ModelCatalog>,
    ) -> Self {
        Self {
            settings,
            splitter,
            selector: SpecialistSelector::new(registry),
            catalog,
        }
    }

    pub fn settings(&self) -> &FixflowSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Arc<SpecialistRegistry> {
        self.selector.registry()
    }

    pub fn catalog(&self) -> &Arc<ModelCatalog> {
        &self.catalog
    }

    /// Build one fix request per component that has issues.
    pub async fn plan(
        &self,
        file_path: &str,
        content: &str,
        issues: &[Issue],
    ) -> OrchestrationResult<FixPlan> {
        self.plan_inner(file_path, content, issues)
            .instrument(obs::file_span(file_path))
            .await
    }

    async fn plan_inner(
        &self,
        file_path: &str,
        content: &str,
        issues: &[Issue],
    ) -> OrchestrationResult<FixPlan> {
        let SplitOutcome {
            mut components,
            errors: chunk_errors,
        } = self.splitter.split(content, &self.settings.split).await?;

        let analysis = analyze(content, &self.settings.split);
        debug!(
            lines = analysis.line_count,
            needs_split = analysis.needs_split,
            components = components.len(),
            "file split"
        );
        if components.is_empty() && analysis.line_count > 0 {
            let mut whole = Component::new(
                MODULE_PREAMBLE,
                ComponentType::Module,
                1,
                analysis.line_count,
                content.trim_end_matches('\n'),
            );
            whole.complexity_score = analysis.complexity;
            components.push(whole);
        }

        let mut plan = self.build_requests(file_path, &components, issues)?;
        plan.chunk_errors = chunk_errors;
        Ok(plan)
    }

    fn build_requests(
        &self,
        file_path: &str,
        components: &[Component],
        issues: &[Issue],
    ) -> OrchestrationResult<FixPlan> {
        let (buckets, unassigned) = associate_issues(components, issues);
        if !unassigned.is_empty() {
            warn!(count = unassigned.len(), "issues outside every component");
        }

        let mut plan = FixPlan {
            unassigned,
            ..FixPlan::default()
        };
        if buckets.iter().all(Vec::is_empty) {
            obs::emit_plan_built(components.len(), 0, plan.unassigned.len());
            return Ok(plan);
        }

        let target = self.catalog.resolve(&self.settings.fallback_strategy)?;

        for (component, bucket) in components.iter().zip(buckets) {
            if bucket.is_empty() {
                continue;
            }
            let selection = self.selector.select_with_score(&bucket);
            let specialist = &selection.specialist;
            debug!(
                component = %component.name,
                specialist = %specialist.name(),
                issues = bucket.len(),
                "component routed"
            );
            plan.requests.push(FixRequest {
                id: Uuid::new_v4(),
                file_path: file_path.to_string(),
                component_name: component.name.clone(),
                component_type: component.component_type,
                start_line: component.start_line,
                end_line: component.end_line,
                content_digest: component.digest(),
                specialist: specialist.name().to_string(),
                specialization_score: selection.score,
                system_prompt: specialist.system_prompt(&bucket),
                user_prompt: specialist.user_prompt(file_path, &component.content, &bucket),
                issues: bucket,
                target: target.clone(),
            });
        }

        obs::emit_plan_built(components.len(), plan.requests.len(), plan.unassigned.len());
        Ok(plan)
    }

    /// Run one request through `invoker`, validate the reply and record the
    /// attempt against the request's specialist.
    ///
    /// A malformed reply counts as a failed attempt with confidence 0.
    /// Transport failures are not recorded.
    pub async fn execute(
        &self,
        request: &FixRequest,
        invoker: &dyn FixInvoker,
    ) -> OrchestrationResult<FixOutcome> {
        let raw = invoker
            .invoke(request)
            .await
            .map_err(|e| OrchestrationError::Invocation(format!("{e:#}")))?;
        METRICS.inc_fix_attempts();

        let registry = self.selector.registry();
        match FixResponse::parse(&raw) {
            Ok(response) => {
                registry.record(&request.specialist, response.success, response.confidence)?;
                Ok(FixOutcome {
                    request_id: request.id,
                    specialist: request.specialist.clone(),
                    target: request.target.clone(),
                    response,
                })
            }
            Err(err) => {
                warn!(
                    request = %request.id,
                    specialist = %request.specialist,
                    error = %err,
                    "discarding malformed fix response"
                );
                registry.record(&request.specialist, false, 0.0)?;
                Err(err.into())
            }
        }
    }

    /// Execute every request concurrently; results keep request order.
    ///
    /// Flushes [`METRICS`] once the batch is done.
    pub async fn execute_all(
        &self,
        requests: &[FixRequest],
        invoker: &dyn FixInvoker,
    ) -> Vec<OrchestrationResult<FixOutcome>> {
        let results =
            futures::future::join_all(requests.iter().map(|r| self.execute(r, invoker))).await;
        METRICS.flush();
        results
    }
}

/// Bucket issues by the first component containing their line.
fn associate_issues(components: &[Component], issues: &[Issue]) -> (Vec<Vec<Issue>>, Vec<Issue>) {
    let mut buckets = vec![Vec::new(); components.len()];
    let mut unassigned = Vec::new();
    for issue in issues {
        match components.iter().position(|c| c.contains_line(issue.line)) {
            Some(idx) => buckets[idx].push(issue.clone()),
            None => unassigned.push(issue.clone()),
        }
    }
    (buckets, unassigned)
}
