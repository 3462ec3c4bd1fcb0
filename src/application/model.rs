//! Model metadata: info, metrics and feature descriptors, plus reload.
//!
//! Each fetcher has its own lifecycle so one failure does not hide the
//! other panels.

use crate::domain::{FeatureCatalog, ModelInfo, ModelMetrics, ReloadStatus};
use crate::ports::{ApiError, PredictionApi};

use super::fallback;
use super::lifecycle::{Lifecycle, Ticket};

/// One of the three metadata panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    Info,
    Metrics,
    Features,
}

impl MetadataKind {
    pub const ALL: [MetadataKind; 3] = [Self::Info, Self::Metrics, Self::Features];
}

/// Lifecycles for the model screen's panels and the reload action.
#[derive(Debug, Clone, Default)]
pub struct ModelOrchestrator {
    info: Lifecycle<ModelInfo>,
    metrics: Lifecycle<ModelMetrics>,
    features: Lifecycle<FeatureCatalog>,
    reload: Lifecycle<ReloadStatus>,
}

fn message(err: &ApiError, fallback: &str) -> String {
    tracing::warn!("{}: {}", fallback, err);
    err.user_message(fallback)
}

impl ModelOrchestrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter `Loading` for one metadata panel.
    pub fn begin_fetch(&mut self, kind: MetadataKind) -> Ticket {
        match kind {
            MetadataKind::Info => self.info.begin(),
            MetadataKind::Metrics => self.metrics.begin(),
            MetadataKind::Features => self.features.begin(),
        }
    }

    /// Apply a `/model/info` outcome; stale tickets are ignored.
    pub fn resolve_info(&mut self, ticket: Ticket, outcome: Result<ModelInfo, ApiError>) -> bool {
        let outcome = outcome.map_err(|e| message(&e, fallback::MODEL_INFO));
        self.info.resolve(ticket, outcome)
    }

    /// Apply a `/model/metrics` outcome.
    pub fn resolve_metrics(
        &mut self,
        ticket: Ticket,
        outcome: Result<ModelMetrics, ApiError>,
    ) -> bool {
        let outcome = outcome.map_err(|e| message(&e, fallback::METRICS));
        self.metrics.resolve(ticket, outcome)
    }

    /// Apply a `/model/features` outcome.
    pub fn resolve_features(
        &mut self,
        ticket: Ticket,
        outcome: Result<FeatureCatalog, ApiError>,
    ) -> bool {
        let outcome = outcome.map_err(|e| message(&e, fallback::FEATURES));
        self.features.resolve(ticket, outcome)
    }

    /// Fetch model info on this thread.
    pub fn fetch_model_info_with<A: PredictionApi + ?Sized>(&mut self, api: &A) {
        let ticket = self.begin_fetch(MetadataKind::Info);
        let outcome = api.model_info();
        self.resolve_info(ticket, outcome);
    }

    /// Fetch evaluation metrics on this thread.
    pub fn fetch_metrics_with<A: PredictionApi + ?Sized>(&mut self, api: &A) {
        let ticket = self.begin_fetch(MetadataKind::Metrics);
        let outcome = api.model_metrics();
        self.resolve_metrics(ticket, outcome);
    }

    /// Fetch the feature catalog on this thread.
    pub fn fetch_features_with<A: PredictionApi + ?Sized>(&mut self, api: &A) {
        let ticket = self.begin_fetch(MetadataKind::Features);
        let outcome = api.model_features();
        self.resolve_features(ticket, outcome);
    }

    /// Fetch info, metrics and features in sequence.
    pub fn fetch_all_with<A: PredictionApi + ?Sized>(&mut self, api: &A) {
        self.fetch_model_info_with(api);
        self.fetch_metrics_with(api);
        self.fetch_features_with(api);
    }

    /// Enter `Loading` for a model reload. Panels keep their current data.
    pub fn begin_reload(&mut self) -> Ticket {
        self.reload.begin()
    }

    /// Apply a reload outcome. Returns `true` when the reload succeeded and
    /// all metadata must now be refetched.
    pub fn resolve_reload(&mut self, ticket: Ticket, outcome: Result<ReloadStatus, ApiError>) -> bool {
        let outcome = outcome.map_err(|e| message(&e, fallback::RELOAD));
        let succeeded = outcome.is_ok();
        let applied = self.reload.resolve(ticket, outcome);
        if applied && succeeded {
            tracing::info!("Model reloaded, refreshing metadata");
        }
        applied && succeeded
    }

    /// Reload the model and, on success, refresh all metadata.
    pub fn reload_with<A: PredictionApi + ?Sized>(&mut self, api: &A) {
        let ticket = self.begin_reload();
        let outcome = api.reload_model();
        if self.resolve_reload(ticket, outcome) {
            self.fetch_all_with(api);
        }
    }

    /// Info panel state.
    #[must_use]
    pub fn info(&self) -> &Lifecycle<ModelInfo> {
        &self.info
    }

    /// Metrics panel state.
    #[must_use]
    pub fn metrics(&self) -> &Lifecycle<ModelMetrics> {
        &self.metrics
    }

    /// Feature table state.
    #[must_use]
    pub fn features(&self) -> &Lifecycle<FeatureCatalog> {
        &self.features
    }

    /// State of the last reload, shown in the footer.
    #[must_use]
    pub fn reload(&self) -> &Lifecycle<ReloadStatus> {
        &self.reload
    }

    /// Whether any panel or the reload is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.info.is_loading()
            || self.metrics.is_loading()
            || self.features.is_loading()
            || self.reload.is_loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fake::{detail_error, ScriptedApi};
    use crate::domain::{FeatureDescriptor, FeatureKind};

    fn info(version: &str) -> ModelInfo {
        ModelInfo {
            algorithm: Some("XGBoost".to_string()),
            version: Some(version.to_string()),
            ..Default::default()
        }
    }

    fn catalog() -> FeatureCatalog {
        FeatureCatalog {
            features: vec![FeatureDescriptor {
                name: "age".to_string(),
                kind: FeatureKind::Numeric,
                required: Some(true),
                min_value: Some(1.0),
                max_value: Some(120.0),
                allowed_values: None,
            }],
        }
    }

    #[test]
    fn test_failing_fetch_does_not_block_others() {
        let api = ScriptedApi {
            info: Some(Ok(info("1.0.0"))),
            metrics: Some(Err(detail_error(500, "Metrics unavailable"))),
            features: Some(Ok(catalog())),
            ..Default::default()
        };
        let mut orchestrator = ModelOrchestrator::new();
        orchestrator.fetch_all_with(&api);

        assert!(orchestrator.info().value().is_some());
        assert_eq!(orchestrator.metrics().error(), Some("Metrics unavailable"));
        assert_eq!(orchestrator.features().value().map(|c| c.features.len()), Some(1));
        assert!(!orchestrator.is_loading());
    }

    #[test]
    fn test_fallback_messages() {
        let api = ScriptedApi::default();
        let mut orchestrator = ModelOrchestrator::new();
        orchestrator.fetch_all_with(&api);
        assert_eq!(orchestrator.info().error(), Some("Failed to fetch model info"));
        assert_eq!(orchestrator.metrics().error(), Some("Failed to fetch metrics"));
        assert_eq!(orchestrator.features().error(), Some("Failed to fetch features"));
    }

    #[test]
    fn test_reload_refreshes_all_metadata() {
        let api = ScriptedApi {
            reload: Some(Ok(ReloadStatus::default())),
            info: Some(Ok(info("2.0.0"))),
            metrics: Some(Ok(ModelMetrics::default())),
            features: Some(Ok(catalog())),
            ..Default::default()
        };
        let mut orchestrator = ModelOrchestrator::new();
        orchestrator.reload_with(&api);

        assert_eq!(
            api.calls(),
            vec!["reload_model", "model_info", "model_metrics", "model_features"]
        );
        assert_eq!(
            orchestrator.info().value().and_then(|i| i.version.as_deref()),
            Some("2.0.0")
        );
    }

    #[test]
    fn test_failed_reload_skips_refresh() {
        let api = ScriptedApi::default();
        let mut orchestrator = ModelOrchestrator::new();
        orchestrator.reload_with(&api);
        assert_eq!(api.calls(), vec!["reload_model"]);
        assert_eq!(orchestrator.reload().error(), Some("Failed to reload model"));
    }

    #[test]
    fn test_stale_panel_fetch_ignored() {
        let mut orchestrator = ModelOrchestrator::new();
        let old = orchestrator.begin_fetch(MetadataKind::Info);
        let new = orchestrator.begin_fetch(MetadataKind::Info);
        assert!(orchestrator.resolve_info(new, Ok(info("new"))));
        assert!(!orchestrator.resolve_info(old, Ok(info("old"))));
        assert_eq!(
            orchestrator.info().value().and_then(|i| i.version.as_deref()),
            Some("new")
        );
    }
}
