//! Service health and readiness.

use crate::domain::ServiceStatus;
use crate::ports::{ApiError, PredictionApi};

use super::fallback;
use super::lifecycle::{Lifecycle, Ticket};

/// Which status endpoint a check targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Health,
    Ready,
}

/// Health and readiness checks, each with its own lifecycle.
#[derive(Debug, Clone, Default)]
pub struct StatusOrchestrator {
    health: Lifecycle<ServiceStatus>,
    ready: Lifecycle<ServiceStatus>,
}

impl StatusOrchestrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter `Loading` for one check; an older pending check is superseded.
    pub fn begin(&mut self, probe: Probe) -> Ticket {
        self.slot(probe).begin()
    }

    /// Apply a check outcome. Failures fall back to a per-endpoint message
    /// when the server gave no detail.
    pub fn resolve(
        &mut self,
        probe: Probe,
        ticket: Ticket,
        outcome: Result<ServiceStatus, ApiError>,
    ) -> bool {
        let fallback = match probe {
            Probe::Health => fallback::HEALTH,
            Probe::Ready => fallback::READY,
        };
        let outcome = outcome.map_err(|e| {
            tracing::warn!("{}: {}", fallback, e);
            e.user_message(fallback)
        });
        self.slot(probe).resolve(ticket, outcome)
    }

    fn slot(&mut self, probe: Probe) -> &mut Lifecycle<ServiceStatus> {
        match probe {
            Probe::Health => &mut self.health,
            Probe::Ready => &mut self.ready,
        }
    }

    /// Call `/health` on this thread.
    pub fn check_health_with<A: PredictionApi + ?Sized>(&mut self, api: &A) {
        let ticket = self.begin(Probe::Health);
        let outcome = api.health();
        self.resolve(Probe::Health, ticket, outcome);
    }

    /// Call `/ready` on this thread.
    pub fn check_ready_with<A: PredictionApi + ?Sized>(&mut self, api: &A) {
        let ticket = self.begin(Probe::Ready);
        let outcome = api.ready();
        self.resolve(Probe::Ready, ticket, outcome);
    }

    /// Last health check.
    #[must_use]
    pub fn health(&self) -> &Lifecycle<ServiceStatus> {
        &self.health
    }

    /// Last readiness check.
    #[must_use]
    pub fn ready(&self) -> &Lifecycle<ServiceStatus> {
        &self.ready
    }

    /// Whether the service reported itself ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.value().is_some_and(|s| {
            s.ready.unwrap_or_else(|| s.status.as_deref() == Some("ready"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fake::{detail_error, ScriptedApi};

    #[test]
    fn test_health_and_ready() {
        let api = ScriptedApi {
            health: Some(Ok(ServiceStatus {
                status: Some("healthy".to_string()),
                ..Default::default()
            })),
            ready: Some(Ok(ServiceStatus {
                ready: Some(true),
                model_loaded: Some(true),
                scaler_loaded: Some(true),
                ..Default::default()
            })),
            ..Default::default()
        };
        let mut status = StatusOrchestrator::new();
        status.check_health_with(&api);
        status.check_ready_with(&api);

        assert_eq!(status.health().value().map(ServiceStatus::summary).as_deref(), Some("healthy"));
        assert!(status.is_ready());
    }

    #[test]
    fn test_not_ready_detail() {
        let api = ScriptedApi {
            ready: Some(Err(detail_error(503, "Model or scaler not loaded - service not ready"))),
            ..Default::default()
        };
        let mut status = StatusOrchestrator::new();
        status.check_health_with(&api);
        status.check_ready_with(&api);

        assert_eq!(status.health().error(), Some("Health check failed"));
        assert_eq!(
            status.ready().error(),
            Some("Model or scaler not loaded - service not ready")
        );
        assert!(!status.is_ready());
    }

    #[test]
    fn test_status_word_counts_as_ready() {
        let mut status = StatusOrchestrator::new();
        let ticket = status.begin(Probe::Ready);
        status.resolve(
            Probe::Ready,
            ticket,
            Ok(ServiceStatus {
                status: Some("ready".to_string()),
                ..Default::default()
            }),
        );
        assert!(status.is_ready());
    }
}
