//! Background request worker.
//!
//! Each request runs on its own short-lived thread so the UI loop never
//! blocks on the network. Completions come back tagged with the ticket that
//! was issued for them; the UI loop hands them to the owning orchestrator,
//! which drops any that were superseded.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use serde_json::Value;

use crate::application::{Probe, Ticket};
use crate::domain::{
    FeatureCatalog, ModelInfo, ModelMetrics, PredictionResult, ReloadStatus, ServiceStatus,
    ValidationReport,
};
use crate::ports::{ApiError, PredictionApi};

/// A finished request.
#[derive(Debug)]
pub enum Completion {
    Status(Probe, Ticket, Result<ServiceStatus, ApiError>),
    Prediction(Ticket, Result<PredictionResult, ApiError>),
    Batch(Ticket, Result<Value, ApiError>),
    ModelInfo(Ticket, Result<ModelInfo, ApiError>),
    Metrics(Ticket, Result<ModelMetrics, ApiError>),
    Features(Ticket, Result<FeatureCatalog, ApiError>),
    Reload(Ticket, Result<ReloadStatus, ApiError>),
    Validation(Ticket, Result<ValidationReport, ApiError>),
    BatchValidation(Ticket, Result<Vec<ValidationReport>, ApiError>),
}

/// Runs API calls off the UI thread.
pub struct RequestWorker {
    api: Arc<dyn PredictionApi>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl RequestWorker {
    #[must_use]
    pub fn new(api: Arc<dyn PredictionApi>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { api, tx, rx }
    }

    /// Run `job` against the API on a background thread.
    pub fn spawn<F>(&self, job: F)
    where
        F: FnOnce(&dyn PredictionApi) -> Completion + Send + 'static,
    {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let completion = job(api.as_ref());
            // The receiver only goes away when the app is shutting down.
            let _ = tx.send(completion);
        });
    }

    /// Next finished request, if any (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<Completion> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fake::ScriptedApi;
    use crate::application::StatusOrchestrator;
    use std::time::{Duration, Instant};

    fn wait(worker: &RequestWorker) -> Completion {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(done) = worker.try_recv() {
                return done;
            }
            assert!(Instant::now() < deadline, "worker did not complete");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_completion_carries_ticket() {
        let api = ScriptedApi {
            health: Some(Ok(ServiceStatus {
                status: Some("healthy".to_string()),
                ..Default::default()
            })),
            ..Default::default()
        };
        let worker = RequestWorker::new(Arc::new(api));
        let mut status = StatusOrchestrator::new();

        let ticket = status.begin(Probe::Health);
        worker.spawn(move |api| Completion::Status(Probe::Health, ticket, api.health()));

        let Completion::Status(probe, done, outcome) = wait(&worker) else {
            panic!("unexpected completion");
        };
        assert_eq!(done, ticket);
        assert!(status.resolve(probe, done, outcome));
        assert!(status.health().value().is_some());
    }

    #[test]
    fn test_nothing_pending() {
        let worker = RequestWorker::new(Arc::new(ScriptedApi::default()));
        assert!(worker.try_recv().is_none());
    }
}
