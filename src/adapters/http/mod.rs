//! HTTP adapter: implementation of [`PredictionApi`] over `reqwest`.
//!
//! Every request carries a JSON content type and the configured timeout.
//! Failures are normalized into [`ApiError`]:
//! - non-2xx: status code plus the body's `detail`, when present
//! - no response (timeout, refused, DNS): `status_code == None`

pub mod endpoints;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::ClientConfig;
use crate::domain::{
    FeatureCatalog, ModelInfo, ModelMetrics, PatientFeatures, PatientRecord, PredictionResult,
    ReloadStatus, ServiceStatus, ValidationReport,
};
use crate::ports::{ApiError, PredictionApi};
use crate::GlucotrackError;

use endpoints::{Endpoint, EndpointRegistry, Method};

/// Blocking HTTP client for the prediction service.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpPredictionApi {
    client: Client,
    base_url: String,
    endpoints: EndpointRegistry,
}

impl HttpPredictionApi {
    /// Build a client from configuration.
    ///
    /// # Errors
    /// Returns error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, GlucotrackError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| GlucotrackError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            endpoints: config.endpoints.clone(),
        })
    }

    /// Absolute URL of an endpoint.
    #[must_use]
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, self.endpoints.path(endpoint))
    }

    fn request(&self, endpoint: Endpoint) -> RequestBuilder {
        let url = self.url(endpoint);
        match endpoint.method() {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        }
    }

    fn send(&self, endpoint: Endpoint, request: RequestBuilder) -> Result<(u16, Value), ApiError> {
        tracing::debug!(
            "Making {} request to: {}",
            endpoint.method(),
            self.url(endpoint)
        );

        let response = request.send().map_err(|e| {
            if e.is_timeout() {
                tracing::error!("Request to {:?} timed out", endpoint);
            } else {
                tracing::error!("No response received from server: {}", e);
            }
            ApiError::network()
        })?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            ApiError::network()
        })?;

        if !(200..300).contains(&status) {
            let err = ApiError::from_response(status, &body);
            tracing::error!("API error {} on {:?}: {}", status, endpoint, err.message);
            return Err(err);
        }

        if body.trim().is_empty() {
            return Ok((status, Value::Null));
        }

        let value = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("Undecodable response from {:?}: {}", endpoint, e);
            ApiError::decode(status, e)
        })?;
        Ok((status, value))
    }

    fn call(&self, endpoint: Endpoint) -> Result<(u16, Value), ApiError> {
        self.send(endpoint, self.request(endpoint))
    }

    fn call_with<B>(&self, endpoint: Endpoint, body: &B) -> Result<(u16, Value), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.send(endpoint, self.request(endpoint).json(body))
    }
}

fn typed<T: DeserializeOwned>((status, value): (u16, Value)) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::decode(status, e))
}

impl PredictionApi for HttpPredictionApi {
    fn health(&self) -> Result<ServiceStatus, ApiError> {
        typed(self.call(Endpoint::Health)?)
    }

    fn ready(&self) -> Result<ServiceStatus, ApiError> {
        typed(self.call(Endpoint::Ready)?)
    }

    fn predict(&self, features: &PatientFeatures) -> Result<PredictionResult, ApiError> {
        typed(self.call_with(Endpoint::Predict, features)?)
    }

    fn batch_predict(&self, records: &[PatientRecord]) -> Result<Value, ApiError> {
        let (_, value) = self.call_with(Endpoint::Batch, &json!({ "data": records }))?;
        Ok(value)
    }

    fn model_info(&self) -> Result<ModelInfo, ApiError> {
        typed(self.call(Endpoint::ModelInfo)?)
    }

    fn model_metrics(&self) -> Result<ModelMetrics, ApiError> {
        typed(self.call(Endpoint::ModelMetrics)?)
    }

    fn model_features(&self) -> Result<FeatureCatalog, ApiError> {
        typed(self.call(Endpoint::ModelFeatures)?)
    }

    fn reload_model(&self) -> Result<ReloadStatus, ApiError> {
        let (status, value) = self.call(Endpoint::ModelReload)?;
        if value.is_null() {
            return Ok(ReloadStatus::default());
        }
        typed((status, value))
    }

    fn validate(&self, features: &PatientFeatures) -> Result<ValidationReport, ApiError> {
        typed(self.call_with(Endpoint::Validate, features)?)
    }

    fn validate_batch(
        &self,
        records: &[PatientRecord],
    ) -> Result<Vec<ValidationReport>, ApiError> {
        typed(self.call_with(Endpoint::ValidateBatch, records)?)
    }
}
