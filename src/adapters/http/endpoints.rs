//! Endpoint registry: operation name to request path.

/// Path prefix the service mounts its routers under.
pub const DEFAULT_PREFIX: &str = "/api/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Health,
    Ready,
    Predict,
    Batch,
    ModelInfo,
    ModelMetrics,
    ModelFeatures,
    ModelReload,
    Validate,
    ValidateBatch,
}

/// HTTP method an endpoint is called with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

impl Endpoint {
    pub const ALL: [Endpoint; 10] = [
        Endpoint::Health,
        Endpoint::Ready,
        Endpoint::Predict,
        Endpoint::Batch,
        Endpoint::ModelInfo,
        Endpoint::ModelMetrics,
        Endpoint::ModelFeatures,
        Endpoint::ModelReload,
        Endpoint::Validate,
        Endpoint::ValidateBatch,
    ];

    /// Path relative to the prefix.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::Health => "/health",
            Self::Ready => "/ready",
            Self::Predict => "/predict",
            Self::Batch => "/batch-predict",
            Self::ModelInfo => "/model/info",
            Self::ModelMetrics => "/model/metrics",
            Self::ModelFeatures => "/model/feature-names",
            Self::ModelReload => "/model/reload",
            Self::Validate => "/data/validate",
            Self::ValidateBatch => "/data/validate-batch",
        }
    }

    #[must_use]
    pub fn method(&self) -> Method {
        match self {
            Self::Health
            | Self::Ready
            | Self::ModelInfo
            | Self::ModelMetrics
            | Self::ModelFeatures => Method::Get,
            Self::Predict
            | Self::Batch
            | Self::ModelReload
            | Self::Validate
            | Self::ValidateBatch => Method::Post,
        }
    }
}

/// Resolves endpoints to paths under one prefix, applied uniformly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRegistry {
    prefix: String,
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }
}

impl EndpointRegistry {
    /// Bare paths, no prefix.
    #[must_use]
    pub fn bare() -> Self {
        Self {
            prefix: String::new(),
        }
    }

    /// Normalizes `prefix` to a leading slash and no trailing slash.
    #[must_use]
    pub fn with_prefix(prefix: &str) -> Self {
        let trimmed = prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Self::bare();
        }
        Self {
            prefix: format!("/{trimmed}"),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn path(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.prefix, endpoint.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefix() {
        let registry = EndpointRegistry::default();
        assert_eq!(registry.path(Endpoint::Predict), "/api/v1/predict");
        assert_eq!(
            registry.path(Endpoint::ModelFeatures),
            "/api/v1/model/feature-names"
        );
    }

    #[test]
    fn test_bare_paths() {
        let registry = EndpointRegistry::with_prefix("  ");
        assert_eq!(registry.path(Endpoint::Batch), "/batch-predict");
        assert_eq!(EndpointRegistry::bare(), registry);
    }

    #[test]
    fn test_prefix_normalization() {
        for raw in ["api/v2", "/api/v2/", "api/v2/"] {
            let registry = EndpointRegistry::with_prefix(raw);
            assert_eq!(registry.prefix(), "/api/v2");
            assert_eq!(registry.path(Endpoint::Health), "/api/v2/health");
        }
    }

    #[test]
    fn test_prefix_applied_to_every_endpoint() {
        let registry = EndpointRegistry::default();
        for endpoint in Endpoint::ALL {
            assert!(registry.path(endpoint).starts_with("/api/v1/"));
        }
    }

    #[test]
    fn test_methods() {
        assert_eq!(Endpoint::ModelReload.method(), Method::Post);
        assert_eq!(Endpoint::Ready.method(), Method::Get);
        assert_eq!(Method::Post.to_string(), "POST");
    }
}
