//! Ports layer: trait definitions for external operations.
//!
//! Following Hexagonal Architecture, the remote prediction service is reached
//! only through [`PredictionApi`]; orchestrators never see HTTP.

mod prediction_api;

pub use prediction_api::{ApiError, PredictionApi, NO_RESPONSE};
