//! Network collaborators of the two workflows.

use async_trait::async_trait;

use crate::error::WorkflowError;
use crate::models::{
    DiagnosisResult, RecommendationRequest, RecommendationResult, SelectedImage, WeatherSnapshot,
};

/// Weather lookup for a free-text location. Any error means the location
/// could not be resolved.
#[async_trait(?Send)]
pub trait WeatherSource {
    async fn current(&self, location: &str) -> Result<WeatherSnapshot, WorkflowError>;
}

#[async_trait(?Send)]
pub trait RecommendationApi {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResult, WorkflowError>;
}

#[async_trait(?Send)]
pub trait DetectionApi {
    async fn diagnose(&self, image: &SelectedImage) -> Result<DiagnosisResult, WorkflowError>;
}
