use thiserror::Error;

/// Everything a workflow can fail with. The `Display` text is what the user
/// sees in the error toast.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    #[error("page is missing required element #{0}")]
    MissingElement(&'static str),

    #[error("Please upload an image file.")]
    NotAnImage,

    #[error("Please select an image first.")]
    NoImageSelected,

    #[error(
        "Unable to fetch weather data for your location. \
         Please check your location and try again."
    )]
    WeatherUnavailable,

    #[error("Failed to get crop recommendations. Please try again.")]
    RecommendationFailed,

    #[error("Failed to detect disease. Please try again.")]
    DetectionFailed,

    #[error("Failed to connect to IoT device. Please try again.")]
    SensorUnavailable,

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Decode(String),
}

impl From<serde_json::Error> for WorkflowError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}
