//! Clients for the services that own the actual recommendation, detection and
//! weather logic. The page host only relays to them.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cropwise_frontend::models::{RecommendationRequest, SelectedImage, WeatherSnapshot};
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{0} service is not configured")]
    NotConfigured(&'static str),

    #[error("{service} service URL is invalid: {detail}")]
    Misconfigured { service: &'static str, detail: String },

    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} answered HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{service} returned an unreadable body: {detail}")]
    Decode { service: &'static str, detail: String },
}

/// Status and JSON body of an upstream answer, relayed to the browser as is.
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

impl IntoResponse for UpstreamReply {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    recommend_url: String,
    detect_url: String,
    weather_url: String,
}

impl UpstreamClient {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout())
            .build()?;
        Ok(Self {
            http,
            recommend_url: config.recommend_url.trim().to_string(),
            detect_url: config.detect_url.trim().to_string(),
            weather_url: config.weather_url.trim().to_string(),
        })
    }

    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<UpstreamReply, UpstreamError> {
        const SERVICE: &str = "recommendation";
        let url = configured(SERVICE, &self.recommend_url)?;
        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                service: SERVICE,
                source,
            })?;
        relay(SERVICE, response).await
    }

    pub async fn detect(&self, image: SelectedImage) -> Result<UpstreamReply, UpstreamError> {
        const SERVICE: &str = "detection";
        let url = configured(SERVICE, &self.detect_url)?;
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.mime_type)
            .map_err(|source| UpstreamError::Transport {
                service: SERVICE,
                source,
            })?;
        let response = self
            .http
            .post(url)
            .multipart(Form::new().part("image", part))
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                service: SERVICE,
                source,
            })?;
        relay(SERVICE, response).await
    }

    pub async fn weather(&self, location: &str) -> Result<WeatherSnapshot, UpstreamError> {
        const SERVICE: &str = "weather";
        let base = configured(SERVICE, &self.weather_url)?;
        let url = reqwest::Url::parse_with_params(base, &[("location", location)]).map_err(
            |err| UpstreamError::Misconfigured {
                service: SERVICE,
                detail: format!("{base:?}: {err}"),
            },
        )?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                service: SERVICE,
                source,
            })?;
        if !response.status().is_success() {
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: response.status().as_u16(),
            });
        }
        response
            .json::<WeatherSnapshot>()
            .await
            .map_err(|err| UpstreamError::Decode {
                service: SERVICE,
                detail: err.to_string(),
            })
    }
}

fn configured<'a>(service: &'static str, url: &'a str) -> Result<&'a str, UpstreamError> {
    if url.is_empty() {
        Err(UpstreamError::NotConfigured(service))
    } else {
        Ok(url)
    }
}

async fn relay(
    service: &'static str,
    response: reqwest::Response,
) -> Result<UpstreamReply, UpstreamError> {
    let status = StatusCode::from_u16(response.status().as_u16())
        .unwrap_or(StatusCode::BAD_GATEWAY);
    let raw = response
        .bytes()
        .await
        .map_err(|source| UpstreamError::Transport { service, source })?;

    let body = match serde_json::from_slice::<Value>(&raw) {
        Ok(body) => body,
        Err(err) if status.is_success() => {
            return Err(UpstreamError::Decode {
                service,
                detail: err.to_string(),
            });
        }
        Err(_) => json!({ "error": String::from_utf8_lossy(&raw).trim().to_string() }),
    };

    if status.is_success() {
        debug!("{service} upstream answered {status}");
    } else {
        warn!("{service} upstream answered {status}");
    }
    Ok(UpstreamReply { status, body })
}
