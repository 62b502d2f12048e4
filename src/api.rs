use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use cropwise_frontend::models::{
    RecommendationRequest, SelectedImage, WeatherSnapshot, is_image_mime,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::marketplace::products_for;
use crate::state::AppState;
use crate::ui::{self, MARKETPLACE_PATH, Page};
use crate::upstream::UpstreamError;

pub fn router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/health", get(health))
        .route("/", get(index_page))
        .route("/crop-recommendation", get(crop_page))
        .route("/disease-detection", get(disease_page))
        .route(MARKETPLACE_PATH, get(marketplace_page))
        .route("/api/recommend-crops", post(recommend_crops))
        .route("/api/detect-disease", post(detect_disease))
        .route("/api/weather", get(weather))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn index_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(ui::render_page(Page::Home, &state.config.frontend_entry))
}

async fn crop_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(ui::render_page(Page::CropRecommendation, &state.config.frontend_entry))
}

async fn disease_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(ui::render_page(Page::DiseaseDetection, &state.config.frontend_entry))
}

#[derive(Debug, Deserialize)]
struct MarketplaceQuery {
    crop: Option<String>,
}

async fn marketplace_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MarketplaceQuery>,
) -> Html<String> {
    let crop = query.crop.as_deref();
    let products = products_for(&state.products, crop);
    Html(ui::render_marketplace_page(&products, crop))
}

async fn recommend_crops(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Response, ApiError> {
    debug!(
        "forwarding recommendation for {:?} ({:?} soil)",
        request.location, request.soil.soil_type
    );
    let reply = state.upstream.recommend(&request).await?;
    Ok(reply.into_response())
}

async fn detect_disease(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(multipart_error)?;
        image = Some(SelectedImage::new(file_name, mime_type, bytes.to_vec()));
        break;
    }

    let image = image.ok_or_else(|| ApiError::bad_request("missing image field"))?;
    if !is_image_mime(&image.mime_type) {
        return Err(ApiError::bad_request(format!(
            "expected an image upload, got {}",
            image.mime_type
        )));
    }

    debug!("forwarding {image:?} for diagnosis");
    let reply = state.upstream.detect(image).await?;
    Ok(reply.into_response())
}

/// Keeps the status axum picked, so an oversized upload stays a 413.
fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::new(err.status(), err.body_text())
}

#[derive(Debug, Deserialize)]
struct WeatherQuery {
    #[serde(default)]
    location: String,
}

async fn weather(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherSnapshot>, ApiError> {
    let location = query.location.trim();
    if location.is_empty() {
        return Err(ApiError::bad_request("location is required"));
    }
    let snapshot = state.upstream.weather(location).await?;
    Ok(Json(snapshot))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    detail: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<UpstreamError> for ApiError {
    fn from(value: UpstreamError) -> Self {
        let status = match &value {
            UpstreamError::NotConfigured(_) | UpstreamError::Misconfigured { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            UpstreamError::Transport { .. }
            | UpstreamError::Status { .. }
            | UpstreamError::Decode { .. } => StatusCode::BAD_GATEWAY,
        };
        warn!("upstream failure: {value}");
        Self::new(status, value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message.clone(),
            detail: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppConfig;
    use crate::marketplace::Product;
    use crate::upstream::UpstreamClient;

    const BOUNDARY: &str = "cropwise-test-boundary";

    fn test_router(configure: impl FnOnce(&mut AppConfig)) -> Router {
        let mut config = AppConfig::default();
        configure(&mut config);
        let upstream = UpstreamClient::new(&config).unwrap();
        let products = vec![
            Product {
                name: "Hybrid Maize Seed".to_string(),
                category: "Seeds".to_string(),
                crops: vec!["Maize".to_string()],
                ..Product::default()
            },
            Product {
                name: "Paddy Sprayer".to_string(),
                category: "Equipment".to_string(),
                crops: vec!["Rice".to_string()],
                ..Product::default()
            },
        ];
        router(Arc::new(AppState {
            config: Arc::new(config),
            upstream,
            products: Arc::new(products),
        }))
    }

    fn upload(field: &str, mime_type: &str, bytes: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"leaf.png\"\r\n\
             Content-Type: {mime_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::post("/api/detect-disease")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = send(app, request).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn upstream_errors_map_to_gateway_statuses() {
        let unconfigured = ApiError::from(UpstreamError::NotConfigured("weather"));
        assert_eq!(unconfigured.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(unconfigured.message, "weather service is not configured");

        let misconfigured = ApiError::from(UpstreamError::Misconfigured {
            service: "weather",
            detail: "relative URL without a base".to_string(),
        });
        assert_eq!(misconfigured.status, StatusCode::SERVICE_UNAVAILABLE);

        let status = ApiError::from(UpstreamError::Status {
            service: "weather",
            status: 404,
        });
        assert_eq!(status.status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send_json(test_router(|_| {}), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn upload_without_image_field_is_rejected() {
        let request = upload("photo", "image/png", b"\x89PNG");
        let (status, body) = send_json(test_router(|_| {}), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error": "missing image field", "detail": "missing image field"})
        );
    }

    #[tokio::test]
    async fn non_image_upload_is_rejected() {
        let request = upload("image", "text/plain", b"hello");
        let (status, body) = send_json(test_router(|_| {}), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "expected an image upload, got text/plain");
    }

    #[tokio::test]
    async fn image_upload_without_detector_is_unavailable() {
        let request = upload("image", "image/png", b"\x89PNG");
        let (status, body) = send_json(test_router(|_| {}), request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "detection service is not configured");
    }

    #[tokio::test]
    async fn upload_over_the_cap_is_too_large() {
        let request = upload("image", "image/png", &vec![0u8; 4096]);
        let app = test_router(|config| config.max_upload_bytes = 1024);
        let (status, _) = send(app, request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn blank_weather_location_is_rejected() {
        let request = Request::get("/api/weather?location=%20%20")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send_json(test_router(|_| {}), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error": "location is required", "detail": "location is required"})
        );
    }

    #[tokio::test]
    async fn recommendation_without_upstream_is_unavailable() {
        let payload = json!({
            "soilNitrogen": 42,
            "soilPhosphorus": null,
            "soilPh": 6.8,
            "soilType": "loamy",
            "location": "Nairobi",
            "weather": {
                "temperature": 24.0,
                "humidity": 60.0,
                "rainfall": 1.5,
                "condition": "Clear"
            }
        });
        let request = Request::post("/api/recommend-crops")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        let (status, body) = send_json(test_router(|_| {}), request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body,
            json!({
                "error": "recommendation service is not configured",
                "detail": "recommendation service is not configured"
            })
        );
    }

    #[tokio::test]
    async fn malformed_weather_url_is_unavailable() {
        let app = test_router(|config| config.weather_url = "not a url".to_string());
        let request = Request::get("/api/weather?location=Nairobi")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send_json(app, request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("weather service URL is invalid")
        );
    }

    #[tokio::test]
    async fn marketplace_filters_by_crop_query() {
        let request = Request::get("/marketplace?crop=rice")
            .body(Body::empty())
            .unwrap();
        let (status, bytes) = send(test_router(|_| {}), request).await;
        let html = String::from_utf8(bytes).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Paddy Sprayer"));
        assert!(!html.contains("Hybrid Maize Seed"));
    }

    #[test]
    fn find_products_targets_the_marketplace_route() {
        let client = cropwise_frontend::config::ClientConfig::default();
        assert_eq!(client.marketplace_page, MARKETPLACE_PATH);
    }
}
