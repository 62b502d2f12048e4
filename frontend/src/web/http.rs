use std::rc::Rc;

use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use js_sys::{Array, Uint8Array};
use serde::de::DeserializeOwned;
use web_sys::{Blob, BlobPropertyBag, FormData};

use crate::config::ClientConfig;
use crate::error::WorkflowError;
use crate::models::{
    DiagnosisResult, RecommendationRequest, RecommendationResult, SelectedImage, WeatherSnapshot,
};
use crate::services::{DetectionApi, RecommendationApi, WeatherSource};

/// `fetch`-backed client for the page host's API.
#[derive(Clone)]
pub struct HttpBackend {
    config: Rc<ClientConfig>,
}

impl HttpBackend {
    pub fn new(config: Rc<ClientConfig>) -> Self {
        Self { config }
    }
}

#[async_trait(?Send)]
impl WeatherSource for HttpBackend {
    async fn current(&self, location: &str) -> Result<WeatherSnapshot, WorkflowError> {
        let url = format!(
            "{}?location={}",
            self.config.weather_endpoint,
            String::from(js_sys::encode_uri_component(location))
        );
        let response = Request::get(&url).send().await.map_err(transport)?;
        if !response.ok() {
            return Err(WorkflowError::Transport(format!(
                "weather lookup returned HTTP {}",
                response.status()
            )));
        }
        decode(response).await
    }
}

#[async_trait(?Send)]
impl RecommendationApi for HttpBackend {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResult, WorkflowError> {
        let response = Request::post(&self.config.recommend_endpoint)
            .json(request)
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;
        if !response.ok() {
            log::warn!("recommendation endpoint answered HTTP {}", response.status());
            return Err(WorkflowError::RecommendationFailed);
        }
        decode(response).await
    }
}

#[async_trait(?Send)]
impl DetectionApi for HttpBackend {
    async fn diagnose(&self, image: &SelectedImage) -> Result<DiagnosisResult, WorkflowError> {
        let form = image_form(image).map_err(|err| WorkflowError::Transport(format!("{err:?}")))?;
        let response = Request::post(&self.config.detect_endpoint)
            .body(form)
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;
        if !response.ok() {
            log::warn!("detection endpoint answered HTTP {}", response.status());
            return Err(WorkflowError::DetectionFailed);
        }
        decode(response).await
    }
}

/// Multipart body with the image under the `image` field.
fn image_form(image: &SelectedImage) -> Result<FormData, wasm_bindgen::JsValue> {
    let bytes = Uint8Array::from(image.bytes.as_slice());
    let parts = Array::of1(&bytes);
    let options = BlobPropertyBag::new();
    options.set_type(&image.mime_type);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;

    let form = FormData::new()?;
    form.append_with_blob_and_filename("image", &blob, &image.file_name)?;
    Ok(form)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, WorkflowError> {
    response
        .json::<T>()
        .await
        .map_err(|err| WorkflowError::Decode(err.to_string()))
}

fn transport(err: gloo_net::Error) -> WorkflowError {
    WorkflowError::Transport(err.to_string())
}
