//! Crop recommendation workflow: soil form + weather → recommendation → render.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::WorkflowError;
use crate::models::{RecommendationRequest, RecommendationResult, SoilForm, SoilSample};
use crate::notify::Notifier;
use crate::render::{RenderedRecommendation, render_recommendation};
use crate::sensor::SoilSensor;
use crate::services::{RecommendationApi, WeatherSource};

pub const SENSOR_CONNECTED: &str = "IoT device connected successfully! Soil data has been updated.";

/// The page side of the recommendation workflow.
pub trait RecommendationView {
    fn read_form(&self) -> SoilForm;

    /// Loading indicator shown and submit disabled while `busy`.
    fn set_busy(&self, busy: bool);

    /// Replace the result containers, reveal them and bring them into view.
    fn show_results(&self, rendered: &RenderedRecommendation);

    /// Write a sensor reading into the form inputs and their value displays.
    fn fill_soil(&self, sample: &SoilSample);

    fn set_sensor_connecting(&self, connecting: bool);
}

pub struct RecommendationController {
    view: Rc<dyn RecommendationView>,
    weather: Rc<dyn WeatherSource>,
    api: Rc<dyn RecommendationApi>,
    sensor: Rc<dyn SoilSensor>,
    notifier: Rc<dyn Notifier>,
    in_flight: Cell<bool>,
    sensor_busy: Cell<bool>,
}

impl RecommendationController {
    pub fn new(
        view: Rc<dyn RecommendationView>,
        weather: Rc<dyn WeatherSource>,
        api: Rc<dyn RecommendationApi>,
        sensor: Rc<dyn SoilSensor>,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        Self {
            view,
            weather,
            api,
            sensor,
            notifier,
            in_flight: Cell::new(false),
            sensor_busy: Cell::new(false),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.get()
    }

    /// Handle one form submission. A submission arriving while another is
    /// still pending is dropped.
    pub async fn submit(&self) {
        if self.in_flight.replace(true) {
            log::debug!("recommendation already in flight, ignoring submit");
            return;
        }
        self.view.set_busy(true);

        match self.fetch_recommendation().await {
            Ok(result) => {
                log::info!(
                    "received {} recommended and {} alternative crops",
                    result.recommended_crops.len(),
                    result.alternative_crops.len()
                );
                self.view.show_results(&render_recommendation(&result));
            }
            Err(err) => {
                log::warn!("crop recommendation failed: {err}");
                self.notifier.report(&err);
            }
        }

        self.view.set_busy(false);
        self.in_flight.set(false);
    }

    async fn fetch_recommendation(&self) -> Result<RecommendationResult, WorkflowError> {
        let (soil, location) = self.view.read_form().to_sample();

        let weather = self.weather.current(&location).await.map_err(|err| {
            log::error!("weather lookup for {location:?} failed: {err}");
            WorkflowError::WeatherUnavailable
        })?;

        let request = RecommendationRequest {
            soil,
            location,
            weather,
        };
        self.api.recommend(&request).await
    }

    /// Pull a reading from the soil sensor into the form.
    pub async fn connect_sensor(&self) {
        if self.sensor_busy.replace(true) {
            return;
        }
        self.view.set_sensor_connecting(true);

        match self.sensor.read().await {
            Ok(sample) => {
                self.view.fill_soil(&sample);
                self.notifier.success(SENSOR_CONNECTED);
            }
            Err(err) => {
                log::warn!("soil sensor read failed: {err}");
                self.notifier.report(&WorkflowError::SensorUnavailable);
            }
        }

        self.view.set_sensor_connecting(false);
        self.sensor_busy.set(false);
    }
}
