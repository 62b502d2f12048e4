use async_trait::async_trait;
use gloo_timers::future::TimeoutFuture;

use crate::error::WorkflowError;
use crate::models::SoilSample;
use crate::sensor::{SoilSensor, canned_reading};

/// Stand-in for a field sensor: waits, then reports a fixed reading.
pub struct SimulatedSensor {
    delay_ms: u32,
    reading: SoilSample,
}

impl SimulatedSensor {
    pub fn new(delay_ms: u32) -> Self {
        Self {
            delay_ms,
            reading: canned_reading(),
        }
    }
}

#[async_trait(?Send)]
impl SoilSensor for SimulatedSensor {
    async fn read(&self) -> Result<SoilSample, WorkflowError> {
        TimeoutFuture::new(self.delay_ms).await;
        Ok(self.reading.clone())
    }
}
