use async_trait::async_trait;

use crate::error::WorkflowError;
use crate::models::{SoilSample, SoilType};

/// Source of soil readings that can fill the recommendation form.
#[async_trait(?Send)]
pub trait SoilSensor {
    async fn read(&self) -> Result<SoilSample, WorkflowError>;
}

/// The reading the simulated field sensor reports.
pub fn canned_reading() -> SoilSample {
    SoilSample {
        nitrogen: Some(42),
        phosphorus: Some(35),
        potassium: Some(28),
        ph: Some(6.8),
        temperature: Some(25),
        humidity: Some(65),
        soil_type: SoilType::Loamy.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::canned_reading;
    use crate::ids::crop;

    #[test]
    fn canned_reading_maps_onto_range_fields() {
        let reading = canned_reading();
        let fields = reading.field_values();
        let ids = fields.iter().map(|(id, _)| *id).collect::<Vec<_>>();
        assert_eq!(ids, crop::RANGE_FIELDS);
        assert_eq!(fields[3].1, "6.8");
        assert_eq!(fields[0].1, "42");
    }
}
