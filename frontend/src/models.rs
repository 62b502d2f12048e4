use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilType {
    Clay,
    Sandy,
    Loamy,
    Silty,
    Peaty,
    Chalky,
}

impl SoilType {
    pub const ALL: [SoilType; 6] = [
        SoilType::Clay,
        SoilType::Sandy,
        SoilType::Loamy,
        SoilType::Silty,
        SoilType::Peaty,
        SoilType::Chalky,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clay => "clay",
            Self::Sandy => "sandy",
            Self::Loamy => "loamy",
            Self::Silty => "silty",
            Self::Peaty => "peaty",
            Self::Chalky => "chalky",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Clay => "Clay",
            Self::Sandy => "Sandy",
            Self::Loamy => "Loamy",
            Self::Silty => "Silty",
            Self::Peaty => "Peaty",
            Self::Chalky => "Chalky",
        }
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Soil readings as posted to the recommendation service. Numeric fields
/// the form could not read are sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilSample {
    #[serde(rename = "soilNitrogen")]
    pub nitrogen: Option<i64>,
    #[serde(rename = "soilPhosphorus")]
    pub phosphorus: Option<i64>,
    #[serde(rename = "soilPotassium")]
    pub potassium: Option<i64>,
    #[serde(rename = "soilPh")]
    pub ph: Option<f64>,
    #[serde(rename = "soilTemperature")]
    pub temperature: Option<i64>,
    #[serde(rename = "soilHumidity")]
    pub humidity: Option<i64>,
    #[serde(rename = "soilType")]
    pub soil_type: String,
}

impl SoilSample {
    /// Field values in page order, paired with the input they belong to.
    /// Unread fields come back empty.
    pub fn field_values(&self) -> [(&'static str, String); 6] {
        use crate::ids::crop;

        fn show<T: ToString>(value: Option<T>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }

        [
            (crop::NITROGEN, show(self.nitrogen)),
            (crop::PHOSPHORUS, show(self.phosphorus)),
            (crop::POTASSIUM, show(self.potassium)),
            (crop::PH, show(self.ph)),
            (crop::TEMPERATURE, show(self.temperature)),
            (crop::HUMIDITY, show(self.humidity)),
        ]
    }
}

/// Raw form values as read from the page, before any parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoilForm {
    pub nitrogen: String,
    pub phosphorus: String,
    pub potassium: String,
    pub ph: String,
    pub temperature: String,
    pub humidity: String,
    pub soil_type: String,
    pub location: String,
}

impl SoilForm {
    /// Lower the raw values into a sample and the location. Nothing is
    /// rejected here: the page's input constraints are the only validation,
    /// and the soil type and location pass through as typed.
    pub fn to_sample(&self) -> (SoilSample, String) {
        let sample = SoilSample {
            nitrogen: leading_int(&self.nitrogen),
            phosphorus: leading_int(&self.phosphorus),
            potassium: leading_int(&self.potassium),
            ph: leading_float(&self.ph),
            temperature: leading_int(&self.temperature),
            humidity: leading_int(&self.humidity),
            soil_type: self.soil_type.clone(),
        };
        (sample, self.location.clone())
    }
}

/// Integer prefix of `raw` after leading whitespace: `"22.9"` is 22,
/// `"12kg"` is 12, and `"lots"` has none.
fn leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['+', '-']));
    let digits = trimmed[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    trimmed[..sign_len + digits].parse().ok()
}

/// Longest finite decimal prefix of `raw` after leading whitespace.
fn leading_float(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    (1..=trimmed.len())
        .rev()
        .filter(|&end| trimmed.is_char_boundary(end))
        .find_map(|end| {
            trimmed[..end]
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
        })
}

/// Decode an explicit `null` as the type's default, the same as a missing key.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
    pub condition: String,
}

/// Body of `POST /api/recommend-crops`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    #[serde(flatten)]
    pub soil: SoilSample,
    pub location: String,
    pub weather: WeatherSnapshot,
}

// Upstream services send `null` as freely as they omit keys; both decode to
// empty values so the renderers fall back to their placeholder text.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CropSummary {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub water_requirement: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sunlight_requirement: String,
    #[serde(deserialize_with = "null_as_default")]
    pub growing_season: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationResult {
    #[serde(deserialize_with = "null_as_default")]
    pub recommended_crops: Vec<CropSummary>,
    #[serde(deserialize_with = "null_as_default")]
    pub reasons: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub alternative_crops: Vec<CropSummary>,
    pub weather: Option<WeatherSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosisResult {
    #[serde(deserialize_with = "null_as_default")]
    pub disease_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub treatments: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub prevention_tips: Vec<String>,
}

/// The one image the detection page is working with.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedImage {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        is_image_mime(&self.mime_type)
    }

    pub fn preview_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

impl fmt::Debug for SelectedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedImage")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type
        .trim()
        .to_ascii_lowercase()
        .starts_with("image/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form() -> SoilForm {
        SoilForm {
            nitrogen: "40".to_string(),
            phosphorus: "30".to_string(),
            potassium: "20".to_string(),
            ph: "6.5".to_string(),
            temperature: "22".to_string(),
            humidity: "60".to_string(),
            soil_type: "loamy".to_string(),
            location: "Springfield".to_string(),
        }
    }

    #[test]
    fn lowers_form_fields_by_kind() {
        let (sample, location) = form().to_sample();
        assert_eq!(location, "Springfield");
        assert_eq!(sample.nitrogen, Some(40));
        assert_eq!(sample.ph, Some(6.5));
        assert_eq!(sample.soil_type, "loamy");
    }

    #[test]
    fn integer_fields_keep_the_leading_integer() {
        let mut raw = form();
        raw.temperature = "22.9".to_string();
        raw.humidity = " 61 ".to_string();
        raw.nitrogen = "12kg".to_string();
        raw.phosphorus = "-3".to_string();
        let (sample, _) = raw.to_sample();
        assert_eq!(sample.temperature, Some(22));
        assert_eq!(sample.humidity, Some(61));
        assert_eq!(sample.nitrogen, Some(12));
        assert_eq!(sample.phosphorus, Some(-3));
    }

    #[test]
    fn unreadable_values_are_sent_as_null() {
        let mut raw = form();
        raw.potassium = "lots".to_string();
        raw.ph = "acidic".to_string();
        raw.soil_type = "black".to_string();
        raw.location = " Springfield ".to_string();
        let (sample, location) = raw.to_sample();

        assert_eq!(sample.potassium, None);
        assert_eq!(sample.ph, None);
        assert_eq!(sample.soil_type, "black");
        assert_eq!(location, " Springfield ");

        let body = serde_json::to_value(&sample).unwrap();
        assert!(body["soilPotassium"].is_null());
        assert!(body["soilPh"].is_null());
        assert_eq!(body["soilType"], "black");
    }

    #[test]
    fn ph_keeps_its_decimal_prefix() {
        assert_eq!(leading_float("6.8"), Some(6.8));
        assert_eq!(leading_float(" 7.25abc"), Some(7.25));
        assert_eq!(leading_float(""), None);
        assert_eq!(leading_float("inf"), None);
    }

    #[test]
    fn request_body_merges_soil_and_weather() {
        let (soil, location) = form().to_sample();
        let request = RecommendationRequest {
            soil,
            location,
            weather: WeatherSnapshot {
                temperature: 24.0,
                humidity: 55.0,
                rainfall: 10.0,
                condition: "Sunny".to_string(),
            },
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "soilNitrogen": 40,
                "soilPhosphorus": 30,
                "soilPotassium": 20,
                "soilPh": 6.5,
                "soilTemperature": 22,
                "soilHumidity": 60,
                "soilType": "loamy",
                "location": "Springfield",
                "weather": {
                    "temperature": 24.0,
                    "humidity": 55.0,
                    "rainfall": 10.0,
                    "condition": "Sunny"
                }
            })
        );
        assert!(body["soilNitrogen"].is_i64());
        assert!(body["soilPh"].is_f64());
    }

    #[test]
    fn responses_tolerate_missing_fields() {
        let result: RecommendationResult =
            serde_json::from_str(r#"{"recommendedCrops":[{"name":"Maize"}]}"#).unwrap();
        assert_eq!(result.recommended_crops[0].name, "Maize");
        assert!(result.reasons.is_empty());
        assert!(result.weather.is_none());

        let diagnosis: DiagnosisResult =
            serde_json::from_str(r#"{"diseaseName":"Leaf Rust"}"#).unwrap();
        assert_eq!(diagnosis.disease_name, "Leaf Rust");
        assert!(diagnosis.prevention_tips.is_empty());
    }

    #[test]
    fn responses_tolerate_null_fields() {
        let diagnosis: DiagnosisResult = serde_json::from_str(
            r#"{"diseaseName": "Leaf Rust", "description": "d",
                "treatments": null, "preventionTips": null}"#,
        )
        .unwrap();
        assert_eq!(diagnosis.disease_name, "Leaf Rust");
        assert!(diagnosis.treatments.is_empty());
        assert!(diagnosis.prevention_tips.is_empty());

        let result: RecommendationResult = serde_json::from_str(
            r#"{"recommendedCrops":[{"name":"Maize","description":null,"growingSeason":null}],
                "reasons":null,"alternativeCrops":null,"weather":null}"#,
        )
        .unwrap();
        assert_eq!(result.recommended_crops[0].name, "Maize");
        assert!(result.recommended_crops[0].description.is_empty());
        assert!(result.reasons.is_empty());
        assert!(result.alternative_crops.is_empty());
        assert!(result.weather.is_none());
    }

    #[test]
    fn image_mime_detection() {
        assert!(is_image_mime("image/png"));
        assert!(is_image_mime("IMAGE/JPEG"));
        assert!(!is_image_mime("application/pdf"));
        assert!(!is_image_mime(""));
    }

    #[test]
    fn preview_is_a_data_uri() {
        let image = SelectedImage::new("leaf.png", "image/png", b"abc".to_vec());
        assert_eq!(image.preview_uri(), "data:image/png;base64,YWJj");
    }
}
