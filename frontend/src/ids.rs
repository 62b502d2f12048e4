//! Element IDs shared between the page host markup and the controllers.

pub const RESULT_CONTAINER: &str = "result-container";
pub const LOADING_INDICATOR: &str = "loading-indicator";

pub mod crop {
    pub const FORM: &str = "crop-form";
    pub const NITROGEN: &str = "soil-nitrogen";
    pub const PHOSPHORUS: &str = "soil-phosphorus";
    pub const POTASSIUM: &str = "soil-potassium";
    pub const PH: &str = "soil-ph";
    pub const TEMPERATURE: &str = "soil-temperature";
    pub const HUMIDITY: &str = "soil-humidity";
    pub const SOIL_TYPE: &str = "soil-type";
    pub const LOCATION: &str = "location";
    pub const SUBMIT: &str = "recommend-button";
    pub const RECOMMENDED: &str = "recommended-crops";
    pub const REASONS: &str = "recommendation-reasons";
    pub const ALTERNATIVES: &str = "alternative-crops";
    pub const WEATHER: &str = "weather-info";
    pub const IOT_CONNECT: &str = "iot-connect";

    /// Range inputs that mirror their value into a `<id>-value` span.
    pub const RANGE_FIELDS: [&str; 6] =
        [NITROGEN, PHOSPHORUS, POTASSIUM, PH, TEMPERATURE, HUMIDITY];
}

pub mod disease {
    pub const UPLOAD_AREA: &str = "upload-area";
    pub const FILE_INPUT: &str = "file-input";
    pub const IMAGE_PREVIEW: &str = "image-preview";
    pub const PREVIEW_CONTAINER: &str = "preview-container";
    pub const DETECT: &str = "detect-button";
    pub const NAME: &str = "disease-name";
    pub const DESCRIPTION: &str = "disease-description";
    pub const TREATMENTS: &str = "treatment-suggestions";
    pub const PREVENTION: &str = "prevention-tips";
}

/// ID of the span that displays the live value of a range input.
pub fn value_display_id(input_id: &str) -> String {
    format!("{input_id}-value")
}
