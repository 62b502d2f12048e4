use std::fmt;
use std::rc::Rc;

use crate::markup::{UiElement, el, text_el};
use crate::models::{CropSummary, DiagnosisResult, RecommendationResult, WeatherSnapshot};

pub const NO_CROPS: &str = "No crops available.";
pub const NO_REASONS: &str = "No specific reasons provided.";
pub const NO_WEATHER: &str = "Weather information not available.";
pub const NO_TREATMENTS: &str = "No specific treatments available.";
pub const NO_PREVENTION: &str = "No specific prevention tips available.";

pub const CROP_ACTION_ATTR: &str = "data-crop-action";
pub const CROP_NAME_ATTR: &str = "data-crop";

/// What a result container ends up holding: either bare text or one subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerFill {
    Text(String),
    Node(UiElement),
}

impl ContainerFill {
    pub fn text(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Node(node) => node.text(),
        }
    }

    pub fn node(&self) -> Option<&UiElement> {
        match self {
            Self::Node(node) => Some(node),
            Self::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRecommendation {
    pub recommended: ContainerFill,
    pub reasons: ContainerFill,
    pub alternatives: ContainerFill,
    pub weather: ContainerFill,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiagnosis {
    pub name: String,
    pub description: String,
    pub treatments: ContainerFill,
    pub prevention: ContainerFill,
}

pub fn render_recommendation(result: &RecommendationResult) -> RenderedRecommendation {
    RenderedRecommendation {
        recommended: crop_list(&result.recommended_crops),
        reasons: bullet_list(&result.reasons, NO_REASONS),
        alternatives: crop_list(&result.alternative_crops),
        weather: weather_card(result.weather.as_ref()),
    }
}

pub fn render_diagnosis(result: &DiagnosisResult) -> RenderedDiagnosis {
    RenderedDiagnosis {
        name: result.disease_name.clone(),
        description: result.description.clone(),
        treatments: bullet_list(&result.treatments, NO_TREATMENTS),
        prevention: bullet_list(&result.prevention_tips, NO_PREVENTION),
    }
}

pub fn crop_list(crops: &[CropSummary]) -> ContainerFill {
    if crops.is_empty() {
        return ContainerFill::Text(NO_CROPS.to_string());
    }

    let items = crops.iter().map(crop_item).collect::<Vec<_>>();
    ContainerFill::Node(el("ul").with_class("crop-list").with_children(items))
}

fn crop_item(crop: &CropSummary) -> UiElement {
    el("li").with_class("crop-item").with_children(vec![
        text_el("h4", crop.name.as_str()),
        el("div").with_class("crop-details").with_children(vec![
            text_el("p", crop.description.as_str()),
            el("div").with_class("crop-stats").with_children(vec![
                crop_stat("fa-water", format!("Water: {}", crop.water_requirement)),
                crop_stat("fa-sun", format!("Sunlight: {}", crop.sunlight_requirement)),
                crop_stat(
                    "fa-seedling",
                    format!("Growing Season: {}", crop.growing_season),
                ),
            ]),
        ]),
        el("div").with_class("crop-buttons").with_children(vec![
            crop_button(CropAction::Details, &crop.name, "btn-secondary btn-small"),
            crop_button(CropAction::Marketplace, &crop.name, "btn-primary btn-small"),
        ]),
    ])
}

fn crop_stat(icon: &str, label: String) -> UiElement {
    el("span").with_class("crop-stat").with_children(vec![
        el("i").with_class(format!("fas {icon}")),
        text_el("span", label),
    ])
}

fn crop_button(action: CropAction, crop_name: &str, class_name: &str) -> UiElement {
    text_el("button", action.label())
        .with_attr("type", "button")
        .with_class(class_name)
        .with_attr(CROP_ACTION_ATTR, action.as_attr())
        .with_attr(CROP_NAME_ATTR, crop_name)
}

pub fn bullet_list(values: &[String], empty_message: &str) -> ContainerFill {
    if values.is_empty() {
        return ContainerFill::Text(empty_message.to_string());
    }
    let items = values
        .iter()
        .map(|value| text_el("li", value.as_str()))
        .collect::<Vec<_>>();
    ContainerFill::Node(el("ul").with_children(items))
}

pub fn weather_card(weather: Option<&WeatherSnapshot>) -> ContainerFill {
    let Some(weather) = weather else {
        return ContainerFill::Node(text_el("p", NO_WEATHER));
    };

    let line = |label: &str, value: String| {
        el("p").with_children(vec![
            text_el("strong", format!("{label}:")),
            text_el("span", value),
        ])
    };

    ContainerFill::Node(el("div").with_class("weather-card").with_children(vec![
        el("div").with_class("weather-icon").with_children(vec![
            el("i").with_class(format!("fas {}", weather_icon(&weather.condition))),
        ]),
        el("div").with_class("weather-details").with_children(vec![
            line("Temperature", format!(" {}°C", weather.temperature)),
            line("Humidity", format!(" {}%", weather.humidity)),
            line("Rainfall", format!(" {} mm", weather.rainfall)),
            line("Condition", format!(" {}", weather.condition)),
        ]),
    ]))
}

/// Font Awesome icon class for a free-text weather condition.
pub fn weather_icon(condition: &str) -> &'static str {
    let condition = condition.to_lowercase();
    let has = |needle: &str| condition.contains(needle);

    if has("sunny") || has("clear") {
        "fa-sun"
    } else if has("rain") {
        "fa-cloud-rain"
    } else if has("cloud") {
        "fa-cloud"
    } else if has("snow") {
        "fa-snowflake"
    } else if has("storm") || has("thunder") {
        "fa-bolt"
    } else if has("fog") || has("mist") {
        "fa-smog"
    } else {
        "fa-cloud-sun"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropAction {
    Details,
    Marketplace,
}

impl CropAction {
    pub fn as_attr(self) -> &'static str {
        match self {
            Self::Details => "details",
            Self::Marketplace => "marketplace",
        }
    }

    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "details" => Some(Self::Details),
            "marketplace" => Some(Self::Marketplace),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Details => "Details",
            Self::Marketplace => "Find Products",
        }
    }
}

type CropHandler = Rc<dyn Fn(&str)>;

/// Handlers for the buttons rendered next to each crop, registered when the
/// recommendation page is mounted.
#[derive(Clone)]
pub struct CropActions {
    on_details: CropHandler,
    on_marketplace: CropHandler,
}

impl CropActions {
    pub fn new(
        on_details: impl Fn(&str) + 'static,
        on_marketplace: impl Fn(&str) + 'static,
    ) -> Self {
        Self {
            on_details: Rc::new(on_details),
            on_marketplace: Rc::new(on_marketplace),
        }
    }

    pub fn dispatch(&self, action: CropAction, crop_name: &str) {
        match action {
            CropAction::Details => (self.on_details)(crop_name),
            CropAction::Marketplace => (self.on_marketplace)(crop_name),
        }
    }
}

impl fmt::Debug for CropActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CropActions").finish_non_exhaustive()
    }
}
