use cropwise_frontend::ids::{self, crop, disease};
use cropwise_frontend::markup::{UiContent, UiElement, el, text_el};
use cropwise_frontend::models::SoilType;
use html_compile::compile::build_component;
use html_compile::types::{Attribute, Child, Component};

use crate::marketplace::Product;

const BASE_CSS: &str = include_str!("ui_assets/base.css");
const RAW_TEXT_TAGS: [&str; 2] = ["script", "style"];
const FONT_AWESOME: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css";

pub const MARKETPLACE_PATH: &str = "/marketplace";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    CropRecommendation,
    DiseaseDetection,
}

impl Page {
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::CropRecommendation => "/crop-recommendation",
            Self::DiseaseDetection => "/disease-detection",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Home => "Cropwise",
            Self::CropRecommendation => "Crop Recommendation - Cropwise",
            Self::DiseaseDetection => "Disease Detection - Cropwise",
        }
    }
}

/// Soil slider: input id, label, min, max, step, initial value.
#[derive(Clone, Copy)]
struct RangeSpec(
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
);

const SOIL_RANGES: [RangeSpec; 6] = [
    RangeSpec(crop::NITROGEN, "Nitrogen (N)", "0", "140", "1", "50"),
    RangeSpec(crop::PHOSPHORUS, "Phosphorus (P)", "5", "145", "1", "50"),
    RangeSpec(crop::POTASSIUM, "Potassium (K)", "5", "205", "1", "50"),
    RangeSpec(crop::PH, "Soil pH", "3.5", "9.0", "0.1", "6.5"),
    RangeSpec(crop::TEMPERATURE, "Soil Temperature (°C)", "0", "50", "1", "25"),
    RangeSpec(crop::HUMIDITY, "Humidity (%)", "0", "100", "1", "60"),
];

pub fn render_page(page: Page, frontend_entry: &str) -> String {
    let (content, scripts) = match page {
        Page::Home => (render_home_content(), Vec::new()),
        Page::CropRecommendation => (render_crop_content(), vec![boot_script(frontend_entry)]),
        Page::DiseaseDetection => (render_disease_content(), vec![boot_script(frontend_entry)]),
    };
    render_app_page(page.title(), page.path(), content, &scripts)
}

pub fn render_marketplace_page(products: &[&Product], crop: Option<&str>) -> String {
    render_app_page(
        "Marketplace - Cropwise",
        MARKETPLACE_PATH,
        render_marketplace_content(products, crop),
        &[],
    )
}

fn render_app_page(
    title: &str,
    active_path: &str,
    content: Vec<UiElement>,
    scripts: &[String],
) -> String {
    let body = vec![
        render_nav(active_path),
        el("main").with_class("container").with_children(content),
    ];
    render_document(title, BASE_CSS, body, scripts)
}

fn render_document(
    title: &str,
    css: &str,
    body_nodes: Vec<UiElement>,
    scripts: &[String],
) -> String {
    let head_children = vec![
        el("meta").with_attr("charset", "UTF-8"),
        el("meta")
            .with_attr("name", "viewport")
            .with_attr("content", "width=device-width, initial-scale=1.0"),
        text_el("title", title),
        el("link")
            .with_attr("rel", "stylesheet")
            .with_attr("href", FONT_AWESOME),
        el("style").with_text(css),
    ];

    let mut body_children = body_nodes;
    for script in scripts {
        body_children.push(
            el("script")
                .with_attr("type", "module")
                .with_text(script.clone()),
        );
    }

    let html = el("html").with_attr("lang", "en").with_children(vec![
        el("head").with_children(head_children),
        el("body").with_children(body_children),
    ]);

    format!("<!DOCTYPE html>\n{}", render_html(&html))
}

/// Serialise a tree. Text and attribute values are escaped first; script
/// and style bodies go out verbatim.
fn render_html(node: &UiElement) -> String {
    let escaped = node.map_values(&RAW_TEXT_TAGS, &escape_html, &escape_html_attr);
    build_component(&to_component(&escaped))
}

fn to_component(node: &UiElement) -> Component<'_> {
    let meta = if node.attrs().is_empty() {
        None
    } else {
        Some(
            node.attrs()
                .iter()
                .map(|(label, value)| Attribute {
                    label: *label,
                    value: value.as_str(),
                })
                .collect(),
        )
    };

    let child = match node.content() {
        UiContent::Empty => Child::NoChild,
        UiContent::Text(value) => Child::Text(value.as_str()),
        UiContent::Children(nodes) => Child::ComponentVec(
            nodes
                .iter()
                .map(|child| Box::new(to_component(child)))
                .collect(),
        ),
    };

    Component {
        tag: node.tag(),
        meta,
        child,
    }
}

fn boot_script(frontend_entry: &str) -> String {
    format!(
        "import init from \"{}\";\ninit();",
        escape_js_string(frontend_entry)
    )
}

fn render_nav(active_path: &str) -> UiElement {
    el("nav").with_class("navbar").with_children(vec![
        text_el("span", "Cropwise").with_class("logo"),
        nav_link(Page::Home.path(), "Home", active_path),
        nav_link(
            Page::CropRecommendation.path(),
            "Crop Recommendation",
            active_path,
        ),
        nav_link(
            Page::DiseaseDetection.path(),
            "Disease Detection",
            active_path,
        ),
        nav_link(MARKETPLACE_PATH, "Marketplace", active_path),
    ])
}

fn nav_link(path: &str, label: &str, active_path: &str) -> UiElement {
    el("a")
        .with_attr("href", path)
        .maybe_attr(active_path == path, "class", "active")
        .with_text(label)
}

fn render_home_content() -> Vec<UiElement> {
    let card = |page: Page, icon: &str, heading: &str, blurb: &str| {
        el("a")
            .with_class("feature-card")
            .with_attr("href", page.path())
            .with_children(vec![
                el("i").with_class(format!("fas {icon}")),
                text_el("h3", heading),
                text_el("p", blurb),
            ])
    };

    vec![
        text_el("h1", "Smarter decisions for every field"),
        text_el(
            "p",
            "Match crops to your soil and local weather, \
             or diagnose plant disease from a leaf photo.",
        )
        .with_class("lead"),
        el("div").with_class("feature-grid").with_children(vec![
            card(
                Page::CropRecommendation,
                "fa-seedling",
                "Crop Recommendation",
                "Enter soil readings or connect a sensor to get crops suited to your conditions.",
            ),
            card(
                Page::DiseaseDetection,
                "fa-leaf",
                "Disease Detection",
                "Upload a photo of an affected plant for a diagnosis with treatment suggestions.",
            ),
        ]),
    ]
}

fn render_crop_content() -> Vec<UiElement> {
    let mut fields: Vec<UiElement> = SOIL_RANGES.iter().map(range_group).collect();

    let mut soil_options = vec![option("", "Select soil type", false)];
    soil_options.extend(
        SoilType::ALL
            .iter()
            .map(|soil| option(soil.as_str(), soil.label(), false)),
    );
    fields.push(form_group(labeled_control(
        crop::SOIL_TYPE,
        "Soil Type",
        el("select")
            .with_id(crop::SOIL_TYPE)
            .with_attr("name", crop::SOIL_TYPE)
            .with_attr("required", "required")
            .with_children(soil_options),
    )));

    fields.push(form_group(labeled_control(
        crop::LOCATION,
        "Location",
        input_base("text", crop::LOCATION, crop::LOCATION, "")
            .with_attr("placeholder", "City or region")
            .with_attr("required", "required"),
    )));

    fields.push(el("div").with_class("form-actions").with_children(vec![
        el("button")
            .with_attr("type", "button")
            .with_id(crop::IOT_CONNECT)
            .with_class("btn btn-secondary")
            .with_children(vec![
                el("i").with_class("fas fa-link"),
                text_el("span", " Connect IoT Device"),
            ]),
        el("button")
            .with_attr("type", "submit")
            .with_id(crop::SUBMIT)
            .with_class("btn btn-primary")
            .with_text("Get Recommendations"),
    ]));

    vec![
        text_el("h1", "Crop Recommendation"),
        el("form")
            .with_id(crop::FORM)
            .with_class("card")
            .with_children(fields),
        loading_indicator("Analyzing soil and weather..."),
        el("div")
            .with_id(ids::RESULT_CONTAINER)
            .with_class("results")
            .with_attr("style", "display: none;")
            .with_children(vec![
                result_section("Recommended Crops", crop::RECOMMENDED),
                result_section("Why These Crops", crop::REASONS),
                result_section("Alternative Crops", crop::ALTERNATIVES),
                result_section("Current Weather", crop::WEATHER),
            ]),
    ]
}

fn render_disease_content() -> Vec<UiElement> {
    vec![
        text_el("h1", "Plant Disease Detection"),
        el("div")
            .with_id(disease::UPLOAD_AREA)
            .with_class("upload-area")
            .with_children(vec![
                el("i").with_class("fas fa-cloud-upload-alt"),
                text_el("p", "Drag and drop a plant image here, or click to browse"),
                input_base("file", "image", disease::FILE_INPUT, "")
                    .with_attr("accept", "image/*")
                    .with_attr("hidden", "hidden"),
            ]),
        el("div")
            .with_id(disease::PREVIEW_CONTAINER)
            .with_class("preview-container")
            .with_attr("style", "display: none;")
            .with_children(vec![
                el("img")
                    .with_id(disease::IMAGE_PREVIEW)
                    .with_attr("alt", "Selected plant image"),
            ]),
        el("button")
            .with_attr("type", "button")
            .with_id(disease::DETECT)
            .with_class("btn btn-primary")
            .with_attr("disabled", "disabled")
            .with_text("Detect Disease"),
        loading_indicator("Examining the image..."),
        el("div")
            .with_id(ids::RESULT_CONTAINER)
            .with_class("results")
            .with_attr("style", "display: none;")
            .with_children(vec![
                el("div").with_class("result-section").with_children(vec![
                    el("h2").with_id(disease::NAME),
                    el("p").with_id(disease::DESCRIPTION),
                ]),
                result_section("Treatment Suggestions", disease::TREATMENTS),
                result_section("Prevention Tips", disease::PREVENTION),
            ]),
    ]
}

fn render_marketplace_content(products: &[&Product], crop: Option<&str>) -> Vec<UiElement> {
    let crop = crop.map(str::trim).filter(|crop| !crop.is_empty());
    let mut content = vec![text_el("h1", "Marketplace")];
    if let Some(crop) = crop {
        content.push(text_el("p", format!("Products for {crop}")).with_class("lead"));
    }

    if products.is_empty() {
        let message = match crop {
            Some(crop) => format!("No products found for {crop}."),
            None => "No products available.".to_string(),
        };
        content.push(text_el("p", message).with_class("empty"));
        return content;
    }

    let cards = products.iter().map(|product| product_card(product)).collect();
    content.push(el("div").with_class("product-grid").with_children(cards));
    content
}

fn product_card(product: &Product) -> UiElement {
    let mut children = vec![
        text_el("h3", product.name.as_str()),
        text_el("p", product.category.as_str()).with_class("product-category"),
    ];
    if !product.description.is_empty() {
        children.push(text_el("p", product.description.as_str()));
    }
    if let Some(price) = product.price {
        children.push(text_el("p", format!("${price:.2}")).with_class("product-price"));
    }
    el("div").with_class("product-card").with_children(children)
}

fn range_group(range: &RangeSpec) -> UiElement {
    let RangeSpec(id, label, min, max, step, value) = *range;
    form_group(vec![
        el("label").with_attr("for", id).with_children(vec![
            text_el("span", format!("{label}: ")),
            text_el("span", value).with_id(ids::value_display_id(id)),
        ]),
        input_base("range", id, id, value)
            .with_attr("min", min)
            .with_attr("max", max)
            .with_attr("step", step),
    ])
}

/// Titled card around an empty container the controllers fill at runtime.
fn result_section(heading: &str, container_id: &str) -> UiElement {
    el("section").with_class("result-section").with_children(vec![
        text_el("h3", heading),
        el("div").with_id(container_id),
    ])
}

fn loading_indicator(message: &str) -> UiElement {
    el("div")
        .with_id(ids::LOADING_INDICATOR)
        .with_class("loading")
        .with_attr("style", "display: none;")
        .with_children(vec![el("div").with_class("spinner"), text_el("p", message)])
}

fn form_group(children: Vec<UiElement>) -> UiElement {
    el("div").with_class("form-group").with_children(children)
}

fn option(value: &str, label: &str, selected: bool) -> UiElement {
    el("option")
        .with_attr("value", value)
        .maybe_attr(selected, "selected", "selected")
        .with_text(label)
}

fn labeled_control(label_for: &str, label: &str, control: UiElement) -> Vec<UiElement> {
    vec![text_el("label", label).with_attr("for", label_for), control]
}

fn input_base(input_type: &str, name: &str, id: &str, value: &str) -> UiElement {
    el("input")
        .with_attr("type", input_type)
        .with_attr("name", name)
        .with_id(id)
        .maybe_attr(!value.is_empty(), "value", value)
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn escape_html_attr(input: &str) -> String {
    escape_html(input)
}

fn escape_js_string(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}
