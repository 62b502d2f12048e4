use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlInputElement,
    HtmlSelectElement,
};

use super::{
    DomNotifier, HttpBackend, SimulatedSensor, fill_container, require, scroll_into_view,
    set_visible,
};
use crate::config::ClientConfig;
use crate::error::WorkflowError;
use crate::ids::{self, crop};
use crate::models::{SoilForm, SoilSample};
use crate::recommend::{RecommendationController, RecommendationView};
use crate::render::{
    CROP_ACTION_ATTR, CROP_NAME_ATTR, CropAction, CropActions, RenderedRecommendation,
};

const SENSOR_IDLE_LABEL: &str = r#"<i class="fas fa-link"></i> Connect IoT Device"#;
const SENSOR_BUSY_LABEL: &str = r#"<i class="fas fa-spinner fa-spin"></i> Connecting..."#;

/// Element handles of the crop recommendation page, resolved once.
struct RecommendationPage {
    doc: Document,
    form: HtmlFormElement,
    nitrogen: HtmlInputElement,
    phosphorus: HtmlInputElement,
    potassium: HtmlInputElement,
    ph: HtmlInputElement,
    temperature: HtmlInputElement,
    humidity: HtmlInputElement,
    soil_type: HtmlSelectElement,
    location: HtmlInputElement,
    submit: HtmlButtonElement,
    result_container: HtmlElement,
    loading: HtmlElement,
    recommended: Element,
    reasons: Element,
    alternatives: Element,
    weather: Element,
    iot_connect: HtmlButtonElement,
}

impl RecommendationPage {
    fn resolve(doc: &Document) -> Result<Self, WorkflowError> {
        Ok(Self {
            doc: doc.clone(),
            form: require(doc, crop::FORM)?,
            nitrogen: require(doc, crop::NITROGEN)?,
            phosphorus: require(doc, crop::PHOSPHORUS)?,
            potassium: require(doc, crop::POTASSIUM)?,
            ph: require(doc, crop::PH)?,
            temperature: require(doc, crop::TEMPERATURE)?,
            humidity: require(doc, crop::HUMIDITY)?,
            soil_type: require(doc, crop::SOIL_TYPE)?,
            location: require(doc, crop::LOCATION)?,
            submit: require(doc, crop::SUBMIT)?,
            result_container: require(doc, ids::RESULT_CONTAINER)?,
            loading: require(doc, ids::LOADING_INDICATOR)?,
            recommended: require(doc, crop::RECOMMENDED)?,
            reasons: require(doc, crop::REASONS)?,
            alternatives: require(doc, crop::ALTERNATIVES)?,
            weather: require(doc, crop::WEATHER)?,
            iot_connect: require(doc, crop::IOT_CONNECT)?,
        })
    }

    fn input(&self, id: &str) -> Option<&HtmlInputElement> {
        match id {
            crop::NITROGEN => Some(&self.nitrogen),
            crop::PHOSPHORUS => Some(&self.phosphorus),
            crop::POTASSIUM => Some(&self.potassium),
            crop::PH => Some(&self.ph),
            crop::TEMPERATURE => Some(&self.temperature),
            crop::HUMIDITY => Some(&self.humidity),
            _ => None,
        }
    }

    fn set_value_display(&self, input_id: &str, value: &str) {
        if let Some(display) = self.doc.get_element_by_id(&ids::value_display_id(input_id)) {
            display.set_text_content(Some(value));
        }
    }
}

impl RecommendationView for RecommendationPage {
    fn read_form(&self) -> SoilForm {
        SoilForm {
            nitrogen: self.nitrogen.value(),
            phosphorus: self.phosphorus.value(),
            potassium: self.potassium.value(),
            ph: self.ph.value(),
            temperature: self.temperature.value(),
            humidity: self.humidity.value(),
            soil_type: self.soil_type.value(),
            location: self.location.value(),
        }
    }

    fn set_busy(&self, busy: bool) {
        set_visible(&self.loading, busy);
        self.submit.set_disabled(busy);
    }

    fn show_results(&self, rendered: &RenderedRecommendation) {
        set_visible(&self.result_container, true);
        fill_container(&self.doc, &self.recommended, &rendered.recommended);
        fill_container(&self.doc, &self.reasons, &rendered.reasons);
        fill_container(&self.doc, &self.alternatives, &rendered.alternatives);
        fill_container(&self.doc, &self.weather, &rendered.weather);
        scroll_into_view(&self.result_container);
    }

    fn fill_soil(&self, sample: &SoilSample) {
        for (id, value) in sample.field_values() {
            if let Some(input) = self.input(id) {
                input.set_value(&value);
            }
            self.set_value_display(id, &value);
        }
        self.soil_type.set_value(&sample.soil_type);
    }

    fn set_sensor_connecting(&self, connecting: bool) {
        self.iot_connect.set_disabled(connecting);
        self.iot_connect.set_inner_html(if connecting {
            SENSOR_BUSY_LABEL
        } else {
            SENSOR_IDLE_LABEL
        });
    }
}

pub(super) fn mount(
    doc: &Document,
    config: Rc<ClientConfig>,
    actions: CropActions,
) -> Result<(), WorkflowError> {
    let page = Rc::new(RecommendationPage::resolve(doc)?);
    set_visible(&page.result_container, false);
    set_visible(&page.loading, false);
    init_range_displays(doc);

    let backend = Rc::new(HttpBackend::new(config.clone()));
    let controller = Rc::new(RecommendationController::new(
        page.clone(),
        backend.clone(),
        backend,
        Rc::new(SimulatedSensor::new(config.sensor_delay_ms)),
        Rc::new(DomNotifier::new(config.toast)),
    ));

    {
        let controller = controller.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            event.prevent_default();
            let controller = controller.clone();
            spawn_local(async move { controller.submit().await });
        });
        let _ = page
            .form
            .add_event_listener_with_callback("submit", callback.as_ref().unchecked_ref());
        callback.forget();
    }

    {
        let controller = controller.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            let controller = controller.clone();
            spawn_local(async move { controller.connect_sensor().await });
        });
        let _ = page
            .iot_connect
            .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
        callback.forget();
    }

    for container in [&page.recommended, &page.alternatives] {
        bind_crop_actions(container, actions.clone());
    }

    Ok(())
}

/// Mirror every range input into its `<id>-value` span, if the page has one.
fn init_range_displays(doc: &Document) {
    let Ok(inputs) = doc.query_selector_all("input[type=\"range\"]") else {
        return;
    };
    for index in 0..inputs.length() {
        let Some(input) = inputs
            .get(index)
            .and_then(|node| node.dyn_into::<HtmlInputElement>().ok())
        else {
            continue;
        };
        let Some(display) = doc.get_element_by_id(&ids::value_display_id(&input.id())) else {
            continue;
        };
        display.set_text_content(Some(&input.value()));

        let source = input.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            display.set_text_content(Some(&source.value()));
        });
        let _ = input.add_event_listener_with_callback("input", callback.as_ref().unchecked_ref());
        callback.forget();
    }
}

fn bind_crop_actions(container: &Element, actions: CropActions) {
    let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        let Some(button) = event
            .target()
            .and_then(|node| node.dyn_into::<Element>().ok())
            .and_then(|node| node.closest(&format!("[{CROP_ACTION_ATTR}]")).ok().flatten())
        else {
            return;
        };
        let action = button
            .get_attribute(CROP_ACTION_ATTR)
            .and_then(|value| CropAction::from_attr(&value));
        let crop_name = button.get_attribute(CROP_NAME_ATTR).unwrap_or_default();
        if let Some(action) = action {
            event.prevent_default();
            actions.dispatch(action, &crop_name);
        }
    });
    let _ = container.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
    callback.forget();
}
