//! DOM and `fetch` bindings for the controllers. Only built for `wasm32`.

mod detect;
mod http;
mod recommend;
mod sensor;
mod toast;

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CustomEvent, CustomEventInit, Document, Element, HtmlElement, ScrollBehavior,
    ScrollIntoViewOptions,
};

use crate::config::ClientConfig;
use crate::error::WorkflowError;
use crate::ids;
use crate::markup::{UiContent, UiElement};
use crate::render::{ContainerFill, CropActions};

pub use http::HttpBackend;
pub use sensor::SimulatedSensor;
pub use toast::DomNotifier;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed.
    let _ = console_log::init_with_level(log::Level::Info);

    let Some(doc) = web_document() else {
        return;
    };
    let config = Rc::new(ClientConfig::default());

    if doc.get_element_by_id(ids::crop::FORM).is_some() {
        let actions = browser_crop_actions(&config);
        match recommend::mount(&doc, config.clone(), actions) {
            Ok(()) => log::info!("crop recommendation page ready"),
            Err(err) => log::error!("crop recommendation page not mounted: {err}"),
        }
    }

    if doc.get_element_by_id(ids::disease::UPLOAD_AREA).is_some() {
        match detect::mount(&doc, config) {
            Ok(()) => log::info!("disease detection page ready"),
            Err(err) => log::error!("disease detection page not mounted: {err}"),
        }
    }
}

/// Crop buttons announce themselves as window events. "Find Products" then
/// opens the marketplace unless a listener called `preventDefault`.
fn browser_crop_actions(config: &ClientConfig) -> CropActions {
    let marketplace_page = config.marketplace_page.clone();
    CropActions::new(
        |crop| {
            dispatch_window_event("crop-details", crop);
        },
        move |crop| {
            if dispatch_window_event("add-to-marketplace", crop) {
                open_marketplace(&marketplace_page, crop);
            }
        },
    )
}

/// Returns false when a listener cancelled the event.
fn dispatch_window_event(name: &str, crop: &str) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let init = CustomEventInit::new();
    init.set_detail(&JsValue::from_str(crop));
    init.set_cancelable(true);
    match CustomEvent::new_with_event_init_dict(name, &init) {
        Ok(event) => window.dispatch_event(&event).unwrap_or(false),
        Err(err) => {
            log::warn!("could not create {name} event: {err:?}");
            false
        }
    }
}

fn open_marketplace(page: &str, crop: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let crop = String::from(js_sys::encode_uri_component(crop));
    if let Err(err) = window.location().set_href(&format!("{page}?crop={crop}")) {
        log::warn!("could not open the marketplace: {err:?}");
    }
}

fn web_document() -> Option<Document> {
    web_sys::window().and_then(|window| window.document())
}

/// Resolve a page element by ID as the expected element type.
fn require<T: JsCast>(doc: &Document, id: &'static str) -> Result<T, WorkflowError> {
    doc.get_element_by_id(id)
        .and_then(|node| node.dyn_into::<T>().ok())
        .ok_or(WorkflowError::MissingElement(id))
}

fn set_visible(element: &HtmlElement, visible: bool) {
    let _ = element
        .style()
        .set_property("display", if visible { "block" } else { "none" });
}

fn scroll_into_view(element: &Element) {
    let options = ScrollIntoViewOptions::new();
    options.set_behavior(ScrollBehavior::Smooth);
    element.scroll_into_view_with_scroll_into_view_options(&options);
}

/// Replace the contents of `container` with `fill`.
fn fill_container(doc: &Document, container: &Element, fill: &ContainerFill) {
    container.set_inner_html("");
    match fill {
        ContainerFill::Text(text) => container.set_text_content(Some(text)),
        ContainerFill::Node(node) => match build_node(doc, node) {
            Ok(child) => {
                let _ = container.append_child(&child);
            }
            Err(err) => log::error!("failed building <{}>: {err:?}", node.tag()),
        },
    }
}

fn build_node(doc: &Document, node: &UiElement) -> Result<Element, JsValue> {
    let element = doc.create_element(node.tag())?;
    for (label, value) in node.attrs() {
        element.set_attribute(label, value)?;
    }
    match node.content() {
        UiContent::Empty => {}
        UiContent::Text(text) => element.set_text_content(Some(text)),
        UiContent::Children(children) => {
            for child in children {
                element.append_child(&build_node(doc, child)?)?;
            }
        }
    }
    Ok(element)
}
