use std::rc::Rc;

use js_sys::Uint8Array;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Document, DragEvent, Element, File, HtmlButtonElement, HtmlElement, HtmlImageElement,
    HtmlInputElement,
};

use super::{DomNotifier, HttpBackend, fill_container, require, scroll_into_view, set_visible};
use crate::config::ClientConfig;
use crate::detect::{DetectionController, DetectionView};
use crate::error::WorkflowError;
use crate::ids::{self, disease};
use crate::models::{SelectedImage, is_image_mime};
use crate::notify::Notifier;
use crate::render::RenderedDiagnosis;

const DRAG_OVER_CLASS: &str = "drag-over";

struct DetectionPage {
    doc: Document,
    upload_area: HtmlElement,
    file_input: HtmlInputElement,
    image_preview: HtmlImageElement,
    preview_container: HtmlElement,
    detect: HtmlButtonElement,
    result_container: HtmlElement,
    loading: HtmlElement,
    name: Element,
    description: Element,
    treatments: Element,
    prevention: Element,
}

impl DetectionPage {
    fn resolve(doc: &Document) -> Result<Self, WorkflowError> {
        Ok(Self {
            doc: doc.clone(),
            upload_area: require(doc, disease::UPLOAD_AREA)?,
            file_input: require(doc, disease::FILE_INPUT)?,
            image_preview: require(doc, disease::IMAGE_PREVIEW)?,
            preview_container: require(doc, disease::PREVIEW_CONTAINER)?,
            detect: require(doc, disease::DETECT)?,
            result_container: require(doc, ids::RESULT_CONTAINER)?,
            loading: require(doc, ids::LOADING_INDICATOR)?,
            name: require(doc, disease::NAME)?,
            description: require(doc, disease::DESCRIPTION)?,
            treatments: require(doc, disease::TREATMENTS)?,
            prevention: require(doc, disease::PREVENTION)?,
        })
    }
}

impl DetectionView for DetectionPage {
    fn show_preview(&self, data_uri: &str) {
        self.image_preview.set_src(data_uri);
        set_visible(&self.preview_container, true);
        set_visible(&self.result_container, false);
        self.detect.set_disabled(false);
    }

    fn set_busy(&self, busy: bool) {
        set_visible(&self.loading, busy);
        self.detect.set_disabled(busy);
    }

    fn show_diagnosis(&self, rendered: &RenderedDiagnosis) {
        set_visible(&self.result_container, true);
        self.name.set_text_content(Some(&rendered.name));
        self.description.set_text_content(Some(&rendered.description));
        fill_container(&self.doc, &self.treatments, &rendered.treatments);
        fill_container(&self.doc, &self.prevention, &rendered.prevention);
        scroll_into_view(&self.result_container);
    }
}

pub(super) fn mount(doc: &Document, config: Rc<ClientConfig>) -> Result<(), WorkflowError> {
    let page = Rc::new(DetectionPage::resolve(doc)?);
    set_visible(&page.preview_container, false);
    set_visible(&page.result_container, false);
    set_visible(&page.loading, false);
    page.detect.set_disabled(true);

    let notifier = Rc::new(DomNotifier::new(config.toast));
    let controller = Rc::new(DetectionController::new(
        page.clone(),
        Rc::new(HttpBackend::new(config)),
        notifier.clone(),
    ));

    {
        let file_input = page.file_input.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            file_input.click();
        });
        let _ = page
            .upload_area
            .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
        callback.forget();
    }

    {
        let controller = controller.clone();
        let input = page.file_input.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            if let Some(file) = input.files().and_then(|files| files.get(0)) {
                accept_file(controller.clone(), file);
            }
        });
        let _ = page
            .file_input
            .add_event_listener_with_callback("change", callback.as_ref().unchecked_ref());
        callback.forget();
    }

    {
        let area = page.upload_area.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            event.prevent_default();
            event.stop_propagation();
            let _ = area.class_list().add_1(DRAG_OVER_CLASS);
        });
        let _ = page
            .upload_area
            .add_event_listener_with_callback("dragover", callback.as_ref().unchecked_ref());
        callback.forget();
    }

    {
        let area = page.upload_area.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            let _ = area.class_list().remove_1(DRAG_OVER_CLASS);
        });
        let _ = page
            .upload_area
            .add_event_listener_with_callback("dragleave", callback.as_ref().unchecked_ref());
        callback.forget();
    }

    {
        let area = page.upload_area.clone();
        let controller = controller.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            event.prevent_default();
            event.stop_propagation();
            let _ = area.class_list().remove_1(DRAG_OVER_CLASS);

            let file = event
                .dyn_ref::<DragEvent>()
                .and_then(DragEvent::data_transfer)
                .and_then(|transfer| transfer.files())
                .and_then(|files| files.get(0));
            match file {
                Some(file) => accept_file(controller.clone(), file),
                None => notifier.report(&WorkflowError::NotAnImage),
            }
        });
        let _ = page
            .upload_area
            .add_event_listener_with_callback("drop", callback.as_ref().unchecked_ref());
        callback.forget();
    }

    {
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            let controller = controller.clone();
            spawn_local(async move { controller.detect().await });
        });
        let _ = page
            .detect
            .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
        callback.forget();
    }

    Ok(())
}

/// Read the file into memory and hand it to the controller. Non-images skip
/// the read; the controller still gets them so it can refuse them.
fn accept_file(controller: Rc<DetectionController>, file: File) {
    let name = file.name();
    let mime_type = file.type_();
    if !is_image_mime(&mime_type) {
        controller.select(SelectedImage::new(name, mime_type, Vec::new()));
        return;
    }

    spawn_local(async move {
        match JsFuture::from(file.array_buffer()).await {
            Ok(buffer) => {
                let bytes = Uint8Array::new(&buffer).to_vec();
                controller.select(SelectedImage::new(name, mime_type, bytes));
            }
            Err(err) => log::error!("failed reading {name}: {err:?}"),
        }
    });
}
