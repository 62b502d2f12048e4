//! Plant disease detection workflow: image selection → preview → upload → render.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::WorkflowError;
use crate::models::SelectedImage;
use crate::notify::Notifier;
use crate::render::{RenderedDiagnosis, render_diagnosis};
use crate::services::DetectionApi;

pub trait DetectionView {
    /// Show the preview, hide stale results and enable the detect action.
    fn show_preview(&self, data_uri: &str);

    /// Loading indicator shown and detect disabled while `busy`.
    fn set_busy(&self, busy: bool);

    fn show_diagnosis(&self, rendered: &RenderedDiagnosis);
}

pub struct DetectionController {
    view: Rc<dyn DetectionView>,
    api: Rc<dyn DetectionApi>,
    notifier: Rc<dyn Notifier>,
    selected: RefCell<Option<Rc<SelectedImage>>>,
    in_flight: Cell<bool>,
}

impl DetectionController {
    pub fn new(
        view: Rc<dyn DetectionView>,
        api: Rc<dyn DetectionApi>,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        Self {
            view,
            api,
            notifier,
            selected: RefCell::new(None),
            in_flight: Cell::new(false),
        }
    }

    pub fn selected(&self) -> Option<Rc<SelectedImage>> {
        self.selected.borrow().clone()
    }

    /// Take a newly chosen file. Non-images are refused with a toast and
    /// leave the current selection untouched.
    pub fn select(&self, image: SelectedImage) {
        if !image.is_image() {
            log::debug!("refusing {} ({})", image.file_name, image.mime_type);
            self.notifier.report(&WorkflowError::NotAnImage);
            return;
        }

        let preview = image.preview_uri();
        *self.selected.borrow_mut() = Some(Rc::new(image));
        self.view.show_preview(&preview);
    }

    pub async fn detect(&self) {
        let Some(image) = self.selected() else {
            self.notifier.report(&WorkflowError::NoImageSelected);
            return;
        };
        if self.in_flight.replace(true) {
            log::debug!("detection already in flight, ignoring click");
            return;
        }
        self.view.set_busy(true);

        match self.api.diagnose(&image).await {
            Ok(result) => {
                log::info!("diagnosed {} as {:?}", image.file_name, result.disease_name);
                self.view.show_diagnosis(&render_diagnosis(&result));
            }
            Err(err) => {
                log::warn!("disease detection failed: {err}");
                self.notifier.report(&err);
            }
        }

        self.view.set_busy(false);
        self.in_flight.set(false);
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use futures::executor::block_on;

    use super::*;
    use crate::models::DiagnosisResult;
    use crate::notify::testing::RecordingNotifier;
    use crate::render::{ContainerFill, NO_PREVENTION, NO_TREATMENTS};

    #[derive(Default)]
    struct FakeView {
        previews: RefCell<Vec<String>>,
        busy: RefCell<Vec<bool>>,
        shown: RefCell<Vec<RenderedDiagnosis>>,
    }

    impl DetectionView for FakeView {
        fn show_preview(&self, data_uri: &str) {
            self.previews.borrow_mut().push(data_uri.to_string());
        }

        fn set_busy(&self, busy: bool) {
            self.busy.borrow_mut().push(busy);
        }

        fn show_diagnosis(&self, rendered: &RenderedDiagnosis) {
            self.shown.borrow_mut().push(rendered.clone());
        }
    }

    struct FakeApi {
        reply: Result<DiagnosisResult, WorkflowError>,
        uploads: RefCell<Vec<String>>,
    }

    #[async_trait(?Send)]
    impl DetectionApi for FakeApi {
        async fn diagnose(
            &self,
            image: &SelectedImage,
        ) -> Result<DiagnosisResult, WorkflowError> {
            self.uploads.borrow_mut().push(image.file_name.clone());
            self.reply.clone()
        }
    }

    fn setup(
        reply: Result<DiagnosisResult, WorkflowError>,
    ) -> (Rc<FakeView>, Rc<FakeApi>, Rc<RecordingNotifier>, DetectionController) {
        let view = Rc::new(FakeView::default());
        let api = Rc::new(FakeApi {
            reply,
            uploads: RefCell::new(Vec::new()),
        });
        let notifier = Rc::new(RecordingNotifier::default());
        let controller = DetectionController::new(view.clone(), api.clone(), notifier.clone());
        (view, api, notifier, controller)
    }

    fn blight() -> DiagnosisResult {
        DiagnosisResult {
            disease_name: "Early Blight".to_string(),
            description: "Concentric brown lesions".to_string(),
            treatments: vec!["Apply copper fungicide".to_string()],
            prevention_tips: Vec::new(),
        }
    }

    fn leaf(name: &str) -> SelectedImage {
        SelectedImage::new(name, "image/jpeg", name.as_bytes().to_vec())
    }

    #[test]
    fn non_image_never_changes_preview() {
        let (view, _api, notifier, controller) = setup(Ok(blight()));

        controller.select(SelectedImage::new("notes.pdf", "application/pdf", vec![1, 2]));

        assert!(view.previews.borrow().is_empty());
        assert!(controller.selected().is_none());
        assert_eq!(notifier.errors(), vec!["Please upload an image file."]);
    }

    #[test]
    fn non_image_keeps_previous_selection() {
        let (view, _api, _notifier, controller) = setup(Ok(blight()));

        controller.select(leaf("first.jpg"));
        controller.select(SelectedImage::new("clip.mp4", "video/mp4", vec![0]));

        assert_eq!(view.previews.borrow().len(), 1);
        assert_eq!(controller.selected().unwrap().file_name, "first.jpg");
    }

    #[test]
    fn new_selection_replaces_previous() {
        let (view, api, _notifier, controller) = setup(Ok(blight()));

        controller.select(leaf("first.jpg"));
        controller.select(leaf("second.jpg"));

        let previews = view.previews.borrow();
        assert_eq!(previews.len(), 2);
        assert_eq!(previews[1], leaf("second.jpg").preview_uri());
        assert_eq!(controller.selected().unwrap().file_name, "second.jpg");

        block_on(controller.detect());
        assert_eq!(*api.uploads.borrow(), vec!["second.jpg"]);
    }

    #[test]
    fn detect_without_image_reports_and_skips_upload() {
        let (view, api, notifier, controller) = setup(Ok(blight()));

        block_on(controller.detect());

        assert!(api.uploads.borrow().is_empty());
        assert!(view.busy.borrow().is_empty());
        assert_eq!(notifier.errors(), vec!["Please select an image first."]);
    }

    #[test]
    fn successful_detection_renders_payload_lists() {
        let (view, _api, notifier, controller) = setup(Ok(blight()));
        controller.select(leaf("leaf.jpg"));

        block_on(controller.detect());

        let shown = view.shown.borrow();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].name, "Early Blight");
        let treatments = shown[0].treatments.node().unwrap().find_all("li");
        assert_eq!(treatments.len(), 1);
        assert_eq!(treatments[0].text(), "Apply copper fungicide");
        assert_eq!(shown[0].prevention, ContainerFill::Text(NO_PREVENTION.to_string()));
        assert_eq!(*view.busy.borrow(), vec![true, false]);
        assert!(notifier.toasts.borrow().is_empty());
    }

    #[test]
    fn null_lists_in_the_diagnosis_render_fallbacks() {
        let reply: DiagnosisResult = serde_json::from_str(
            r#"{"diseaseName": "Leaf Rust", "description": "d",
                "treatments": null, "preventionTips": null}"#,
        )
        .unwrap();
        let (view, _api, notifier, controller) = setup(Ok(reply));
        controller.select(leaf("leaf.jpg"));

        block_on(controller.detect());

        let shown = view.shown.borrow();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].name, "Leaf Rust");
        assert_eq!(shown[0].treatments, ContainerFill::Text(NO_TREATMENTS.to_string()));
        assert_eq!(shown[0].prevention, ContainerFill::Text(NO_PREVENTION.to_string()));
        assert!(notifier.toasts.borrow().is_empty());
    }

    #[test]
    fn failed_detection_leaves_prior_results() {
        let (view, api, notifier, controller) = setup(Err(WorkflowError::DetectionFailed));
        controller.select(leaf("leaf.jpg"));

        block_on(controller.detect());

        assert_eq!(api.uploads.borrow().len(), 1);
        assert!(view.shown.borrow().is_empty());
        assert_eq!(notifier.errors(), vec!["Failed to detect disease. Please try again."]);
        assert_eq!(*view.busy.borrow(), vec![true, false]);
    }
}
