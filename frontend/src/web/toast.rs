use gloo_timers::callback::Timeout;

use super::web_document;
use crate::config::ToastTiming;
use crate::notify::{Notifier, Severity, toast_class};

/// Appends a toast `div` to `body`, fades it in, and removes it after the
/// configured lifetime.
pub struct DomNotifier {
    timing: ToastTiming,
}

impl DomNotifier {
    pub fn new(timing: ToastTiming) -> Self {
        Self { timing }
    }
}

impl Notifier for DomNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        let Some(doc) = web_document() else {
            return;
        };
        let Some(body) = doc.body() else {
            return;
        };
        let Ok(toast) = doc.create_element("div") else {
            return;
        };
        toast.set_class_name(&toast_class(severity, false));
        toast.set_text_content(Some(message));
        if body.append_child(&toast).is_err() {
            return;
        }

        let shown = toast.clone();
        Timeout::new(self.timing.show_delay_ms, move || {
            let _ = shown.class_list().add_1("show");
        })
        .forget();

        let fade_ms = self.timing.fade_ms;
        Timeout::new(self.timing.visible_ms, move || {
            let _ = toast.class_list().remove_1("show");
            Timeout::new(fade_ms, move || toast.remove()).forget();
        })
        .forget();
    }
}
