use crate::error::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Success,
}

impl Severity {
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Success => "success",
        }
    }
}

/// Shows transient toasts. Every call produces an independent toast; there
/// is no queue and no deduplication.
pub trait Notifier {
    fn notify(&self, severity: Severity, message: &str);

    fn error(&self, message: &str) {
        self.notify(Severity::Error, message);
    }

    fn success(&self, message: &str) {
        self.notify(Severity::Success, message);
    }

    fn report(&self, err: &WorkflowError) {
        self.error(&err.to_string());
    }
}

/// Class attribute of a toast element in the given state.
pub fn toast_class(severity: Severity, visible: bool) -> String {
    if visible {
        format!("toast {} show", severity.class_name())
    } else {
        format!("toast {}", severity.class_name())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingNotifier;
    use super::*;

    #[test]
    fn toast_classes() {
        assert_eq!(toast_class(Severity::Error, false), "toast error");
        assert_eq!(toast_class(Severity::Success, true), "toast success show");
    }

    #[test]
    fn each_call_is_its_own_toast() {
        let notifier = RecordingNotifier::default();
        notifier.error("boom");
        notifier.error("boom");
        notifier.report(&WorkflowError::NotAnImage);
        notifier.success("done");

        assert_eq!(
            notifier.errors(),
            vec!["boom", "boom", "Please upload an image file."]
        );
        assert_eq!(notifier.successes(), vec!["done"]);
    }
}
