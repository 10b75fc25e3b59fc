//! User-facing notifications
//!
//! Mutations report success through an optional [`Notifier`]. Failures are
//! returned to the caller instead.

use tracing::info;

/// A short message for the end user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

impl Notice {
    /// Create a notice
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Fire-and-forget sink for notices
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

impl<F: Fn(Notice)> Notifier for F {
    fn notify(&self, notice: Notice) {
        self(notice)
    }
}

/// Notifier that writes notices to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        info!(title = %notice.title, "{}", notice.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_closure_notifier() {
        let seen = RefCell::new(Vec::new());
        let notifier = |notice: Notice| seen.borrow_mut().push(notice);

        notifier.notify(Notice::new("Saved", "Your page was saved"));
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].title, "Saved");
    }

    #[test]
    fn test_log_notifier_does_not_panic() {
        LogNotifier.notify(Notice::new("Saved", "ok"));
    }
}
