//! # User Notifications
//!
//! Stores report failed user actions through a [`Notifier`]; the screen
//! layer decides how to show them (alert, toast, stderr line).
//!
//! ## When a Notice is Sent
//! ```text
//! ┌──────────────────────────────┬──────────────┬──────────────────────┐
//! │ Operation                    │ Logged       │ Notified             │
//! ├──────────────────────────────┼──────────────┼──────────────────────┤
//! │ initial load (background)    │ warn!        │ no                   │
//! │ refresh (pull-to-refresh)    │ warn!        │ yes                  │
//! │ add / update / delete        │ warn!        │ yes                  │
//! │ service-order status         │ warn!        │ yes                  │
//! └──────────────────────────────┴──────────────┴──────────────────────┘
//! ```

use serde::Serialize;
use tracing::warn;

use crate::error::StoreError;

/// A user-facing error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub title: String,
    pub message: String,
    /// Whether trying the same action again may work.
    pub retryable: bool,
}

impl Notice {
    /// Builds the error notice for a failed store operation.
    pub fn from_error(err: &StoreError) -> Self {
        Notice {
            title: "Error".to_string(),
            message: err.user_message(),
            retryable: err.is_retryable(),
        }
    }
}

/// Receives user-facing notices (implemented by the screen layer).
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        warn!(title = %notice.title, retryable = notice.retryable, "{}", notice.message);
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every notice for assertions.
    #[derive(Default)]
    pub struct RecordingNotifier {
        notices: Mutex<Vec<Notice>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn notices(&self) -> Vec<Notice> {
            self.notices.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: Notice) {
            self.notices.lock().unwrap().push(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;

    #[test]
    fn test_notice_from_error() {
        let err = StoreError::Remote {
            action: "delete the product".into(),
            source: GatewayError::Network("refused".into()),
        };
        let notice = Notice::from_error(&err);

        assert_eq!(notice.title, "Error");
        assert_eq!(notice.message, "Could not delete the product.");
        assert!(notice.retryable);
    }
}
