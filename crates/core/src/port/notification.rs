// Notification Publisher Port (Interface)

use crate::domain::StateRecord;

/// Best-effort fan-out publish to whoever is subscribed on a topic.
///
/// Fire-and-forget by design: there is no error channel back to the caller,
/// no acknowledgment, and no buffering for subscribers that are not attached
/// at publish time. The call must never block on a slow subscriber.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, topic: &str, record: &StateRecord);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Records every publish for assertions
    pub struct CapturingPublisher {
        published: Mutex<Vec<(String, StateRecord)>>,
    }

    impl CapturingPublisher {
        pub fn new() -> Self {
            Self {
                published: Mutex::new(Vec::new()),
            }
        }

        pub fn published(&self) -> Vec<(String, StateRecord)> {
            self.published.lock().unwrap().clone()
        }
    }

    impl Default for CapturingPublisher {
        fn default() -> Self {
            Self::new()
        }
    }

    impl NotificationPublisher for CapturingPublisher {
        fn publish(&self, topic: &str, record: &StateRecord) {
            self.published
                .lock()
                .unwrap()
                .push((topic.to_string(), record.clone()));
        }
    }
}
