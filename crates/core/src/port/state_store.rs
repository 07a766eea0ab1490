// State Store Port (Interface)

use crate::domain::{JobId, StateRecord};
use crate::error::Result;
use async_trait::async_trait;

/// Durable keyed storage mapping a job id to its latest status record.
///
/// `put` is an idempotent overwrite; the store holds at most one record per
/// id. Per-key atomicity is the only requirement: a single writer per key
/// (the owning worker) with arbitrary concurrent readers must never observe
/// a partial record.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Insert or overwrite the record for its id
    async fn put(&self, record: &StateRecord) -> Result<()>;

    /// Find record by id
    async fn get(&self, id: &JobId) -> Result<Option<StateRecord>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// HashMap-backed store for unit tests
    pub struct InMemoryStateStore {
        records: Mutex<HashMap<JobId, StateRecord>>,
    }

    impl InMemoryStateStore {
        pub fn new() -> Self {
            Self {
                records: Mutex::new(HashMap::new()),
            }
        }
    }

    impl Default for InMemoryStateStore {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl StateStore for InMemoryStateStore {
        async fn put(&self, record: &StateRecord) -> Result<()> {
            self.records
                .lock()
                .unwrap()
                .insert(record.message_id.clone(), record.clone());
            Ok(())
        }

        async fn get(&self, id: &JobId) -> Result<Option<StateRecord>> {
            Ok(self.records.lock().unwrap().get(id).cloned())
        }
    }
}
