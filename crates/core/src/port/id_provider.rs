// ID Provider Port (for deterministic testing)

/// ID provider interface (allows deterministic IDs in tests)
pub trait IdProvider: Send + Sync {
    /// Generate a new unique message ID
    fn generate_id(&self) -> String;
}

/// Time+entropy provider (production)
///
/// Hex epoch-microseconds followed by a random 32-bit suffix. The timestamp
/// keeps ids sortable and collision-resistant across restarts; the entropy
/// covers concurrent submissions within the same microsecond.
pub struct ClockEntropyIdProvider;

impl IdProvider for ClockEntropyIdProvider {
    fn generate_id(&self) -> String {
        let micros = chrono::Utc::now().timestamp_micros();
        let entropy: u32 = rand::random();
        format!("{:x}{:08x}", micros, entropy)
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Sequential ids (seq-1, seq-2, ...) for deterministic tests
    pub struct SequentialIdProvider {
        counter: AtomicU64,
    }

    impl SequentialIdProvider {
        pub fn new() -> Self {
            Self {
                counter: AtomicU64::new(1),
            }
        }
    }

    impl Default for SequentialIdProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    impl IdProvider for SequentialIdProvider {
        fn generate_id(&self) -> String {
            format!("seq-{}", self.counter.fetch_add(1, Ordering::SeqCst))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_distinct() {
        let provider = ClockEntropyIdProvider;
        let ids: HashSet<String> = (0..1000).map(|_| provider.generate_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
