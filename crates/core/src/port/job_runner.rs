// Job Runner Port
// Abstraction for executing the unit of work behind a job

use crate::domain::Job;
use async_trait::async_trait;
use thiserror::Error;

/// Execution errors
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Work failed: {0}")]
    WorkFailed(String),

    #[error("Invalid job type: {0}")]
    InvalidJobType(i64),
}

/// Job Runner trait
///
/// Implementations:
/// - SimulatedJobRunner: fixed delay standing in for real work (production default)
/// - mocks::MockJobRunner / GatedJobRunner: deterministic test doubles
#[async_trait]
pub trait JobRunner: Send + Sync {
    /// Execute the unit of work for a job.
    ///
    /// # Errors
    /// - RunError::WorkFailed if the work itself fails
    async fn run(&self, job: &Job) -> Result<(), RunError>;
}

/// Simulated long-running work: a fixed async delay.
///
/// Stands in for the real backend operation; the duration is injected so the
/// dispatcher stays testable without wall-clock waits.
pub struct SimulatedJobRunner {
    work_duration: std::time::Duration,
}

impl SimulatedJobRunner {
    pub fn new(work_duration: std::time::Duration) -> Self {
        Self { work_duration }
    }
}

#[async_trait]
impl JobRunner for SimulatedJobRunner {
    async fn run(&self, job: &Job) -> Result<(), RunError> {
        tracing::debug!(job_id = %job.id, duration_ms = %self.work_duration.as_millis(), "Simulating work");
        tokio::time::sleep(self.work_duration).await;
        Ok(())
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock runner behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Complete instantly
        Success,
        /// Fail with message
        Fail(String),
        /// Panic with message (for panic isolation testing)
        Panic(String),
    }

    /// Mock Job Runner for testing
    pub struct MockJobRunner {
        behavior: MockBehavior,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockJobRunner {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn new_panic_inducing(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Panic(message.into()))
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl JobRunner for MockJobRunner {
        async fn run(&self, _job: &Job) -> Result<(), RunError> {
            *self.call_count.lock().unwrap() += 1;

            match &self.behavior {
                MockBehavior::Success => Ok(()),
                MockBehavior::Fail(msg) => Err(RunError::WorkFailed(msg.clone())),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for panic isolation testing
                }
            }
        }
    }

    /// Runner that holds every job until the gate is released.
    ///
    /// Lets tests pin a job in `in_progress` and complete it on demand,
    /// without real wall-clock waits. Releases are banked (semaphore
    /// permits), so releasing before the job reaches the gate still works.
    pub struct GatedJobRunner {
        gate: tokio::sync::Semaphore,
    }

    impl GatedJobRunner {
        pub fn new() -> Self {
            Self {
                gate: tokio::sync::Semaphore::new(0),
            }
        }

        /// Let one held job run to completion.
        pub fn release_one(&self) {
            self.gate.add_permits(1);
        }
    }

    impl Default for GatedJobRunner {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl JobRunner for GatedJobRunner {
        async fn run(&self, _job: &Job) -> Result<(), RunError> {
            let permit = self.gate.acquire().await.expect("gate closed");
            permit.forget();
            Ok(())
        }
    }
}
