// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod job_queue;
pub mod job_runner;
pub mod notification;
pub mod state_store;
pub mod time_provider;

// Re-exports
pub use id_provider::IdProvider;
pub use job_queue::{InMemoryJobQueue, JobQueue};
pub use job_runner::JobRunner;
pub use notification::NotificationPublisher;
pub use state_store::StateStore;
pub use time_provider::TimeProvider;
