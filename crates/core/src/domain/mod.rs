// Domain Layer - Entities and domain errors

pub mod error;
pub mod job;

pub use error::DomainError;
pub use job::{derive_topic, Job, JobId, JobState, StateRecord, Topic};
