// Job Domain Model

use serde::{Deserialize, Serialize};

/// Job ID (time+entropy hex string, globally unique for the store's lifetime)
pub type JobId = String;

/// Topic on which a job's completion notification is published (1:1 with the job)
pub type Topic = String;

/// Job State
///
/// `Requested -> InProgress -> Done` is the happy path; `Failed` is the
/// alternate terminal state, reachable only from `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Requested,
    InProgress,
    Done,
    Failed,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Requested => write!(f, "requested"),
            JobState::InProgress => write!(f, "in_progress"),
            JobState::Done => write!(f, "done"),
            JobState::Failed => write!(f, "failed"),
        }
    }
}

impl JobState {
    /// Parse the persisted string form back into a state.
    pub fn parse(s: &str) -> Option<JobState> {
        match s {
            "requested" => Some(JobState::Requested),
            "in_progress" => Some(JobState::InProgress),
            "done" => Some(JobState::Done),
            "failed" => Some(JobState::Failed),
            _ => None,
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Failed)
    }
}

/// Persisted snapshot of a job at a point in time.
///
/// The wire/storage shape is `{"messageId": ..., "type": ..., "state": ...}`;
/// the store holds at most one record per id, always the most recent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    #[serde(rename = "messageId")]
    pub message_id: JobId,

    #[serde(rename = "type")]
    pub job_type: i64,

    pub state: JobState,
}

/// Derive the notification topic for a job id.
///
/// The base URL embeds the id in a dereferenceable topic string; an empty
/// base yields the bare id.
pub fn derive_topic(base_url: &str, id: &str) -> Topic {
    format!("{}{}", base_url, id)
}

/// Job Entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub job_type: i64,
    pub state: JobState,
    pub topic: Topic,

    pub created_at: i64, // epoch ms
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,
}

impl Job {
    /// Create a new Job in the `Requested` state.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (injected, not generated)
    /// * `job_type` - Caller-supplied job type
    /// * `topic` - Notification topic derived from the id
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    pub fn new(
        id: impl Into<String>,
        job_type: i64,
        topic: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            job_type,
            state: JobState::Requested,
            topic: topic.into(),
            created_at,
            started_at: None,
            finished_at: None,
        }
    }

    /// Create a test job with deterministic ID and timestamp.
    ///
    /// Uses a simple counter for deterministic test IDs (test-1, test-2, ...).
    /// Timestamps start at 1000 and increment by 1000.
    ///
    /// **Note**: This method should only be used in tests. For production code,
    /// always inject ID and time via providers.
    pub fn new_test(job_type: i64) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let id = format!("test-{}", counter);
        let created_at = (counter * 1000) as i64;
        let topic = id.clone();

        Self::new(id, job_type, topic, created_at)
    }

    /// Snapshot the job's current state as the record to persist/publish.
    pub fn record(&self) -> StateRecord {
        StateRecord {
            message_id: self.id.clone(),
            job_type: self.job_type,
            state: self.state,
        }
    }

    /// Transition to InProgress with explicit timestamp
    pub fn start(&mut self, now_millis: i64) -> crate::domain::error::Result<()> {
        if self.state != JobState::Requested {
            return Err(crate::domain::error::DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: JobState::InProgress.to_string(),
            });
        }
        self.state = JobState::InProgress;
        self.started_at = Some(now_millis);
        Ok(())
    }

    /// Transition to Done with explicit timestamp
    pub fn complete(&mut self, now_millis: i64) -> crate::domain::error::Result<()> {
        if self.state != JobState::InProgress {
            return Err(crate::domain::error::DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: JobState::Done.to_string(),
            });
        }
        self.state = JobState::Done;
        self.finished_at = Some(now_millis);
        Ok(())
    }

    /// Transition to Failed with explicit timestamp
    ///
    /// Failed is reachable only from InProgress: a job must have been picked
    /// up before it can fail.
    pub fn fail(&mut self, now_millis: i64) -> crate::domain::error::Result<()> {
        if self.state != JobState::InProgress {
            return Err(crate::domain::error::DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: JobState::Failed.to_string(),
            });
        }
        self.state = JobState::Failed;
        self.finished_at = Some(now_millis);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;

    #[test]
    fn happy_path_transitions_are_monotonic() {
        let mut job = Job::new_test(1);
        assert_eq!(job.state, JobState::Requested);

        job.start(100).unwrap();
        assert_eq!(job.state, JobState::InProgress);
        assert_eq!(job.started_at, Some(100));

        job.complete(200).unwrap();
        assert_eq!(job.state, JobState::Done);
        assert_eq!(job.finished_at, Some(200));
    }

    #[test]
    fn done_is_not_reachable_from_requested() {
        let mut job = Job::new_test(1);
        let err = job.complete(100).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidStateTransition { .. }
        ));
        assert_eq!(job.state, JobState::Requested);
    }

    #[test]
    fn terminal_states_reject_further_transitions() {
        let mut job = Job::new_test(1);
        job.start(100).unwrap();
        job.complete(200).unwrap();

        assert!(job.start(300).is_err());
        assert!(job.fail(300).is_err());
        assert_eq!(job.state, JobState::Done);
    }

    #[test]
    fn failed_only_from_in_progress() {
        let mut job = Job::new_test(1);
        assert!(job.fail(100).is_err());

        job.start(100).unwrap();
        job.fail(200).unwrap();
        assert_eq!(job.state, JobState::Failed);
        assert!(job.state.is_terminal());
    }

    #[test]
    fn state_order_matches_lifecycle() {
        assert!(JobState::Requested < JobState::InProgress);
        assert!(JobState::InProgress < JobState::Done);
    }

    #[test]
    fn record_serializes_with_external_field_names() {
        let mut job = Job::new_test(7);
        job.start(100).unwrap();

        let json = serde_json::to_value(job.record()).unwrap();
        assert_eq!(json["messageId"], job.id);
        assert_eq!(json["type"], 7);
        assert_eq!(json["state"], "in_progress");
    }

    #[test]
    fn state_roundtrips_through_string_form() {
        for state in [
            JobState::Requested,
            JobState::InProgress,
            JobState::Done,
            JobState::Failed,
        ] {
            assert_eq!(JobState::parse(&state.to_string()), Some(state));
        }
        assert_eq!(JobState::parse("bogus"), None);
    }

    #[test]
    fn topic_embeds_id_in_base_url() {
        assert_eq!(derive_topic("", "abc123"), "abc123");
        assert_eq!(
            derive_topic("http://localhost:9630/read/", "abc123"),
            "http://localhost:9630/read/abc123"
        );
    }
}
