// Submit Use Case - the job submission gateway

use crate::domain::{derive_topic, DomainError, Job};
use crate::error::Result;
use crate::port::{IdProvider, JobQueue, StateStore, TimeProvider};
use std::sync::Arc;
use tracing::info;

/// What the caller gets back immediately: the id to poll on and the topic to
/// subscribe to. Processing has not started when this is returned.
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    pub message_id: String,
    pub topic: String,
}

/// Submission gateway: validates, persists the initial record, enqueues.
///
/// Returns synchronously without waiting on the dispatcher - this is the
/// defining asynchronous contract of the system.
pub struct SubmitService {
    store: Arc<dyn StateStore>,
    queue: Arc<dyn JobQueue>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    topic_base_url: String,
}

impl SubmitService {
    pub fn new(
        store: Arc<dyn StateStore>,
        queue: Arc<dyn JobQueue>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        topic_base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            queue,
            id_provider,
            time_provider,
            topic_base_url: topic_base_url.into(),
        }
    }

    /// Submit a new job.
    ///
    /// Side effects: one store write (state=requested), one queue enqueue.
    /// Nothing here blocks on downstream work.
    pub async fn submit(&self, job_type: i64) -> Result<SubmitReceipt> {
        if job_type <= 0 {
            return Err(DomainError::ValidationError(format!(
                "job type must be a positive integer, got {}",
                job_type
            ))
            .into());
        }

        let id = self.id_provider.generate_id();
        let created_at = self.time_provider.now_millis();
        let topic = derive_topic(&self.topic_base_url, &id);

        let job = Job::new(id.clone(), job_type, topic.clone(), created_at);

        // Persist the requested record before enqueueing, so a poll that races
        // the dispatcher always finds the job.
        self.store.put(&job.record()).await?;
        self.queue.enqueue(job)?;

        info!(message_id = %id, topic = %topic, job_type = %job_type, "Job submitted");

        Ok(SubmitReceipt {
            message_id: id,
            topic,
        })
    }
}
