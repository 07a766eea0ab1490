// Job Queue Port (Interface)

use crate::domain::Job;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Queue between the submission gateway and the dispatcher workers.
///
/// Each enqueued job is delivered to exactly one consumer; `enqueue` never
/// blocks on downstream work.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueue a job for asynchronous processing.
    ///
    /// Fails with `AppError::QueueClosed` once the queue has been closed.
    fn enqueue(&self, job: Job) -> Result<()>;

    /// Wait for the next job. Returns `None` once the queue is closed and
    /// drained.
    async fn consume(&self) -> Option<Job>;

    /// Close the queue: pending jobs are still consumed, new enqueues fail.
    fn close(&self);
}

/// In-process queue backed by an unbounded tokio channel.
///
/// The receiver sits behind an async mutex so an arbitrary number of workers
/// can share it; whichever worker holds the lock takes the next job. Closing
/// drops the sender half, so consumers drain the backlog and then see `None`.
pub struct InMemoryJobQueue {
    tx: std::sync::Mutex<Option<mpsc::UnboundedSender<Job>>>,
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Job>>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx: std::sync::Mutex::new(Some(tx)),
            rx: tokio::sync::Mutex::new(rx),
        }
    }
}

impl Default for InMemoryJobQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    fn enqueue(&self, job: Job) -> Result<()> {
        let guard = self.tx.lock().unwrap();
        match guard.as_ref() {
            Some(tx) => tx
                .send(job)
                .map_err(|e| AppError::QueueClosed(format!("enqueue of job {} failed", e.0.id))),
            None => Err(AppError::QueueClosed(format!(
                "enqueue of job {} after close",
                job.id
            ))),
        }
    }

    async fn consume(&self) -> Option<Job> {
        self.rx.lock().await.recv().await
    }

    fn close(&self) {
        self.tx.lock().unwrap().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Job;
    use std::sync::Arc;
    use tokio::task::JoinSet;

    #[tokio::test]
    async fn enqueued_job_is_consumed_once() {
        let queue = InMemoryJobQueue::new();
        queue.enqueue(Job::new_test(1)).unwrap();

        let job = queue.consume().await.expect("job should be delivered");
        assert_eq!(job.job_type, 1);
    }

    #[tokio::test]
    async fn each_job_goes_to_exactly_one_consumer() {
        let queue = Arc::new(InMemoryJobQueue::new());
        for _ in 0..20 {
            queue.enqueue(Job::new_test(1)).unwrap();
        }

        let mut tasks = JoinSet::new();
        for _ in 0..4 {
            let queue = Arc::clone(&queue);
            tasks.spawn(async move {
                let mut taken = Vec::new();
                while let Ok(Some(job)) =
                    tokio::time::timeout(std::time::Duration::from_millis(50), queue.consume())
                        .await
                {
                    taken.push(job.id);
                }
                taken
            });
        }

        let mut all = Vec::new();
        while let Some(result) = tasks.join_next().await {
            all.extend(result.unwrap());
        }

        all.sort();
        let before = all.len();
        all.dedup();
        assert_eq!(before, 20, "all jobs delivered");
        assert_eq!(all.len(), 20, "no job delivered twice");
    }

    #[tokio::test]
    async fn close_drains_backlog_then_stops() {
        let queue = InMemoryJobQueue::new();
        queue.enqueue(Job::new_test(1)).unwrap();
        queue.close();

        assert!(matches!(
            queue.enqueue(Job::new_test(1)),
            Err(AppError::QueueClosed(_))
        ));

        // Backlog is still delivered, then the queue reports closed.
        assert!(queue.consume().await.is_some());
        assert!(queue.consume().await.is_none());
    }
}
