// Dispatcher - asynchronous job execution loop

mod shutdown;

pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::domain::Job;
use crate::error::Result;
use crate::port::{JobQueue, JobRunner, NotificationPublisher, StateStore, TimeProvider};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Dispatcher worker: consumes jobs from the queue, drives them through
/// `in_progress` to a terminal state, and publishes the final record.
///
/// Any number of workers may share the same queue; each job is delivered to
/// exactly one of them, and distinct jobs touch disjoint store keys, so
/// workers never contend with each other.
pub struct Dispatcher {
    queue: Arc<dyn JobQueue>,
    store: Arc<dyn StateStore>,
    publisher: Arc<dyn NotificationPublisher>,
    runner: Arc<dyn JobRunner>,
    time_provider: Arc<dyn TimeProvider>,
}

impl Dispatcher {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        store: Arc<dyn StateStore>,
        publisher: Arc<dyn NotificationPublisher>,
        runner: Arc<dyn JobRunner>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            queue,
            store,
            publisher,
            runner,
            time_provider,
        }
    }

    /// Run the worker loop until the queue closes or shutdown is signalled.
    pub async fn run(&self, mut shutdown: ShutdownToken) -> Result<()> {
        info!("Dispatcher worker started");
        loop {
            tokio::select! {
                job = self.queue.consume() => {
                    match job {
                        Some(job) => {
                            let job_id = job.id.clone();
                            if let Err(e) = self.process_job(job).await {
                                error!(job_id = %job_id, error = %e, "Job processing failed");
                            }
                        }
                        None => {
                            info!("Job queue closed, dispatcher worker exiting");
                            break;
                        }
                    }
                }
                _ = shutdown.wait() => {
                    info!("Dispatcher worker shutting down");
                    break;
                }
            }
        }
        info!("Dispatcher worker stopped");
        Ok(())
    }

    /// Drive a single job through its lifecycle.
    ///
    /// State writes land in the store before the work runs and again after it
    /// finishes; the final record is published to the job's topic either way,
    /// so a live subscriber is never left waiting on a failed job.
    pub async fn process_job(&self, mut job: Job) -> Result<()> {
        let now = self.time_provider.now_millis();
        job.start(now)?;
        self.store.put(&job.record()).await?;

        info!(job_id = %job.id, job_type = %job.job_type, "Processing job");

        // Execute in a spawned task so a panicking runner cannot take the
        // worker loop down with it.
        let runner = Arc::clone(&self.runner);
        let work = {
            let job = job.clone();
            tokio::task::spawn(async move { runner.run(&job).await })
        };

        let outcome = work.await;
        let now = self.time_provider.now_millis();

        match outcome {
            Ok(Ok(())) => {
                job.complete(now)?;
                info!(job_id = %job.id, "Job completed");
            }
            Ok(Err(e)) => {
                warn!(job_id = %job.id, error = %e, "Job work failed");
                job.fail(now)?;
            }
            Err(join_err) => {
                if join_err.is_panic() {
                    error!(job_id = %job.id, "Job panicked: {:?}", join_err);
                } else {
                    error!(job_id = %job.id, "Job cancelled: {:?}", join_err);
                }
                job.fail(now)?;
            }
        }

        let record = job.record();
        self.store.put(&record).await?;

        // Best-effort: no subscriber attached means the notification is
        // dropped, and the dispatcher neither knows nor cares.
        self.publisher.publish(&job.topic, &record);

        Ok(())
    }
}
