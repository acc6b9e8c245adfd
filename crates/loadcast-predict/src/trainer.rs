//! Background training worker.
//!
//! Runs `ModelStore::train` on a dedicated OS thread fed by a bounded
//! queue, so prediction requests never wait on a refit. Jobs arriving at
//! a full queue are dropped; the next qualifying request refits from its
//! own window.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use loadcast_core::FeatureVector;
use loadcast_metrics::PipelineMetrics;
use loadcast_model::{ModelResult, ModelStore, TrainOutcome};

/// Completion channel for a submitted job.
pub type TrainingReceiver = oneshot::Receiver<ModelResult<TrainOutcome>>;

struct TrainingJob {
    features: Vec<FeatureVector>,
    targets: Vec<f64>,
    done: oneshot::Sender<ModelResult<TrainOutcome>>,
}

/// Handle to the training thread. Dropping it closes the queue; the
/// thread exits after finishing any queued jobs.
pub struct TrainingWorker {
    tx: mpsc::Sender<TrainingJob>,
    metrics: Arc<PipelineMetrics>,
    handle: JoinHandle<()>,
}

impl TrainingWorker {
    /// Start the worker thread with room for `capacity` pending jobs.
    pub fn spawn(
        store: ModelStore,
        metrics: Arc<PipelineMetrics>,
        capacity: usize,
    ) -> std::io::Result<Self> {
        let (tx, mut rx) = mpsc::channel::<TrainingJob>(capacity.max(1));
        let worker_metrics = Arc::clone(&metrics);

        let handle = thread::Builder::new()
            .name("loadcast-trainer".to_string())
            .spawn(move || {
                info!("training worker started");
                while let Some(job) = rx.blocking_recv() {
                    debug!(samples = job.targets.len(), "training job picked up");
                    let result = store.train(&job.features, &job.targets);
                    match &result {
                        Ok(outcome) => {
                            worker_metrics.record_training(outcome.persisted);
                            worker_metrics.set_model_ready(true);
                        }
                        Err(e) => {
                            worker_metrics.record_training_failure();
                            error!(error = %e, "background training failed");
                        }
                    }
                    // The submitter may not be waiting.
                    let _ = job.done.send(result);
                }
                info!("training worker stopped");
            })?;

        Ok(Self {
            tx,
            metrics,
            handle,
        })
    }

    /// Queue a training job. Returns `None` if the queue is full or the
    /// worker is gone; the job is dropped in that case.
    pub fn submit(
        &self,
        features: Vec<FeatureVector>,
        targets: Vec<f64>,
    ) -> Option<TrainingReceiver> {
        let (done, rx) = oneshot::channel();
        let job = TrainingJob {
            features,
            targets,
            done,
        };
        match self.tx.try_send(job) {
            Ok(()) => Some(rx),
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.metrics.record_dropped_job();
                warn!("training queue full, dropping job");
                None
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.metrics.record_dropped_job();
                error!("training worker is not running, dropping job");
                None
            }
        }
    }

    /// Close the queue and wait for the thread to drain it.
    pub fn shutdown(self) {
        drop(self.tx);
        if self.handle.join().is_err() {
            error!("training worker panicked");
        }
    }
}
