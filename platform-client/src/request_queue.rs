use futures::future::BoxFuture;
use murmur_core::CoreError;
use std::future::Future;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};
use uuid::Uuid;

/// Jittered pause between consecutive platform writes, so a burst of
/// decided actions does not hit the platform as a burst of requests.
#[derive(Debug, Clone)]
pub struct WritePacing {
    pub min_gap: Duration,
    pub max_gap: Duration,
}

impl WritePacing {
    pub fn platform_default() -> Self {
        Self {
            min_gap: Duration::from_millis(1000),
            max_gap: Duration::from_millis(3000),
        }
    }

    pub fn none() -> Self {
        Self {
            min_gap: Duration::ZERO,
            max_gap: Duration::ZERO,
        }
    }

    fn draw(&self) -> Duration {
        let min = self.min_gap.as_millis() as u64;
        let max = self.max_gap.as_millis() as u64;
        if max <= min {
            return self.min_gap;
        }
        Duration::from_millis(fastrand::u64(min..=max))
    }
}

type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

struct QueuedWrite {
    ticket: Uuid,
    label: String,
    job: Job,
}

/// Serializes all write-side platform calls: strict enqueue order, one
/// in-flight operation at a time, per-operation timeout. A failing
/// operation resolves its caller with the error and never blocks the
/// operations queued behind it.
#[derive(Clone)]
pub struct WriteQueue {
    tx: mpsc::UnboundedSender<QueuedWrite>,
    op_timeout: Duration,
}

impl WriteQueue {
    pub fn start(pacing: WritePacing, op_timeout: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(rx, pacing));
        Self { tx, op_timeout }
    }

    /// Enqueue one write. Resolves when the operation has been dispatched
    /// and finished, in queue order.
    pub async fn submit<T, Fut>(&self, label: &str, operation: Fut) -> Result<T, CoreError>
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let op_timeout = self.op_timeout;
        let job_label = label.to_string();

        let job: Job = Box::new(move || {
            Box::pin(async move {
                let result = match timeout(op_timeout, operation).await {
                    Ok(result) => result,
                    Err(_) => Err(CoreError::Timeout {
                        seconds: op_timeout.as_secs(),
                    }),
                };
                if done_tx.send(result).is_err() {
                    debug!("Write result for {} dropped by caller", job_label);
                }
            })
        });

        let write = QueuedWrite {
            ticket: Uuid::new_v4(),
            label: label.to_string(),
            job,
        };
        debug!("Enqueued write {} ({})", write.ticket, write.label);

        self.tx.send(write).map_err(|_| CoreError::Internal {
            message: "write queue worker is gone".to_string(),
        })?;

        done_rx.await.map_err(|_| CoreError::Internal {
            message: "write operation dropped without a result".to_string(),
        })?
    }
}

async fn run_worker(mut rx: mpsc::UnboundedReceiver<QueuedWrite>, pacing: WritePacing) {
    let mut dispatched_any = false;
    while let Some(write) = rx.recv().await {
        if dispatched_any {
            let gap = pacing.draw();
            if !gap.is_zero() {
                debug!("Pacing next write by {:?}", gap);
                sleep(gap).await;
            }
        }
        dispatched_any = true;

        debug!("Dispatching write {} ({})", write.ticket, write.label);
        (write.job)().await;
    }
    warn!("Write queue channel closed, worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_writes_dispatch_in_enqueue_order() {
        let queue = WriteQueue::start(WritePacing::none(), Duration::from_secs(5));
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = order.clone();
            queue
                .submit(label, async move {
                    order.lock().unwrap().push(label);
                    Ok::<(), CoreError>(())
                })
                .await
                .unwrap();
        }

        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_failure_does_not_block_queue() {
        let queue = WriteQueue::start(WritePacing::none(), Duration::from_secs(5));

        let failed = queue
            .submit("failing", async {
                Err::<(), CoreError>(CoreError::Internal {
                    message: "boom".to_string(),
                })
            })
            .await;
        assert!(failed.is_err());

        let ok = queue.submit("after", async { Ok::<i32, CoreError>(7) }).await;
        assert_eq!(ok.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_slow_operation_times_out() {
        let queue = WriteQueue::start(WritePacing::none(), Duration::from_millis(20));

        let result = queue
            .submit("slow", async {
                sleep(Duration::from_secs(60)).await;
                Ok::<(), CoreError>(())
            })
            .await;

        match result {
            Err(CoreError::Timeout { .. }) => {}
            other => panic!("expected timeout, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_no_concurrent_inflight_writes() {
        let queue = WriteQueue::start(WritePacing::none(), Duration::from_secs(5));
        let in_flight = Arc::new(Mutex::new(0i32));
        let max_seen = Arc::new(Mutex::new(0i32));

        let mut handles = Vec::new();
        for i in 0..5 {
            let queue = queue.clone();
            let in_flight = in_flight.clone();
            let max_seen = max_seen.clone();
            handles.push(tokio::spawn(async move {
                queue
                    .submit("concurrent", async move {
                        {
                            let mut current = in_flight.lock().unwrap();
                            *current += 1;
                            let mut max = max_seen.lock().unwrap();
                            *max = (*max).max(*current);
                        }
                        sleep(Duration::from_millis(10)).await;
                        *in_flight.lock().unwrap() -= 1;
                        Ok::<i32, CoreError>(i)
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(*max_seen.lock().unwrap(), 1);
    }

    #[test]
    fn test_pacing_draw_within_bounds() {
        let pacing = WritePacing {
            min_gap: Duration::from_millis(100),
            max_gap: Duration::from_millis(200),
        };
        for _ in 0..50 {
            let gap = pacing.draw();
            assert!(gap >= pacing.min_gap && gap <= pacing.max_gap);
        }
    }
}
