//! Generic bounded worker pool driving the orchestrator's job phases.
//!
//! Jobs drain from a bounded channel across `workers` concurrent tasks. A
//! job handler may return zero or more follow-up jobs (a paginated
//! listing's next cursor, or the same job with its retry counter bumped);
//! a job is only considered "done" when it resolves with zero follow-ups.
//! A units-of-work counter starts at the initial job count and is
//! decremented only on those zero-follow-up completions; hitting zero
//! closes the channel, which drains the remaining idle workers.
//!
//! A handler error cancels the run: the first error wins, every worker
//! stops picking up new jobs, and `run_jobs` returns it once all workers
//! have exited.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::{Mutex, mpsc};

use crate::error::DownloaderError;

pub async fn run_jobs<J, H, Fut>(initial: Vec<J>, workers: usize, queue_capacity: usize, handler: H) -> Result<(), DownloaderError>
where
  J: Send + 'static,
  H: Fn(J) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<Vec<J>, DownloaderError>> + Send + 'static,
{
  if initial.is_empty() {
    return Ok(());
  }

  let (tx, rx) = mpsc::channel::<J>(queue_capacity.max(1));
  let rx = Arc::new(Mutex::new(rx));
  let tx_slot = Arc::new(Mutex::new(Some(tx)));
  let remaining = Arc::new(AtomicUsize::new(initial.len()));
  let cancelled = Arc::new(AtomicBool::new(false));
  let first_error: Arc<Mutex<Option<DownloaderError>>> = Arc::new(Mutex::new(None));
  let handler = Arc::new(handler);

  {
    let sender = tx_slot.lock().await.clone().expect("just created");
    for job in initial {
      if sender.send(job).await.is_err() {
        break;
      }
    }
  }

  let mut join_set = tokio::task::JoinSet::new();
  for _ in 0..workers.max(1) {
    let rx = rx.clone();
    let tx_slot = tx_slot.clone();
    let remaining = remaining.clone();
    let cancelled = cancelled.clone();
    let first_error = first_error.clone();
    let handler = handler.clone();

    join_set.spawn(async move {
      loop {
        if cancelled.load(Ordering::Acquire) {
          break;
        }

        let job = {
          let mut rx = rx.lock().await;
          rx.recv().await
        };
        let Some(job) = job else { break };

        match handler(job).await {
          Ok(follow_ups) if follow_ups.is_empty() => {
            let prev = remaining.fetch_sub(1, Ordering::AcqRel);
            if prev == 1 {
              tx_slot.lock().await.take();
              break;
            }
          }
          Ok(mut follow_ups) => {
            let follow_up = follow_ups.pop().expect("non-empty checked above");
            if let Some(sender) = tx_slot.lock().await.as_ref() {
              let _ = sender.send(follow_up).await;
            }
          }
          Err(err) => {
            cancelled.store(true, Ordering::Release);
            let mut slot = first_error.lock().await;
            if slot.is_none() {
              *slot = Some(err);
            }
            tx_slot.lock().await.take();
            break;
          }
        }
      }
    });
  }

  while join_set.join_next().await.is_some() {}

  if let Some(err) = first_error.lock().await.take() {
    return Err(err);
  }
  Ok(())
}
