//! Background worker plumbing: cooperative cancellation and single-task slots.
//!
//! Tagging runs and bulk edits execute on blocking worker threads. At most one
//! task per slot runs at a time; a second request is rejected with
//! [`PipelineError::Busy`] instead of being queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{PipelineError, PipelineResult};

/// Shared cancellation flag, polled between units of work.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder of this flag to stop at its next check.
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clear a previous stop request so the flag can be reused.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Busy flag admitting one task at a time.
#[derive(Debug, Clone)]
pub struct TaskSlot {
    name: &'static str,
    busy: Arc<AtomicBool>,
}

/// Claim on a [`TaskSlot`]; the slot is released when this is dropped.
#[derive(Debug)]
pub struct TaskGuard {
    busy: Arc<AtomicBool>,
}

impl TaskSlot {
    /// Create a slot; `name` appears in the `Busy` error.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Claim the slot, failing if another task holds it.
    pub fn try_claim(&self) -> PipelineResult<TaskGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PipelineError::Busy { task: self.name })?;
        Ok(TaskGuard {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run `work` on the blocking thread pool while holding the slot.
    ///
    /// The slot is claimed before spawning, so a busy slot fails fast
    /// without starting any work.
    pub async fn run_blocking<T, F>(&self, work: F) -> PipelineResult<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let guard = self.try_claim()?;
        let task = self.name;
        tracing::debug!("Starting {task} worker");
        let result = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            work()
        })
        .await
        .map_err(|e| PipelineError::Worker {
            task,
            message: e.to_string(),
        });
        tracing::debug!("{task} worker finished");
        result
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_flag_shared_between_clones() {
        let flag = StopFlag::new();
        let other = flag.clone();
        assert!(!other.is_stopped());

        flag.request_stop();
        assert!(other.is_stopped());

        other.reset();
        assert!(!flag.is_stopped());
    }

    #[test]
    fn test_slot_rejects_second_claim() {
        let slot = TaskSlot::new("tagging");
        let guard = slot.try_claim().unwrap();
        assert!(slot.is_busy());

        let err = slot.try_claim().unwrap_err();
        assert!(matches!(err, PipelineError::Busy { task: "tagging" }));

        drop(guard);
        assert!(!slot.is_busy());
        assert!(slot.try_claim().is_ok());
    }

    #[tokio::test]
    async fn test_run_blocking_returns_value_and_releases() {
        let slot = TaskSlot::new("bulk edit");
        let value = slot.run_blocking(|| 21 * 2).await.unwrap();
        assert_eq!(value, 42);
        assert!(!slot.is_busy());
    }

    #[tokio::test]
    async fn test_run_blocking_rejects_while_busy() {
        let slot = TaskSlot::new("bulk edit");
        let _held = slot.try_claim().unwrap();
        let result = slot.run_blocking(|| ()).await;
        assert!(matches!(result, Err(PipelineError::Busy { .. })));
    }

    #[tokio::test]
    async fn test_run_blocking_reports_panic() {
        let slot = TaskSlot::new("tagging");
        let result = slot.run_blocking(|| -> u32 { panic!("boom") }).await;
        assert!(matches!(result, Err(PipelineError::Worker { task: "tagging", .. })));
        assert!(!slot.is_busy());
    }
}
