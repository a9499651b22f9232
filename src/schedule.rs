//! Delayed refetches owned by the view.
//!
//! Each scheduled job is a `smol::Task`; dropping a task cancels it, so
//! dropping the scheduler (view teardown) cancels every pending refetch.

use std::time::Duration;

use smol::Task;

use crate::balance::RefetchHandle;

pub struct RefetchScheduler {
    delay: Duration,
    tasks: Vec<Task<()>>,
}

impl RefetchScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            tasks: Vec::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Trigger `handle.refetch()` once, after the configured delay.
    pub fn schedule(&mut self, handle: RefetchHandle) {
        self.schedule_with(move || handle.refetch());
    }

    pub fn schedule_with<F>(&mut self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.tasks.retain(|task| !task.is_finished());
        let delay = self.delay;
        self.tasks.push(smol::spawn(async move {
            smol::Timer::after(delay).await;
            job();
        }));
    }

    /// Jobs scheduled but not yet run.
    pub fn pending(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_finished()).count()
    }

    pub fn cancel_all(&mut self) {
        let cancelled = self.pending();
        self.tasks.clear();
        if cancelled > 0 {
            log::debug!("[Bank] cancelled {} pending refetch(es)", cancelled);
        }
    }
}

impl Drop for RefetchScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
