//! Concurrent fan-out of identical fetches.
//!
//! Every dispatched fetch runs as its own Tokio task on a `JoinSet`. The join
//! is a barrier: all tasks are awaited before anything is reported, and each
//! result stays associated with the index of the task that produced it.
//! Dropping a dispatch future drops the `JoinSet`, which aborts every task
//! still running.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::task::JoinSet;

use super::ClientSession;
use crate::error_handling::{FailureStats, TaskFailure, WebClientError};
use crate::fetch::{FetchOutcome, Transport};
use crate::target::RequestTarget;

impl<T: Transport> ClientSession<T> {
    /// Fetches `target` `count` times concurrently and waits for all of them.
    ///
    /// A `count` of 0 or 1 is a single fetch on the current task.
    ///
    /// # Errors
    ///
    /// - the failing task's own error when exactly one task failed
    /// - `DispatchFailed` with every failure, ordered by task index, when
    ///   several did
    ///
    /// A task that panics counts as failed with `TaskFailed`.
    pub async fn dispatch(
        &self,
        target: &RequestTarget,
        count: usize,
    ) -> Result<(), WebClientError> {
        if count <= 1 {
            self.fetch(target).await?;
            return Ok(());
        }

        let stats = FailureStats::new();
        let mut failures: Vec<TaskFailure> = self
            .dispatch_collect(target, count)
            .await
            .into_iter()
            .filter_map(|(index, result)| {
                result.err().map(|error| TaskFailure { index, error })
            })
            .inspect(|failure| stats.increment(failure.error.kind()))
            .collect();

        if failures.is_empty() {
            return Ok(());
        }
        stats.log_summary(&format!("dispatch of {count} to {}", target.host()));
        if failures.len() == 1 {
            return Err(failures.remove(0).error);
        }
        Err(WebClientError::DispatchFailed {
            total: count,
            failures,
        })
    }

    /// Fetches `target` `count` times concurrently and returns every result,
    /// tagged with its task index and ordered by it.
    ///
    /// Never fails as a whole: per-task errors, panics included, are in the
    /// returned vector.
    pub async fn dispatch_collect(
        &self,
        target: &RequestTarget,
        count: usize,
    ) -> Vec<(usize, Result<FetchOutcome, WebClientError>)> {
        let mut tasks = JoinSet::new();
        for index in 0..count {
            self.log_progress(format_args!("Launching background task #{index}"));
            let session = self.clone();
            let target = target.clone();
            tasks.spawn(async move {
                let result = AssertUnwindSafe(session.fetch(&target))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| {
                        Err(WebClientError::TaskFailed {
                            index,
                            reason: panic_message(panic.as_ref()),
                        })
                    });
                (index, result)
            });
        }

        let mut slots: Vec<Option<Result<FetchOutcome, WebClientError>>> =
            (0..count).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => {
                    match &result {
                        Ok(outcome) => self.log_progress(format_args!(
                            "Background task #{index} got status {}",
                            outcome.status()
                        )),
                        Err(e) => log::warn!("Background task #{index} failed: {e}"),
                    }
                    slots[index] = Some(result);
                }
                // Panics are caught inside the task, so this is a runtime shutdown
                Err(e) => log::error!("Background task ended abnormally: {e}"),
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                let result = slot.unwrap_or_else(|| {
                    Err(WebClientError::TaskFailed {
                        index,
                        reason: "task was cancelled".to_string(),
                    })
                });
                (index, result)
            })
            .collect()
    }

    fn log_progress(&self, message: std::fmt::Arguments<'_>) {
        if self.options.verbose {
            log::info!("{message}");
        } else {
            log::debug!("{message}");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}
