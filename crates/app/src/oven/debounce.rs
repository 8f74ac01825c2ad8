//! Debounced cook-time edits.
//!
//! An edit is shown immediately as a local override and written only after
//! a quiet period without further edits. At most one edit per cavity is
//! pending; a newer edit supersedes it and the superseded one never writes.

use std::sync::atomic::Ordering;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use sixthsense_domain::cavity::Cavity;
use sixthsense_domain::error::SixthSenseError;

use super::{Oven, lock};
use crate::ports::ApplianceTransport;

pub(super) struct PendingEdit {
    generation: u64,
    seconds: u32,
    task: JoinHandle<()>,
}

/// What became of a debounced edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The edit survived the quiet period and was written.
    Written,
    /// A newer edit or a cancellation replaced it before it was written.
    Superseded,
}

/// Completion handle of one debounced edit.
#[derive(Debug)]
pub struct CookTimeEdit {
    outcome: oneshot::Receiver<Result<(), SixthSenseError>>,
}

impl CookTimeEdit {
    /// Wait until the edit is written or superseded.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the deferred write fails.
    pub async fn outcome(self) -> Result<EditOutcome, SixthSenseError> {
        match self.outcome.await {
            Ok(Ok(())) => Ok(EditOutcome::Written),
            Ok(Err(err)) => Err(err),
            // The flush task was aborted or gave up its slot.
            Err(_) => Ok(EditOutcome::Superseded),
        }
    }
}

impl<T> Oven<T>
where
    T: ApplianceTransport + Send + Sync + 'static,
{
    /// Record a user edit of the cook duration and schedule its write.
    ///
    /// Must be called from within a tokio runtime.
    pub fn edit_cook_duration(&self, cavity: Cavity, seconds: u32) -> CookTimeEdit {
        let generation = self.inner.edit_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let quiet = self.inner.options.debounce_quiet;
        let (tx, rx) = oneshot::channel();

        // Hold the slot while spawning so the flush can never look before
        // its own registration.
        let mut edits = lock(&self.inner.edits);
        let oven = self.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            if !oven.claim_edit(cavity, generation) {
                return;
            }
            let result = oven.set_cook_duration(cavity, seconds).await;
            if let Err(err) = &result {
                tracing::warn!(%cavity, seconds, error = %err, "debounced cook time write failed");
            }
            let _ = tx.send(result);
        });

        let previous = edits[cavity].replace(PendingEdit {
            generation,
            seconds,
            task,
        });
        drop(edits);
        if let Some(previous) = previous {
            previous.task.abort();
            tracing::debug!(%cavity, superseded = previous.seconds, seconds, "cook time edit superseded");
        }
        CookTimeEdit { outcome: rx }
    }

    /// Take ownership of the pending slot if `generation` still holds it.
    /// Once claimed, a newer edit can no longer abort the write.
    fn claim_edit(&self, cavity: Cavity, generation: u64) -> bool {
        let mut edits = lock(&self.inner.edits);
        if edits[cavity]
            .as_ref()
            .is_some_and(|pending| pending.generation == generation)
        {
            edits[cavity] = None;
            true
        } else {
            false
        }
    }

    /// Drop the pending edit of `cavity` without writing it.
    /// Returns whether an edit was pending.
    pub fn cancel_cook_duration_edit(&self, cavity: Cavity) -> bool {
        let pending = lock(&self.inner.edits)[cavity].take();
        if let Some(pending) = pending {
            pending.task.abort();
            true
        } else {
            false
        }
    }

    /// Value of the pending edit, if any.
    #[must_use]
    pub fn pending_cook_duration(&self, cavity: Cavity) -> Option<u32> {
        lock(&self.inner.edits)[cavity]
            .as_ref()
            .map(|pending| pending.seconds)
    }

    /// Cook time to display: the pending edit while one exists, otherwise
    /// the reconciled prediction.
    #[must_use]
    pub fn displayed_cook_time(&self, cavity: Cavity) -> u32 {
        self.pending_cook_duration(cavity)
            .unwrap_or_else(|| self.cook_time(cavity))
    }
}
