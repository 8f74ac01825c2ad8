//! Kitchen timers: addressable countdowns with no client-side prediction.

use sixthsense_domain::attribute::keys::{KitchenTimerAttr, kitchen_timer_key};
use sixthsense_domain::command;
use sixthsense_domain::error::SixthSenseError;
use sixthsense_domain::id::TimerId;
use sixthsense_domain::kitchen_timer::KitchenTimerState;

use super::Oven;
use crate::ports::ApplianceTransport;

/// Handle to kitchen timer `id` of an [`Oven`].
pub struct KitchenTimer<'a, T> {
    oven: &'a Oven<T>,
    id: TimerId,
}

impl<'a, T: ApplianceTransport> KitchenTimer<'a, T> {
    pub(super) fn new(oven: &'a Oven<T>, id: TimerId) -> Self {
        Self { oven, id }
    }

    #[must_use]
    pub fn id(&self) -> TimerId {
        self.id
    }

    fn seconds(&self, attr: KitchenTimerAttr) -> Option<u32> {
        self.oven
            .inner
            .store
            .get_int(&kitchen_timer_key(self.id, attr))
            .and_then(|secs| u32::try_from(secs).ok())
    }

    /// Duration the timer was started with.
    #[must_use]
    pub fn total_seconds(&self) -> Option<u32> {
        self.seconds(KitchenTimerAttr::SetTime)
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> Option<u32> {
        self.seconds(KitchenTimerAttr::TimeRemaining)
    }

    #[must_use]
    pub fn state(&self) -> Option<KitchenTimerState> {
        self.oven
            .inner
            .store
            .get_coded(&kitchen_timer_key(self.id, KitchenTimerAttr::State))
    }

    /// # Errors
    ///
    /// Returns the transport error when the write fails.
    pub async fn start(&self, seconds: u32) -> Result<(), SixthSenseError> {
        tracing::info!(timer = %self.id, seconds, "starting kitchen timer");
        self.oven
            .write(command::kitchen_timer_start(self.id, seconds))
            .await
    }

    /// # Errors
    ///
    /// Returns the transport error when the write fails.
    pub async fn cancel(&self) -> Result<(), SixthSenseError> {
        tracing::info!(timer = %self.id, "cancelling kitchen timer");
        self.oven
            .write(command::kitchen_timer_cancel(self.id))
            .await
    }
}
