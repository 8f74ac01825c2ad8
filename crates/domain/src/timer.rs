//! Cook-timer reconciliation.
//!
//! The appliance reports the remaining cook time only at coarse intervals.
//! [`CookTimer`] keeps a local prediction that counts down between reports,
//! snaps to every new server value, and can be told to survive the cancel
//! that precedes a mode change (the appliance forgets the timer on cancel).

use crate::cavity::CavityState;
use crate::time::Timestamp;

/// Predicted timer state for one cavity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookTimer {
    desired_seconds: u32,
    server_seconds: u32,
    synced_at: Option<Timestamp>,
    preserved: bool,
}

impl CookTimer {
    /// Derive the remaining time to show for a server report.
    ///
    /// `server_seconds` is the reported cook time (0 when absent) and
    /// `state` the decoded cavity state (`None` when unknown).
    pub fn reconcile(
        &mut self,
        server_seconds: u32,
        state: Option<CavityState>,
        now: Timestamp,
    ) -> u32 {
        if server_seconds == 0 {
            if state != Some(CavityState::Standby) {
                // Cycle started but the appliance has not echoed the time yet.
                return self.desired_seconds;
            }
            if self.preserved {
                return self.desired_seconds;
            }
            self.desired_seconds = 0;
            self.server_seconds = 0;
            return 0;
        }

        if server_seconds != self.server_seconds {
            self.server_seconds = server_seconds;
            self.synced_at = Some(now);
        }

        if state.is_some_and(CavityState::is_active) {
            let elapsed = self
                .synced_at
                .map_or(0, |at| (now - at).num_seconds().max(0));
            let remaining = u32::try_from(
                (i64::from(server_seconds) - elapsed).max(0),
            )
            .unwrap_or(0);
            self.desired_seconds = remaining;
            return remaining;
        }

        server_seconds
    }

    /// Record a locally requested duration before the appliance confirms it.
    pub fn set_duration(&mut self, seconds: u32, now: Timestamp) {
        self.desired_seconds = seconds;
        self.server_seconds = seconds;
        self.synced_at = Some(now);
    }

    /// Forget everything; the next standby report reads as 0.
    pub fn reset(&mut self) {
        self.desired_seconds = 0;
        self.server_seconds = 0;
        self.preserved = false;
    }

    /// Keep the current prediction across the cancel of a mode change.
    pub fn preserve(&mut self) {
        self.preserved = true;
    }

    /// A new cycle write always starts from an explicit value.
    pub fn clear_preserved(&mut self) {
        self.preserved = false;
    }

    #[must_use]
    pub fn desired_seconds(&self) -> u32 {
        self.desired_seconds
    }

    #[must_use]
    pub fn is_preserved(&self) -> bool {
        self.preserved
    }
}
