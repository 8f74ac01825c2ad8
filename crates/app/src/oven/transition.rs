//! Mode transitions and target-temperature changes.
//!
//! Switching a running cavity to another program goes through a cancel
//! first. The cancel makes the appliance forget its cook time, so the
//! prediction is preserved across it, the appliance is given time to
//! settle, and the captured time is re-sent once the new program runs.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use sixthsense_domain::cavity::{Cavity, CavityState};
use sixthsense_domain::cook::{CookMode, CookOperation, CookProgram};
use sixthsense_domain::error::SixthSenseError;

use super::{Oven, lock};
use crate::ports::ApplianceTransport;

/// How long to wait between the cancel of a transition and the next write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlePolicy {
    /// Sleep for a fixed delay.
    FixedDelay(Duration),
    /// Wait for the next attribute refresh, up to `timeout`.
    AwaitRefresh { timeout: Duration },
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self::FixedDelay(Duration::from_millis(500))
    }
}

/// Result of a program change.
#[derive(Debug)]
pub struct ProgramChange {
    /// A running program was cancelled before the new one was issued.
    pub transitioned: bool,
    /// Pending re-send of the captured cook time, if one was scheduled.
    pub restore: Option<JoinHandle<()>>,
}

impl<T> Oven<T>
where
    T: ApplianceTransport + Send + Sync + 'static,
{
    /// Program the cavity is considered to be running: the one last issued
    /// here, or the standard mode the appliance reports.
    fn current_program(&self, cavity: Cavity) -> Option<CookProgram> {
        lock(&self.inner.programs)[cavity].clone().or_else(|| {
            self.cook_mode(cavity)
                .filter(|mode| *mode != CookMode::Standby)
                .map(CookProgram::standard)
        })
    }

    /// Switch `cavity` to `program`, keeping the remaining cook time.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the cancel or of the program write.
    #[tracing::instrument(skip(self))]
    pub async fn change_program(
        &self,
        cavity: Cavity,
        program: CookProgram,
    ) -> Result<ProgramChange, SixthSenseError> {
        let captured = self.cook_time(cavity);
        let target_temp_c = self.target_temperature_or_default(cavity);
        let mut state = self.cavity_state(cavity);

        let running = state.is_some_and(CavityState::is_active);
        let transitioned = running && self.current_program(cavity).as_ref() != Some(&program);
        if transitioned {
            self.stop_and_settle(cavity).await?;
            state = Some(CavityState::Standby);
        }

        let cook_time = (captured > 0).then_some(captured);
        self.run_program(
            cavity,
            &program,
            target_temp_c,
            cook_time,
            CookOperation::for_state(state),
        )
        .await?;

        Ok(ProgramChange {
            transitioned,
            restore: self.schedule_restore(cavity, transitioned, captured),
        })
    }

    /// Re-issue the remembered program (Bake when none) at `target_temp_c`.
    ///
    /// Standard modes are modified in place. Other programs cannot be
    /// modified, so a running one is cancelled and restarted.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the cancel or of the program write.
    #[tracing::instrument(skip(self))]
    pub async fn set_target_temperature(
        &self,
        cavity: Cavity,
        target_temp_c: f64,
    ) -> Result<ProgramChange, SixthSenseError> {
        let program = self.last_program(cavity).unwrap_or_default();
        let captured = self.cook_time(cavity);
        let mut state = self.cavity_state(cavity);

        let transitioned =
            program.mode().is_none() && state.is_some_and(CavityState::is_active);
        if transitioned {
            self.stop_and_settle(cavity).await?;
            state = Some(CavityState::Standby);
        }

        let cook_time = (captured > 0).then_some(captured);
        self.run_program(
            cavity,
            &program,
            target_temp_c,
            cook_time,
            CookOperation::for_state(state),
        )
        .await?;

        Ok(ProgramChange {
            transitioned,
            restore: self.schedule_restore(cavity, transitioned, captured),
        })
    }

    async fn stop_and_settle(&self, cavity: Cavity) -> Result<(), SixthSenseError> {
        // Subscribe before the cancel so its acknowledgement cannot be missed.
        let ack = self.inner.store.refreshed();
        self.stop(cavity, false).await?;
        self.settle(ack).await;
        Ok(())
    }

    async fn settle(&self, mut ack: watch::Receiver<u64>) {
        match self.inner.options.settle {
            SettlePolicy::FixedDelay(delay) => tokio::time::sleep(delay).await,
            SettlePolicy::AwaitRefresh { timeout } => {
                if tokio::time::timeout(timeout, ack.changed()).await.is_err() {
                    tracing::debug!(?timeout, "no refresh before settle timeout");
                }
            }
        }
    }

    fn schedule_restore(
        &self,
        cavity: Cavity,
        transitioned: bool,
        seconds: u32,
    ) -> Option<JoinHandle<()>> {
        if !transitioned || seconds == 0 {
            return None;
        }
        let oven = self.clone();
        let delay = self.inner.options.timer_restore_delay;
        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(err) = oven.set_cook_duration(cavity, seconds).await {
                tracing::warn!(%cavity, seconds, error = %err, "failed to restore cook time");
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::oven::OvenOptions;
    use crate::oven::tests::{cooking_upper, fixture, fixture_with};
    use sixthsense_domain::attribute::AttributeMap;
    use sixthsense_domain::command::CookRequest;

    fn pairs<'a>(attrs: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
        attrs.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }

    fn op(write: &AttributeMap) -> Option<&str> {
        write.get("OvenUpperCavity_OpSetOperations")
    }

    #[tokio::test(start_paused = true)]
    async fn should_start_program_on_idle_cavity() {
        let f = fixture(&[("OvenUpperCavity_OpStatusState", "0")]);

        let change = f
            .oven
            .change_program(Cavity::Upper, CookProgram::standard(CookMode::ConvectBake))
            .await
            .unwrap();

        assert!(!change.transitioned);
        assert!(change.restore.is_none());
        let writes = f.transport.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(op(&writes[0]), Some("2"));
        assert_eq!(writes[0].get("OvenUpperCavity_CycleSetCommonMode"), Some("6"));
        assert_eq!(writes[0].get("OvenUpperCavity_CycleSetTargetTemp"), Some("1800"));
        assert_eq!(writes[0].get("OvenUpperCavity_TimeSetCookTimeSet"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn should_modify_when_same_program_already_runs() {
        let attrs = cooking_upper("600");
        let f = fixture(&pairs(&attrs));

        let change = f
            .oven
            .change_program(Cavity::Upper, CookProgram::standard(CookMode::Bake))
            .await
            .unwrap();

        assert!(!change.transitioned);
        let writes = f.transport.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(op(&writes[0]), Some("4"));
        assert_eq!(writes[0].get("OvenUpperCavity_TimeSetCookTimeSet"), Some("600"));
    }

    #[tokio::test(start_paused = true)]
    async fn should_cancel_settle_and_restore_when_switching_running_program() {
        let attrs = cooking_upper("600");
        let f = fixture(&pairs(&attrs));
        assert_eq!(f.oven.cook_time(Cavity::Upper), 600);
        f.clock.advance_secs(60);
        let started = tokio::time::Instant::now();

        let change = f
            .oven
            .change_program(Cavity::Upper, CookProgram::pizza())
            .await
            .unwrap();

        assert!(change.transitioned);
        assert!(started.elapsed() >= Duration::from_millis(500));
        let writes = f.transport.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(op(&writes[0]), Some("1"));
        assert_eq!(writes[1].get("OvenUpperCavity_CulinaryCtrSetId"), Some("454"));
        assert_eq!(writes[1].get("OvenUpperCavity_TimeSetCookTimeSet"), Some("540"));
        assert_eq!(op(&writes[1]), Some("2"));

        change.restore.unwrap().await.unwrap();
        let writes = f.transport.writes();
        assert_eq!(writes.len(), 3);
        assert_eq!(writes[2].get("OvenUpperCavity_TimeSetCookTimeSet"), Some("540"));
        assert_eq!(f.oven.last_program(Cavity::Upper), Some(CookProgram::pizza()));
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_restore_when_no_time_was_set() {
        let f = fixture(&[
            ("OvenUpperCavity_OpStatusState", "1"),
            ("OvenUpperCavity_CycleSetCommonMode", "2"),
        ]);

        let change = f
            .oven
            .change_program(Cavity::Upper, CookProgram::standard(CookMode::Broil))
            .await
            .unwrap();

        assert!(change.transitioned);
        assert!(change.restore.is_none());
        assert_eq!(f.transport.write_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_at_first_failed_write() {
        let attrs = cooking_upper("600");
        let f = fixture(&pairs(&attrs));
        f.transport.fail_writes(true);

        let result = f
            .oven
            .change_program(Cavity::Upper, CookProgram::multi_rack())
            .await;

        assert!(matches!(result, Err(SixthSenseError::Transport(_))));
        assert_eq!(f.oven.last_program(Cavity::Upper), None);
    }

    #[tokio::test(start_paused = true)]
    async fn should_settle_on_refresh_acknowledgement() {
        let attrs = cooking_upper("600");
        let options = OvenOptions {
            settle: SettlePolicy::AwaitRefresh {
                timeout: Duration::from_secs(2),
            },
            ..OvenOptions::default()
        };
        let f = fixture_with(&pairs(&attrs), options);
        let store = Arc::clone(&f.store);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            crate::ports::AttributeFeed::refresh(
                store.as_ref(),
                [("OvenUpperCavity_OpStatusState", "0")].into_iter().collect(),
            );
        });
        let started = tokio::time::Instant::now();

        let change = f
            .oven
            .change_program(Cavity::Upper, CookProgram::frozen_bake())
            .await
            .unwrap();

        assert!(change.transitioned);
        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(100));
        assert!(waited < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn should_give_up_waiting_after_settle_timeout() {
        let attrs = cooking_upper("600");
        let options = OvenOptions {
            settle: SettlePolicy::AwaitRefresh {
                timeout: Duration::from_secs(2),
            },
            ..OvenOptions::default()
        };
        let f = fixture_with(&pairs(&attrs), options);
        let started = tokio::time::Instant::now();

        f.oven
            .change_program(Cavity::Upper, CookProgram::frozen_bake())
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(f.transport.write_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn should_modify_standard_program_temperature_in_place() {
        let attrs = cooking_upper("600");
        let f = fixture(&pairs(&attrs));
        f.oven
            .start_cook(Cavity::Upper, CookRequest::new(CookMode::ConvectRoast, 190.0))
            .await
            .unwrap();

        let change = f
            .oven
            .set_target_temperature(Cavity::Upper, 210.0)
            .await
            .unwrap();

        assert!(!change.transitioned);
        let write = f.transport.last_write().unwrap();
        assert_eq!(write.get("OvenUpperCavity_CycleSetCommonMode"), Some("16"));
        assert_eq!(write.get("OvenUpperCavity_CycleSetTargetTemp"), Some("2100"));
        assert_eq!(op(&write), Some("4"));
    }

    #[tokio::test(start_paused = true)]
    async fn should_default_to_bake_when_no_program_remembered() {
        let f = fixture(&[("OvenUpperCavity_OpStatusState", "0")]);

        f.oven
            .set_target_temperature(Cavity::Upper, 165.0)
            .await
            .unwrap();

        let write = f.transport.last_write().unwrap();
        assert_eq!(write.get("OvenUpperCavity_CycleSetCommonMode"), Some("2"));
        assert_eq!(write.get("OvenUpperCavity_CycleSetTargetTemp"), Some("1650"));
        assert_eq!(op(&write), Some("2"));
    }

    #[tokio::test(start_paused = true)]
    async fn should_restart_running_custom_program_with_new_temperature() {
        let attrs = cooking_upper("600");
        let f = fixture(&pairs(&attrs));
        f.oven
            .start_multi_rack(Cavity::Upper, 180.0, 2, Some(600))
            .await
            .unwrap();

        let change = f
            .oven
            .set_target_temperature(Cavity::Upper, 200.0)
            .await
            .unwrap();

        assert!(change.transitioned);
        let writes = f.transport.writes();
        assert_eq!(writes.len(), 3);
        assert_eq!(op(&writes[1]), Some("1"));
        assert_eq!(writes[2].get("OvenUpperCavity_CycleSetMultiRackFood"), Some("2"));
        assert_eq!(writes[2].get("OvenUpperCavity_CycleSetTargetTemp"), Some("2000"));
        assert!(change.restore.is_some());
    }
}
