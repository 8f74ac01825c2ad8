//! Appliance-side state machine of the virtual oven.
//!
//! Holds the attribute map the appliance would report and mutates it in
//! response to written commands and elapsed simulated time. Remaining times
//! are tracked exactly but only published every report interval.

use std::collections::BTreeMap;
use std::time::Duration;

use sixthsense_domain::attribute::AttributeMap;
use sixthsense_domain::attribute::codec::encode_tenths;
use sixthsense_domain::attribute::keys::{
    CONTROL_LOCK, CavityAttr, DISPLAY_BRIGHTNESS, KitchenTimerAttr, SABBATH_MODE, cavity_key,
    kitchen_timer_key,
};
use sixthsense_domain::cavity::{Cavity, CavityState, PerCavity};
use sixthsense_domain::code::WireCode;
use sixthsense_domain::cook::{CookOperation, DEFAULT_TARGET_TEMP_C};
use sixthsense_domain::id::TimerId;
use sixthsense_domain::kitchen_timer::{KitchenTimerOperation, KitchenTimerState};

use crate::config::VirtualOvenConfig;
use crate::error::VirtualError;

const COOK_TIME_IDLE: &str = "0";
const COOK_TIME_RUNNING: &str = "1";
const COOK_TIME_COMPLETED: &str = "3";

#[derive(Debug, Default)]
struct CavitySim {
    temp_c: f64,
    remaining: Option<Duration>,
}

#[derive(Debug)]
pub(crate) struct Simulation {
    config: VirtualOvenConfig,
    attrs: AttributeMap,
    cavities: PerCavity<CavitySim>,
    kitchen_timers: BTreeMap<TimerId, Duration>,
    since_report: Duration,
}

fn seconds_ceil(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

impl Simulation {
    pub(crate) fn new(config: VirtualOvenConfig) -> Self {
        let mut sim = Self {
            cavities: PerCavity::new(
                CavitySim {
                    temp_c: config.ambient_temp_c,
                    remaining: None,
                },
                CavitySim {
                    temp_c: config.ambient_temp_c,
                    remaining: None,
                },
            ),
            config,
            attrs: AttributeMap::new(),
            kitchen_timers: BTreeMap::new(),
            since_report: Duration::ZERO,
        };
        sim.seed();
        sim
    }

    fn seed(&mut self) {
        for cavity in Cavity::ALL {
            if !self.present(cavity) {
                self.set(cavity, CavityAttr::State, CavityState::NotPresent.code());
                continue;
            }
            self.reset_cycle(cavity);
            let temp = encode_tenths(self.cavities[cavity].temp_c);
            self.set(cavity, CavityAttr::RawTemp, temp.clone());
            self.set(cavity, CavityAttr::DisplayTemp, temp);
            self.set(cavity, CavityAttr::Light, "0");
            self.set(cavity, CavityAttr::DoorOpen, "0");
            self.set(cavity, CavityAttr::MeatProbePluggedIn, "0");
        }
        self.attrs.insert(CONTROL_LOCK, "0");
        self.attrs.insert(SABBATH_MODE, "0");
        self.attrs.insert(DISPLAY_BRIGHTNESS, "80");
        self.set_timer(TimerId::FIRST, KitchenTimerAttr::State, KitchenTimerState::Standby.code());
        self.set_timer(TimerId::FIRST, KitchenTimerAttr::TimeRemaining, "0");
        self.set_timer(TimerId::FIRST, KitchenTimerAttr::SetTime, "0");
    }

    /// Overlay externally captured attributes on the seeded state.
    pub(crate) fn load(&mut self, snapshot: AttributeMap) {
        self.attrs.merge(snapshot);
    }

    pub(crate) fn attributes(&self) -> &AttributeMap {
        &self.attrs
    }

    pub(crate) fn state(&self, cavity: Cavity) -> Option<CavityState> {
        self.attrs.get_coded(&cavity_key(cavity, CavityAttr::State)).ok()
    }

    fn present(&self, cavity: Cavity) -> bool {
        cavity == Cavity::Upper || self.config.lower_cavity
    }

    fn active(&self, cavity: Cavity) -> bool {
        self.state(cavity).is_some_and(CavityState::is_active)
    }

    fn set(&mut self, cavity: Cavity, attr: CavityAttr, value: impl Into<String>) {
        self.attrs.insert(cavity_key(cavity, attr), value);
    }

    fn set_timer(&mut self, timer: TimerId, attr: KitchenTimerAttr, value: impl Into<String>) {
        self.attrs.insert(kitchen_timer_key(timer, attr), value);
    }

    fn int(&self, key: &str) -> Option<u64> {
        self.attrs
            .get_int(key)
            .ok()
            .flatten()
            .and_then(|value| u64::try_from(value).ok())
    }

    /// Apply a written attribute diff. Nothing changes when the write is
    /// rejected.
    pub(crate) fn apply(&mut self, write: &AttributeMap) -> Result<(), VirtualError> {
        let mut operations = Vec::new();
        for cavity in Cavity::ALL {
            if !write.iter().any(|(key, _)| key.starts_with(cavity.prefix())) {
                continue;
            }
            if !self.present(cavity) {
                return Err(VirtualError::CavityNotPresent(cavity));
            }
            let operation = write
                .get(&cavity_key(cavity, CavityAttr::Operation))
                .map(CookOperation::from_code)
                .transpose()
                .map_err(VirtualError::Protocol)?;
            if operation == Some(CookOperation::Modify) && !self.active(cavity) {
                return Err(VirtualError::ModifyIdle(cavity));
            }
            operations.push((cavity, operation));
        }
        let timer_operations = kitchen_timer_operations(write)?;

        for (key, value) in write.iter() {
            if !is_command_key(key) {
                self.attrs.insert(key, value);
            }
        }

        let cook_time_written = |cavity| write.contains_key(&cavity_key(cavity, CavityAttr::CookTime));
        for (cavity, operation) in operations {
            match operation {
                Some(CookOperation::Start) => self.start(cavity),
                Some(CookOperation::Cancel) => self.reset_cycle(cavity),
                Some(CookOperation::Modify) => self.retime(cavity),
                Some(CookOperation::Pause) => {
                    tracing::debug!(%cavity, "pause is not simulated");
                }
                None if cook_time_written(cavity) && self.active(cavity) => self.retime(cavity),
                None => {}
            }
        }

        for (timer, operation) in timer_operations {
            match operation {
                KitchenTimerOperation::Start => self.start_timer(timer),
                KitchenTimerOperation::Cancel => self.stop_timer(timer, KitchenTimerState::Standby),
            }
        }
        Ok(())
    }

    fn start(&mut self, cavity: Cavity) {
        let target_key = cavity_key(cavity, CavityAttr::TargetTemp);
        if self.int(&target_key).unwrap_or(0) == 0 {
            self.attrs.insert(target_key, encode_tenths(DEFAULT_TARGET_TEMP_C));
        }
        self.set(cavity, CavityAttr::State, CavityState::Preheating.code());
        self.retime(cavity);
        tracing::debug!(%cavity, "virtual cavity started");
    }

    /// Pick up the written cook time as the new exact remaining time.
    fn retime(&mut self, cavity: Cavity) {
        let seconds = self.int(&cavity_key(cavity, CavityAttr::CookTime)).unwrap_or(0);
        let remaining = (seconds > 0).then(|| Duration::from_secs(seconds));
        self.cavities[cavity].remaining = remaining;
        let cook_time_state = if remaining.is_some() {
            COOK_TIME_RUNNING
        } else {
            COOK_TIME_IDLE
        };
        self.set(cavity, CavityAttr::CookTimeState, cook_time_state);
    }

    fn reset_cycle(&mut self, cavity: Cavity) {
        self.cavities[cavity].remaining = None;
        self.set(cavity, CavityAttr::State, CavityState::Standby.code());
        self.set(cavity, CavityAttr::CookMode, "0");
        self.set(cavity, CavityAttr::TargetTemp, "0");
        self.set(cavity, CavityAttr::CookTime, "0");
        self.set(cavity, CavityAttr::CookTimeState, COOK_TIME_IDLE);
    }

    fn start_timer(&mut self, timer: TimerId) {
        let seconds = self
            .int(&kitchen_timer_key(timer, KitchenTimerAttr::SetTime))
            .unwrap_or(0);
        self.kitchen_timers.insert(timer, Duration::from_secs(seconds));
        self.set_timer(timer, KitchenTimerAttr::State, KitchenTimerState::Running.code());
        self.set_timer(timer, KitchenTimerAttr::TimeRemaining, seconds.to_string());
    }

    fn stop_timer(&mut self, timer: TimerId, state: KitchenTimerState) {
        self.kitchen_timers.remove(&timer);
        self.set_timer(timer, KitchenTimerAttr::State, state.code());
        self.set_timer(timer, KitchenTimerAttr::TimeRemaining, "0");
    }

    /// Let `elapsed` of simulated time pass.
    pub(crate) fn advance(&mut self, elapsed: Duration) {
        for cavity in Cavity::ALL {
            if self.present(cavity) {
                self.advance_cavity(cavity, elapsed);
            }
        }

        let mut finished = Vec::new();
        for (timer, remaining) in &mut self.kitchen_timers {
            *remaining = remaining.saturating_sub(elapsed);
            if remaining.is_zero() {
                finished.push(*timer);
            }
        }
        for timer in finished {
            tracing::debug!(%timer, "virtual kitchen timer completed");
            self.stop_timer(timer, KitchenTimerState::Completed);
        }

        self.since_report += elapsed;
        if self.since_report >= Duration::from_secs(u64::from(self.config.report_interval_secs)) {
            self.since_report = Duration::ZERO;
            self.publish_remaining();
        }
    }

    fn advance_cavity(&mut self, cavity: Cavity, elapsed: Duration) {
        let active = self.active(cavity);
        #[allow(clippy::cast_precision_loss)]
        let target = if active {
            self.int(&cavity_key(cavity, CavityAttr::TargetTemp))
                .map_or(self.config.ambient_temp_c, |tenths| tenths as f64 / 10.0)
        } else {
            self.config.ambient_temp_c
        };

        let step = self.config.heat_rate_c_per_min * elapsed.as_secs_f64() / 60.0;
        let sim = &mut self.cavities[cavity];
        sim.temp_c = if sim.temp_c < target {
            (sim.temp_c + step).min(target)
        } else {
            (sim.temp_c - step).max(target)
        };
        let reached = sim.temp_c >= target;
        let remaining = sim.remaining.map(|left| left.saturating_sub(elapsed));
        sim.remaining = remaining;

        let temp = encode_tenths(self.cavities[cavity].temp_c);
        self.set(cavity, CavityAttr::RawTemp, temp.clone());
        self.set(cavity, CavityAttr::DisplayTemp, temp);

        if !active {
            return;
        }
        if reached && self.state(cavity) == Some(CavityState::Preheating) {
            self.set(cavity, CavityAttr::State, CavityState::Cooking.code());
            tracing::debug!(%cavity, "virtual cavity reached target temperature");
        }
        if remaining.is_some_and(|left| left.is_zero()) {
            self.reset_cycle(cavity);
            self.set(cavity, CavityAttr::CookTimeState, COOK_TIME_COMPLETED);
            tracing::debug!(%cavity, "virtual cook cycle completed");
        }
    }

    fn publish_remaining(&mut self) {
        for cavity in Cavity::ALL {
            if let Some(left) = self.cavities[cavity].remaining {
                self.set(cavity, CavityAttr::CookTime, seconds_ceil(left).to_string());
            }
        }
        let timers: Vec<(TimerId, Duration)> = self
            .kitchen_timers
            .iter()
            .map(|(timer, left)| (*timer, *left))
            .collect();
        for (timer, left) in timers {
            self.set_timer(timer, KitchenTimerAttr::TimeRemaining, seconds_ceil(left).to_string());
        }
    }
}

fn is_command_key(key: &str) -> bool {
    key.ends_with(CavityAttr::Operation.postfix())
        || key.ends_with(KitchenTimerAttr::Operation.postfix())
}

/// Kitchen-timer verbs contained in `write`, keyed by timer.
fn kitchen_timer_operations(
    write: &AttributeMap,
) -> Result<Vec<(TimerId, KitchenTimerOperation)>, VirtualError> {
    let suffix = format!("_{}", KitchenTimerAttr::Operation.postfix());
    let mut operations = Vec::new();
    for (key, value) in write.iter() {
        let Some(id) = key
            .strip_prefix("KitchenTimer")
            .and_then(|rest| rest.strip_suffix(suffix.as_str()))
        else {
            continue;
        };
        let Some(timer) = id.parse().ok().and_then(|id| TimerId::new(id).ok()) else {
            tracing::warn!(key, "ignoring command for malformed kitchen timer id");
            continue;
        };
        let operation = KitchenTimerOperation::from_code(value).map_err(VirtualError::Protocol)?;
        operations.push((timer, operation));
    }
    Ok(operations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sixthsense_domain::command::{self, CookRequest};
    use sixthsense_domain::cook::{CookMode, CulinaryOptions};

    fn sim() -> Simulation {
        Simulation::new(VirtualOvenConfig::default())
    }

    fn get<'a>(sim: &'a Simulation, cavity: Cavity, attr: CavityAttr) -> Option<&'a str> {
        sim.attributes().get(&cavity_key(cavity, attr))
    }

    #[test]
    fn should_seed_idle_cavities() {
        let sim = sim();
        assert_eq!(sim.state(Cavity::Upper), Some(CavityState::Standby));
        assert_eq!(sim.state(Cavity::Lower), Some(CavityState::Standby));
        assert_eq!(get(&sim, Cavity::Upper, CavityAttr::RawTemp), Some("210"));
        assert_eq!(sim.attributes().get(CONTROL_LOCK), Some("0"));
    }

    #[test]
    fn should_report_missing_lower_cavity() {
        let sim = Simulation::new(VirtualOvenConfig {
            lower_cavity: false,
            ..VirtualOvenConfig::default()
        });
        assert_eq!(sim.state(Cavity::Lower), Some(CavityState::NotPresent));
        assert_eq!(get(&sim, Cavity::Lower, CavityAttr::RawTemp), None);
    }

    #[test]
    fn should_reject_commands_for_missing_cavity() {
        let mut sim = Simulation::new(VirtualOvenConfig {
            lower_cavity: false,
            ..VirtualOvenConfig::default()
        });
        let result = sim.apply(&command::light(Cavity::Lower, true));
        assert!(matches!(result, Err(VirtualError::CavityNotPresent(Cavity::Lower))));
    }

    #[test]
    fn should_preheat_then_cook_after_start() {
        let mut sim = sim();
        sim.apply(&command::cook(
            Cavity::Upper,
            &CookRequest::new(CookMode::Bake, 180.0).cook_time(1_800),
        ))
        .unwrap();
        assert_eq!(sim.state(Cavity::Upper), Some(CavityState::Preheating));
        assert_eq!(get(&sim, Cavity::Upper, CavityAttr::CookTimeState), Some("1"));
        assert_eq!(get(&sim, Cavity::Upper, CavityAttr::Operation), None);

        // 159 °C to climb at 15 °C/min.
        sim.advance(Duration::from_secs(11 * 60));
        assert_eq!(sim.state(Cavity::Upper), Some(CavityState::Cooking));
        assert_eq!(get(&sim, Cavity::Upper, CavityAttr::RawTemp), Some("1800"));
    }

    #[test]
    fn should_publish_remaining_time_only_every_report_interval() {
        let mut sim = sim();
        sim.apply(&command::cook(
            Cavity::Upper,
            &CookRequest::new(CookMode::Bake, 180.0).cook_time(600),
        ))
        .unwrap();

        sim.advance(Duration::from_secs(30));
        assert_eq!(get(&sim, Cavity::Upper, CavityAttr::CookTime), Some("600"));
        sim.advance(Duration::from_secs(30));
        assert_eq!(get(&sim, Cavity::Upper, CavityAttr::CookTime), Some("540"));
    }

    #[test]
    fn should_complete_cycle_when_time_runs_out() {
        let mut sim = sim();
        sim.apply(&command::cook(
            Cavity::Upper,
            &CookRequest::new(CookMode::Bake, 180.0).cook_time(60),
        ))
        .unwrap();

        sim.advance(Duration::from_secs(60));

        assert_eq!(sim.state(Cavity::Upper), Some(CavityState::Standby));
        assert_eq!(get(&sim, Cavity::Upper, CavityAttr::CookTimeState), Some("3"));
        assert_eq!(get(&sim, Cavity::Upper, CavityAttr::CookTime), Some("0"));
    }

    #[test]
    fn should_forget_cook_time_on_cancel() {
        let mut sim = sim();
        sim.apply(&command::cook(
            Cavity::Upper,
            &CookRequest::new(CookMode::Broil, 250.0).cook_time(900),
        ))
        .unwrap();
        sim.apply(&command::cancel(Cavity::Upper)).unwrap();

        assert_eq!(sim.state(Cavity::Upper), Some(CavityState::Standby));
        assert_eq!(get(&sim, Cavity::Upper, CavityAttr::CookTime), Some("0"));
        assert_eq!(get(&sim, Cavity::Upper, CavityAttr::TargetTemp), Some("0"));
    }

    #[test]
    fn should_reject_modify_on_idle_cavity() {
        let mut sim = sim();
        let write = command::cook(
            Cavity::Upper,
            &CookRequest::new(CookMode::Bake, 180.0).operation(CookOperation::Modify),
        );
        assert!(matches!(
            sim.apply(&write),
            Err(VirtualError::ModifyIdle(Cavity::Upper))
        ));
        assert_eq!(get(&sim, Cavity::Upper, CavityAttr::CookMode), Some("0"));
    }

    #[test]
    fn should_retime_running_cycle() {
        let mut sim = sim();
        sim.apply(&command::cook(
            Cavity::Upper,
            &CookRequest::new(CookMode::Bake, 180.0),
        ))
        .unwrap();
        sim.apply(&command::cook_duration(
            Cavity::Upper,
            120,
            Some(CavityState::Preheating),
        ))
        .unwrap();

        sim.advance(Duration::from_secs(120));
        assert_eq!(get(&sim, Cavity::Upper, CavityAttr::CookTimeState), Some("3"));
    }

    #[test]
    fn should_default_target_for_culinary_cycle_without_temperature() {
        let mut sim = sim();
        sim.apply(&command::culinary_cycle(
            Cavity::Upper,
            454,
            None,
            None,
            &CulinaryOptions::default(),
        ))
        .unwrap();
        assert_eq!(get(&sim, Cavity::Upper, CavityAttr::TargetTemp), Some("1800"));
        assert_eq!(get(&sim, Cavity::Upper, CavityAttr::CulinaryId), Some("454"));
    }

    #[test]
    fn should_run_kitchen_timer() {
        let mut sim = sim();
        sim.apply(&command::kitchen_timer_start(TimerId::FIRST, 90)).unwrap();
        let key = kitchen_timer_key(TimerId::FIRST, KitchenTimerAttr::State);
        assert_eq!(sim.attributes().get(&key), Some("1"));

        sim.advance(Duration::from_secs(90));
        assert_eq!(sim.attributes().get(&key), Some("3"));
    }

    #[test]
    fn should_cancel_kitchen_timer() {
        let mut sim = sim();
        let timer = TimerId::new(2).unwrap();
        sim.apply(&command::kitchen_timer_start(timer, 300)).unwrap();
        sim.apply(&command::kitchen_timer_cancel(timer)).unwrap();

        let state = kitchen_timer_key(timer, KitchenTimerAttr::State);
        let remaining = kitchen_timer_key(timer, KitchenTimerAttr::TimeRemaining);
        assert_eq!(sim.attributes().get(&state), Some("0"));
        assert_eq!(sim.attributes().get(&remaining), Some("0"));
    }

    #[test]
    fn should_reject_unknown_operation_code() {
        let mut sim = sim();
        let write: AttributeMap = [("OvenUpperCavity_OpSetOperations", "9")].into_iter().collect();
        assert!(matches!(sim.apply(&write), Err(VirtualError::Protocol(_))));
    }

    #[test]
    fn should_cool_idle_cavity_to_ambient() {
        let mut sim = sim();
        sim.load([("OvenUpperCavity_OpStatusRawTemp", "500")].into_iter().collect());
        sim.cavities[Cavity::Upper].temp_c = 50.0;

        sim.advance(Duration::from_secs(10 * 60));

        assert_eq!(get(&sim, Cavity::Upper, CavityAttr::RawTemp), Some("210"));
    }
}
