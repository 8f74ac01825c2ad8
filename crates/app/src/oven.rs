//! Oven facade: the public operation set for one appliance.
//!
//! Reads go to the [`AttributeStore`]; writes are built by
//! [`sixthsense_domain::command`] and handed to the [`ApplianceTransport`].
//! Per-cavity timer prediction, the last requested program and pending
//! debounced edits live here, one slot per [`Cavity`].

mod debounce;
mod kitchen_timer;
mod transition;

use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use sixthsense_domain::appliance::ApplianceInfo;
use sixthsense_domain::attribute::AttributeMap;
use sixthsense_domain::attribute::codec::decode_tenths;
use sixthsense_domain::attribute::keys::{
    CONTROL_LOCK, CavityAttr, DISPLAY_BRIGHTNESS, SABBATH_MODE, cavity_key,
};
use sixthsense_domain::cavity::{Cavity, CavityState, CookTimeState, PerCavity};
use sixthsense_domain::command::{self, CookRequest};
use sixthsense_domain::cook::{
    CookMode, CookOperation, CookProgram, CulinaryOptions, DEFAULT_TARGET_TEMP_C,
};
use sixthsense_domain::error::SixthSenseError;
use sixthsense_domain::id::TimerId;
use sixthsense_domain::time::{Clock, SystemClock};
use sixthsense_domain::timer::CookTimer;

use crate::attribute_store::AttributeStore;
use crate::notify::Subscription;
use crate::ports::ApplianceTransport;

pub use debounce::{CookTimeEdit, EditOutcome};
pub use kitchen_timer::KitchenTimer;
pub use transition::{ProgramChange, SettlePolicy};

/// Timing knobs for edits and mode transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OvenOptions {
    /// Quiet period before a debounced cook-time edit is written.
    pub debounce_quiet: Duration,
    /// How to wait for the appliance after cancelling for a mode change.
    pub settle: SettlePolicy,
    /// Delay before the captured cook time is re-sent after a mode change.
    pub timer_restore_delay: Duration,
}

impl Default for OvenOptions {
    fn default() -> Self {
        Self {
            debounce_quiet: Duration::from_secs(4),
            settle: SettlePolicy::default(),
            timer_restore_delay: Duration::from_millis(2_500),
        }
    }
}

struct Inner<T> {
    info: ApplianceInfo,
    store: Arc<AttributeStore>,
    transport: T,
    clock: Arc<dyn Clock>,
    options: OvenOptions,
    timers: Mutex<PerCavity<CookTimer>>,
    programs: Mutex<PerCavity<Option<CookProgram>>>,
    edits: Mutex<PerCavity<Option<debounce::PendingEdit>>>,
    edit_generation: AtomicU64,
}

/// Typed view and command surface of one multi-cavity oven.
///
/// Cloning is cheap and every clone drives the same appliance state.
pub struct Oven<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Oven<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: ApplianceTransport> Oven<T> {
    /// Oven with default options and the system clock.
    #[must_use]
    pub fn new(info: ApplianceInfo, store: Arc<AttributeStore>, transport: T) -> Self {
        Self::with_options(
            info,
            store,
            transport,
            OvenOptions::default(),
            Arc::new(SystemClock),
        )
    }

    #[must_use]
    pub fn with_options(
        info: ApplianceInfo,
        store: Arc<AttributeStore>,
        transport: T,
        options: OvenOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                info,
                store,
                transport,
                clock,
                options,
                timers: Mutex::default(),
                programs: Mutex::default(),
                edits: Mutex::default(),
                edit_generation: AtomicU64::new(0),
            }),
        }
    }

    #[must_use]
    pub fn info(&self) -> &ApplianceInfo {
        &self.inner.info
    }

    #[must_use]
    pub fn store(&self) -> &Arc<AttributeStore> {
        &self.inner.store
    }

    #[must_use]
    pub fn options(&self) -> &OvenOptions {
        &self.inner.options
    }

    /// Register a callback fired after every attribute refresh.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&AttributeMap) + Send + Sync + 'static,
    {
        self.inner.store.subscribe(callback)
    }

    // -- reads ---------------------------------------------------------------

    /// Current cavity temperature in °C.
    ///
    /// The raw internal sensor wins when it reports a positive value;
    /// otherwise the display temperature is used.
    #[must_use]
    pub fn temperature(&self, cavity: Cavity) -> Option<f64> {
        let store = &self.inner.store;
        store
            .get_int(&cavity_key(cavity, CavityAttr::RawTemp))
            .filter(|raw| *raw > 0)
            .and_then(decode_tenths)
            .or_else(|| store.get_tenths(&cavity_key(cavity, CavityAttr::DisplayTemp)))
    }

    #[must_use]
    pub fn target_temperature(&self, cavity: Cavity) -> Option<f64> {
        self.inner
            .store
            .get_tenths(&cavity_key(cavity, CavityAttr::TargetTemp))
    }

    /// Target temperature, or 180 °C when the cavity reports none.
    #[must_use]
    pub fn target_temperature_or_default(&self, cavity: Cavity) -> f64 {
        self.target_temperature(cavity)
            .unwrap_or(DEFAULT_TARGET_TEMP_C)
    }

    #[must_use]
    pub fn cavity_state(&self, cavity: Cavity) -> Option<CavityState> {
        self.inner
            .store
            .get_coded(&cavity_key(cavity, CavityAttr::State))
    }

    /// Whether the cavity is physically present. Unknown state reads as absent.
    #[must_use]
    pub fn cavity_exists(&self, cavity: Cavity) -> bool {
        self.cavity_state(cavity)
            .is_some_and(|state| state != CavityState::NotPresent)
    }

    #[must_use]
    pub fn cook_mode(&self, cavity: Cavity) -> Option<CookMode> {
        self.inner
            .store
            .get_coded(&cavity_key(cavity, CavityAttr::CookMode))
    }

    #[must_use]
    pub fn cook_time_state(&self, cavity: Cavity) -> CookTimeState {
        CookTimeState::from_raw(
            self.inner
                .store
                .get_int(&cavity_key(cavity, CavityAttr::CookTimeState)),
        )
    }

    #[must_use]
    pub fn light(&self, cavity: Cavity) -> bool {
        self.flag(&cavity_key(cavity, CavityAttr::Light))
    }

    #[must_use]
    pub fn door_open(&self, cavity: Cavity) -> bool {
        self.flag(&cavity_key(cavity, CavityAttr::DoorOpen))
    }

    #[must_use]
    pub fn meat_probe_plugged_in(&self, cavity: Cavity) -> bool {
        self.flag(&cavity_key(cavity, CavityAttr::MeatProbePluggedIn))
    }

    #[must_use]
    pub fn control_locked(&self) -> bool {
        self.flag(CONTROL_LOCK)
    }

    #[must_use]
    pub fn sabbath_mode(&self) -> bool {
        self.flag(SABBATH_MODE)
    }

    /// Display brightness in percent.
    #[must_use]
    pub fn display_brightness(&self) -> Option<u8> {
        self.inner
            .store
            .get_int(DISPLAY_BRIGHTNESS)
            .and_then(|pct| u8::try_from(pct).ok())
    }

    fn flag(&self, key: &str) -> bool {
        self.inner.store.get_bool(key).unwrap_or(false)
    }

    /// Remaining cook time in seconds, smoothed between server reports.
    #[must_use]
    pub fn cook_time(&self, cavity: Cavity) -> u32 {
        let server_seconds = self
            .inner
            .store
            .get_int(&cavity_key(cavity, CavityAttr::CookTime))
            .map_or(0, |secs| u32::try_from(secs).unwrap_or(0));
        let state = self.cavity_state(cavity);
        let now = self.inner.clock.now();
        lock(&self.inner.timers)[cavity].reconcile(server_seconds, state, now)
    }

    /// Program last requested on `cavity` through this facade.
    #[must_use]
    pub fn last_program(&self, cavity: Cavity) -> Option<CookProgram> {
        lock(&self.inner.programs)[cavity].clone()
    }

    /// Addressable kitchen timer `id`.
    #[must_use]
    pub fn kitchen_timer(&self, id: TimerId) -> KitchenTimer<'_, T> {
        KitchenTimer::new(self, id)
    }

    // -- writes --------------------------------------------------------------

    async fn write(&self, attrs: AttributeMap) -> Result<(), SixthSenseError> {
        tracing::debug!(
            said = %self.inner.info.said,
            attributes = attrs.len(),
            "writing attributes"
        );
        self.inner.transport.write_attributes(attrs).await
    }

    fn begin_program(&self, cavity: Cavity, program: CookProgram) {
        lock(&self.inner.timers)[cavity].clear_preserved();
        lock(&self.inner.programs)[cavity] = Some(program);
    }

    /// Start or modify a standard cook mode.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the write fails.
    #[tracing::instrument(skip(self, request), fields(mode = ?request.mode))]
    pub async fn start_cook(
        &self,
        cavity: Cavity,
        request: CookRequest,
    ) -> Result<(), SixthSenseError> {
        self.begin_program(cavity, CookProgram::standard(request.mode));
        tracing::info!(%cavity, mode = ?request.mode, operation = ?request.operation, "starting cook");
        self.write(command::cook(cavity, &request)).await
    }

    /// Start a frozen-food bake.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the write fails.
    pub async fn start_frozen_bake(
        &self,
        cavity: Cavity,
        target_temp_c: f64,
        food_type: u32,
        cook_time: Option<u32>,
    ) -> Result<(), SixthSenseError> {
        self.begin_program(cavity, CookProgram::FrozenBake { food_type });
        self.write(command::frozen_bake(cavity, target_temp_c, food_type, cook_time))
            .await
    }

    /// Start a multi-rack ("cook 4") cycle.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the write fails.
    pub async fn start_multi_rack(
        &self,
        cavity: Cavity,
        target_temp_c: f64,
        food_type: u32,
        cook_time: Option<u32>,
    ) -> Result<(), SixthSenseError> {
        self.begin_program(cavity, CookProgram::MultiRack { food_type });
        self.write(command::multi_rack(cavity, target_temp_c, food_type, cook_time))
            .await
    }

    /// Start a vendor culinary cycle.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the write fails.
    pub async fn start_culinary_cycle(
        &self,
        cavity: Cavity,
        cycle_id: u32,
        target_temp_c: Option<f64>,
        cook_time: Option<u32>,
        options: CulinaryOptions,
    ) -> Result<(), SixthSenseError> {
        let attrs = command::culinary_cycle(cavity, cycle_id, target_temp_c, cook_time, &options);
        self.begin_program(cavity, CookProgram::Culinary { cycle_id, options });
        self.write(attrs).await
    }

    async fn run_program(
        &self,
        cavity: Cavity,
        program: &CookProgram,
        target_temp_c: f64,
        cook_time: Option<u32>,
        operation: CookOperation,
    ) -> Result<(), SixthSenseError> {
        self.begin_program(cavity, program.clone());
        tracing::info!(%cavity, ?program, ?operation, target_temp_c, "running program");
        self.write(command::program(
            cavity,
            program,
            target_temp_c,
            cook_time,
            operation,
        ))
        .await
    }

    /// Cancel the running cycle.
    ///
    /// With `reset_timer` the predicted cook time is discarded; without it
    /// the current prediction survives the standby report that follows.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the write fails.
    #[tracing::instrument(skip(self))]
    pub async fn stop(&self, cavity: Cavity, reset_timer: bool) -> Result<(), SixthSenseError> {
        if reset_timer {
            lock(&self.inner.timers)[cavity].reset();
        } else {
            let predicted = self.cook_time(cavity);
            lock(&self.inner.timers)[cavity].preserve();
            tracing::debug!(%cavity, predicted, "preserving cook time across stop");
        }
        tracing::info!(%cavity, reset_timer, "stopping cook");
        self.write(command::cancel(cavity)).await
    }

    /// Set the cook duration. The prediction is updated before the write
    /// and is not rolled back if the write fails.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the write fails.
    #[tracing::instrument(skip(self))]
    pub async fn set_cook_duration(
        &self,
        cavity: Cavity,
        seconds: u32,
    ) -> Result<(), SixthSenseError> {
        let state = self.cavity_state(cavity);
        let now = self.inner.clock.now();
        lock(&self.inner.timers)[cavity].set_duration(seconds, now);
        self.write(command::cook_duration(cavity, seconds, state))
            .await
    }

    /// Shift the cook time by `minutes` (negative shortens), floored at 0.
    /// Returns the duration that was written.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the write fails.
    pub async fn adjust_cook_time(
        &self,
        cavity: Cavity,
        minutes: i64,
    ) -> Result<u32, SixthSenseError> {
        let current = i64::from(self.cook_time(cavity));
        let adjusted = current.saturating_add(minutes.saturating_mul(60)).max(0);
        let seconds = u32::try_from(adjusted).unwrap_or(u32::MAX);
        self.set_cook_duration(cavity, seconds).await?;
        Ok(seconds)
    }

    /// # Errors
    ///
    /// Returns the transport error when the write fails.
    pub async fn set_light(&self, cavity: Cavity, on: bool) -> Result<(), SixthSenseError> {
        self.write(command::light(cavity, on)).await
    }

    /// # Errors
    ///
    /// Returns the transport error when the write fails.
    pub async fn set_control_lock(&self, on: bool) -> Result<(), SixthSenseError> {
        self.write(command::control_lock(on)).await
    }

    /// # Errors
    ///
    /// Returns the transport error when the write fails.
    pub async fn set_sabbath_mode(&self, on: bool) -> Result<(), SixthSenseError> {
        self.write(command::sabbath_mode(on)).await
    }

    /// Set display brightness; values above 100 are clamped.
    ///
    /// # Errors
    ///
    /// Returns the transport error when the write fails.
    pub async fn set_display_brightness(&self, percent: u8) -> Result<(), SixthSenseError> {
        self.write(command::display_brightness(percent.min(100)))
            .await
    }
}
