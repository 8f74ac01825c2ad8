//! Command payloads: the attribute diffs written for each operation.
//!
//! Every function returns the complete map for one write. Nothing here
//! touches timer state; the facade pairs each payload with the matching
//! timer bookkeeping.

use crate::attribute::AttributeMap;
use crate::attribute::codec::{encode_bool, encode_tenths};
use crate::attribute::keys::{
    CONTROL_LOCK, CavityAttr, DISPLAY_BRIGHTNESS, KitchenTimerAttr, SABBATH_MODE, cavity_key,
    kitchen_timer_key,
};
use crate::cavity::{Cavity, CavityState};
use crate::code::WireCode;
use crate::cook::{CookMode, CookOperation, CookProgram, CulinaryOptions};
use crate::id::TimerId;
use crate::kitchen_timer::KitchenTimerOperation;

/// Accumulates cavity-qualified attributes for one write.
struct CavityCommand {
    cavity: Cavity,
    attrs: AttributeMap,
}

impl CavityCommand {
    fn new(cavity: Cavity) -> Self {
        Self {
            cavity,
            attrs: AttributeMap::new(),
        }
    }

    fn set(mut self, attr: CavityAttr, value: impl Into<String>) -> Self {
        self.attrs.insert(cavity_key(self.cavity, attr), value);
        self
    }

    fn set_opt<V: Into<String>>(self, attr: CavityAttr, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(attr, value),
            None => self,
        }
    }

    fn target_temp(self, celsius: f64) -> Self {
        self.set(CavityAttr::TargetTemp, encode_tenths(celsius))
    }

    fn cook_time(self, seconds: Option<u32>) -> Self {
        self.set_opt(CavityAttr::CookTime, seconds.map(|s| s.to_string()))
    }

    fn operation(self, op: CookOperation) -> Self {
        self.set(CavityAttr::Operation, op.code())
    }

    fn build(self) -> AttributeMap {
        self.attrs
    }
}

/// Parameters of a standard cook-mode write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CookRequest {
    pub mode: CookMode,
    pub target_temp_c: f64,
    pub cook_time: Option<u32>,
    pub meat_probe_target_c: Option<f64>,
    pub operation: CookOperation,
}

impl CookRequest {
    /// A `Start` of `mode` at `target_temp_c` with no timer or probe.
    #[must_use]
    pub fn new(mode: CookMode, target_temp_c: f64) -> Self {
        Self {
            mode,
            target_temp_c,
            cook_time: None,
            meat_probe_target_c: None,
            operation: CookOperation::Start,
        }
    }

    #[must_use]
    pub fn cook_time(mut self, seconds: u32) -> Self {
        self.cook_time = Some(seconds);
        self
    }

    #[must_use]
    pub fn meat_probe_target(mut self, celsius: f64) -> Self {
        self.meat_probe_target_c = Some(celsius);
        self
    }

    #[must_use]
    pub fn operation(mut self, op: CookOperation) -> Self {
        self.operation = op;
        self
    }
}

/// Start or modify a standard cook mode.
#[must_use]
pub fn cook(cavity: Cavity, request: &CookRequest) -> AttributeMap {
    CavityCommand::new(cavity)
        .set(CavityAttr::CookMode, request.mode.code())
        .target_temp(request.target_temp_c)
        .operation(request.operation)
        .set_opt(
            CavityAttr::MeatProbeTargetTemp,
            request.meat_probe_target_c.map(encode_tenths),
        )
        .cook_time(request.cook_time)
        .build()
}

/// Start a frozen-food bake.
#[must_use]
pub fn frozen_bake(
    cavity: Cavity,
    target_temp_c: f64,
    food_type: u32,
    cook_time: Option<u32>,
) -> AttributeMap {
    CavityCommand::new(cavity)
        .set(CavityAttr::FrozenBake, food_type.to_string())
        .target_temp(target_temp_c)
        .operation(CookOperation::Start)
        .cook_time(cook_time)
        .build()
}

/// Start a multi-rack ("cook 4") cycle.
#[must_use]
pub fn multi_rack(
    cavity: Cavity,
    target_temp_c: f64,
    food_type: u32,
    cook_time: Option<u32>,
) -> AttributeMap {
    CavityCommand::new(cavity)
        .set(CavityAttr::MultiRack, food_type.to_string())
        .target_temp(target_temp_c)
        .operation(CookOperation::Start)
        .cook_time(cook_time)
        .build()
}

/// Weights always carry a decimal point: `1.0` is sent as `"1.0"`.
fn encode_weight(weight: f64) -> String {
    format!("{weight:?}")
}

/// Start a vendor culinary cycle by id.
///
/// The target temperature is only sent when given and non-zero. Overrides
/// are written last and may replace any generated key.
#[must_use]
pub fn culinary_cycle(
    cavity: Cavity,
    cycle_id: u32,
    target_temp_c: Option<f64>,
    cook_time: Option<u32>,
    options: &CulinaryOptions,
) -> AttributeMap {
    let mut command = CavityCommand::new(cavity)
        .set(CavityAttr::CulinaryId, cycle_id.to_string())
        .operation(CookOperation::Start)
        .cook_time(cook_time)
        .set_opt(CavityAttr::Weight, options.weight.map(encode_weight))
        .set_opt(CavityAttr::Doneness, options.doneness.map(|d| d.to_string()))
        .set_opt(CavityAttr::FoodType, options.food_type.map(|f| f.to_string()))
        .set_opt(CavityAttr::FlexiCook, options.flexi_cook.map(encode_bool))
        .set_opt(
            CavityAttr::SteamLevel,
            options.steam_level.map(|s| s.to_string()),
        );
    if let Some(celsius) = target_temp_c.filter(|c| *c != 0.0) {
        command = command.target_temp(celsius);
    }

    let mut attrs = command.build();
    for (key, value) in &options.overrides {
        attrs.insert(key.clone(), value.clone());
    }
    attrs
}

/// Payload for running `program`.
///
/// Only standard modes honour `operation`; the other selectors are always
/// sent with `Start`.
#[must_use]
pub fn program(
    cavity: Cavity,
    program: &CookProgram,
    target_temp_c: f64,
    cook_time: Option<u32>,
    operation: CookOperation,
) -> AttributeMap {
    match program {
        CookProgram::Standard { mode } => {
            let mut request = CookRequest::new(*mode, target_temp_c).operation(operation);
            request.cook_time = cook_time;
            cook(cavity, &request)
        }
        CookProgram::FrozenBake { food_type } => {
            frozen_bake(cavity, target_temp_c, *food_type, cook_time)
        }
        CookProgram::MultiRack { food_type } => {
            multi_rack(cavity, target_temp_c, *food_type, cook_time)
        }
        CookProgram::Culinary { cycle_id, options } => {
            culinary_cycle(cavity, *cycle_id, Some(target_temp_c), cook_time, options)
        }
    }
}

/// Cancel whatever the cavity is running.
#[must_use]
pub fn cancel(cavity: Cavity) -> AttributeMap {
    CavityCommand::new(cavity)
        .operation(CookOperation::Cancel)
        .build()
}

/// Change the cook time. `Modify` is only attached while a cycle runs;
/// the appliance rejects it on an idle cavity.
#[must_use]
pub fn cook_duration(cavity: Cavity, seconds: u32, state: Option<CavityState>) -> AttributeMap {
    let command = CavityCommand::new(cavity).cook_time(Some(seconds));
    match state {
        Some(state) if state.is_active() => command.operation(CookOperation::Modify).build(),
        _ => command.build(),
    }
}

#[must_use]
pub fn light(cavity: Cavity, on: bool) -> AttributeMap {
    CavityCommand::new(cavity)
        .set(CavityAttr::Light, encode_bool(on))
        .build()
}

#[must_use]
pub fn control_lock(on: bool) -> AttributeMap {
    std::iter::once((CONTROL_LOCK, encode_bool(on))).collect()
}

#[must_use]
pub fn sabbath_mode(on: bool) -> AttributeMap {
    std::iter::once((SABBATH_MODE, encode_bool(on))).collect()
}

#[must_use]
pub fn display_brightness(percent: u8) -> AttributeMap {
    std::iter::once((DISPLAY_BRIGHTNESS, percent.to_string())).collect()
}

/// Start kitchen timer `timer` counting down from `seconds`.
#[must_use]
pub fn kitchen_timer_start(timer: TimerId, seconds: u32) -> AttributeMap {
    [
        (
            kitchen_timer_key(timer, KitchenTimerAttr::SetTime),
            seconds.to_string(),
        ),
        (
            kitchen_timer_key(timer, KitchenTimerAttr::Operation),
            KitchenTimerOperation::Start.code().to_string(),
        ),
    ]
    .into_iter()
    .collect()
}

#[must_use]
pub fn kitchen_timer_cancel(timer: TimerId) -> AttributeMap {
    std::iter::once((
        kitchen_timer_key(timer, KitchenTimerAttr::Operation),
        KitchenTimerOperation::Cancel.code(),
    ))
    .collect()
}
