//! Attribute naming convention.
//!
//! Cavity-scoped keys are `<CavityPrefix>_<Postfix>`, kitchen-timer keys are
//! `KitchenTimer<NN>_<Postfix>`, appliance-wide keys are fixed names.

use crate::cavity::Cavity;
use crate::id::TimerId;

pub const DISPLAY_BRIGHTNESS: &str = "Sys_DisplaySetBrightnessPercent";
pub const CONTROL_LOCK: &str = "Sys_OperationSetControlLock";
pub const SABBATH_MODE: &str = "Sys_OperationSetSabbathModeEnabled";

/// Per-cavity attribute suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CavityAttr {
    DoorOpen,
    Light,
    TargetTemp,
    DisplayTemp,
    RawTemp,
    CookTime,
    State,
    CookTimeState,
    CookMode,
    FrozenBake,
    MultiRack,
    CulinaryId,
    MeatProbePluggedIn,
    MeatProbeTargetTemp,
    Operation,
    Weight,
    Doneness,
    FoodType,
    FlexiCook,
    SteamLevel,
}

impl CavityAttr {
    #[must_use]
    pub const fn postfix(self) -> &'static str {
        match self {
            Self::DoorOpen => "OpStatusDoorOpen",
            Self::Light => "DisplaySetLightOn",
            Self::TargetTemp => "CycleSetTargetTemp",
            Self::DisplayTemp => "DisplStatusDisplayTemp",
            Self::RawTemp => "OpStatusRawTemp",
            Self::CookTime => "TimeSetCookTimeSet",
            Self::State => "OpStatusState",
            Self::CookTimeState => "OpStatusCookTimeState",
            Self::CookMode => "CycleSetCommonMode",
            Self::FrozenBake => "CycleSetFrozenBakeFood",
            Self::MultiRack => "CycleSetMultiRackFood",
            Self::CulinaryId => "CulinaryCtrSetId",
            Self::MeatProbePluggedIn => "AlertStatusMeatProbePluggedIn",
            Self::MeatProbeTargetTemp => "CycleSetMeatProbeTargetTemp",
            Self::Operation => "OpSetOperations",
            Self::Weight => "Weight",
            Self::Doneness => "Doneness",
            Self::FoodType => "FoodType",
            Self::FlexiCook => "FlexiCook",
            Self::SteamLevel => "SteamLevel",
        }
    }
}

/// Per-kitchen-timer attribute suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KitchenTimerAttr {
    TimeRemaining,
    State,
    SetTime,
    Operation,
}

impl KitchenTimerAttr {
    #[must_use]
    pub const fn postfix(self) -> &'static str {
        match self {
            Self::TimeRemaining => "StatusTimeRemaining",
            Self::State => "StatusState",
            Self::SetTime => "SetTimeSet",
            Self::Operation => "SetOperations",
        }
    }
}

/// Fully qualified key of a cavity-scoped attribute.
#[must_use]
pub fn cavity_key(cavity: Cavity, attr: CavityAttr) -> String {
    format!("{}_{}", cavity.prefix(), attr.postfix())
}

/// Fully qualified key of a kitchen-timer attribute.
#[must_use]
pub fn kitchen_timer_key(timer: TimerId, attr: KitchenTimerAttr) -> String {
    format!("KitchenTimer{timer}_{}", attr.postfix())
}
