//! Cook modes, cycle operations and the programs a cavity can run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cavity::CavityState;
use crate::code::wire_codes;

wire_codes! {
    /// Cooking technique selected through `CycleSetCommonMode`.
    ///
    /// `ForcedAir` and `Steam` are both reported as `14` by the appliance
    /// tables; decoding `14` yields `ForcedAir`.
    pub enum CookMode: "cook mode" {
        Standby => "0",
        RapidPreheat => "1",
        Bake => "2",
        ForcedAir => "14",
        ConvectBake => "6",
        Broil => "8",
        ConvectBroil => "9",
        Steam => "14",
        ConvectRoast => "16",
        Rising => "19",
        KeepWarm => "24",
    }
}

wire_codes! {
    /// Lifecycle verb accompanying every cycle-affecting write (`OpSetOperations`).
    pub enum CookOperation: "cook operation" {
        Cancel => "1",
        Start => "2",
        Modify => "4",
        Pause => "5",
    }
}

impl CookOperation {
    /// Pick the verb for a cycle write given the cavity's current state.
    ///
    /// A running cavity only accepts `Modify`; anything else (including an
    /// unknown state) must be started.
    #[must_use]
    pub fn for_state(state: Option<CavityState>) -> Self {
        match state {
            Some(state) if state.is_active() => Self::Modify,
            _ => Self::Start,
        }
    }
}

/// Food type sent with a frozen-bake cycle when none is given.
pub const DEFAULT_FROZEN_BAKE_FOOD: u32 = 4;
/// Food type sent with a multi-rack ("cook 4") cycle when none is given.
pub const DEFAULT_MULTI_RACK_FOOD: u32 = 2;
/// Culinary cycle id of the pizza preset.
pub const PIZZA_CYCLE_ID: u32 = 454;
/// Culinary cycle id of the bread preset.
pub const BREAD_CYCLE_ID: u32 = 459;
/// Target temperature used when the appliance reports none.
pub const DEFAULT_TARGET_TEMP_C: f64 = 180.0;

/// Optional parameters of a culinary (vendor preset) cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CulinaryOptions {
    pub weight: Option<f64>,
    pub doneness: Option<u32>,
    pub food_type: Option<u32>,
    pub flexi_cook: Option<bool>,
    pub steam_level: Option<u32>,
    /// Raw attributes written verbatim (full key, no cavity prefix added).
    pub overrides: BTreeMap<String, String>,
}

impl CulinaryOptions {
    #[must_use]
    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    #[must_use]
    pub fn doneness(mut self, doneness: u32) -> Self {
        self.doneness = Some(doneness);
        self
    }

    #[must_use]
    pub fn food_type(mut self, food_type: u32) -> Self {
        self.food_type = Some(food_type);
        self
    }

    #[must_use]
    pub fn flexi_cook(mut self, on: bool) -> Self {
        self.flexi_cook = Some(on);
        self
    }

    #[must_use]
    pub fn steam_level(mut self, level: u32) -> Self {
        self.steam_level = Some(level);
        self
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }
}

/// Everything a cavity can be asked to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CookProgram {
    /// A common mode selected through `CycleSetCommonMode`.
    Standard { mode: CookMode },
    /// Frozen-food bake selected through `CycleSetFrozenBakeFood`.
    FrozenBake { food_type: u32 },
    /// Multi-rack ("cook 4") cycle selected through `CycleSetMultiRackFood`.
    MultiRack { food_type: u32 },
    /// Vendor preset selected through `CulinaryCtrSetId`.
    Culinary {
        cycle_id: u32,
        #[serde(default)]
        options: CulinaryOptions,
    },
}

impl CookProgram {
    #[must_use]
    pub fn standard(mode: CookMode) -> Self {
        Self::Standard { mode }
    }

    #[must_use]
    pub fn frozen_bake() -> Self {
        Self::FrozenBake {
            food_type: DEFAULT_FROZEN_BAKE_FOOD,
        }
    }

    #[must_use]
    pub fn multi_rack() -> Self {
        Self::MultiRack {
            food_type: DEFAULT_MULTI_RACK_FOOD,
        }
    }

    #[must_use]
    pub fn culinary(cycle_id: u32) -> Self {
        Self::Culinary {
            cycle_id,
            options: CulinaryOptions::default(),
        }
    }

    #[must_use]
    pub fn pizza() -> Self {
        Self::culinary(PIZZA_CYCLE_ID)
    }

    #[must_use]
    pub fn bread() -> Self {
        Self::culinary(BREAD_CYCLE_ID)
    }

    /// The common mode, if this is a standard program.
    #[must_use]
    pub fn mode(&self) -> Option<CookMode> {
        match self {
            Self::Standard { mode } => Some(*mode),
            _ => None,
        }
    }
}

impl Default for CookProgram {
    fn default() -> Self {
        Self::standard(CookMode::Bake)
    }
}
