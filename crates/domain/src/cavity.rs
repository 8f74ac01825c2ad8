//! Cavities: the independently controllable cooking compartments.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::code::wire_codes;

/// One of the oven's compartments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cavity {
    #[default]
    Upper,
    Lower,
}

impl Cavity {
    pub const ALL: [Self; 2] = [Self::Upper, Self::Lower];

    /// Key prefix of every attribute scoped to this cavity.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Upper => "OvenUpperCavity",
            Self::Lower => "OvenLowerCavity",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Upper => 0,
            Self::Lower => 1,
        }
    }
}

impl fmt::Display for Cavity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upper => f.write_str("upper"),
            Self::Lower => f.write_str("lower"),
        }
    }
}

wire_codes! {
    /// Operational state reported for a cavity (`OpStatusState`).
    pub enum CavityState: "cavity state" {
        Standby => "0",
        Preheating => "1",
        Cooking => "2",
        NotPresent => "4",
    }
}

impl CavityState {
    /// Whether a cycle is running, i.e. the next cycle write must be a `Modify`.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Preheating | Self::Cooking)
    }
}

/// Progress of the cook-time countdown (`OpStatusCookTimeState`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CookTimeState {
    Waiting,
    Running,
    Completed,
}

impl CookTimeState {
    /// Interpret the raw status value. Anything that is neither running nor
    /// completed (including a missing attribute) counts as waiting.
    #[must_use]
    pub fn from_raw(raw: Option<i64>) -> Self {
        match raw {
            Some(1) => Self::Running,
            Some(3) => Self::Completed,
            _ => Self::Waiting,
        }
    }
}

/// One value per cavity, allocated up front and indexed by [`Cavity`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerCavity<T> {
    slots: [T; 2],
}

impl<T> PerCavity<T> {
    #[must_use]
    pub fn new(upper: T, lower: T) -> Self {
        Self {
            slots: [upper, lower],
        }
    }

    /// Iterate over `(cavity, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Cavity, &T)> {
        Cavity::ALL.into_iter().zip(self.slots.iter())
    }
}

impl<T> Index<Cavity> for PerCavity<T> {
    type Output = T;

    fn index(&self, cavity: Cavity) -> &T {
        &self.slots[cavity.index()]
    }
}

impl<T> IndexMut<Cavity> for PerCavity<T> {
    fn index_mut(&mut self, cavity: Cavity) -> &mut T {
        &mut self.slots[cavity.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::WireCode;

    #[test]
    fn should_map_cavities_to_wire_prefixes() {
        assert_eq!(Cavity::Upper.prefix(), "OvenUpperCavity");
        assert_eq!(Cavity::Lower.prefix(), "OvenLowerCavity");
    }

    #[test]
    fn should_roundtrip_every_cavity_state_code() {
        for state in CavityState::ALL {
            assert_eq!(CavityState::from_code(state.code()).unwrap(), *state);
        }
    }

    #[test]
    fn should_reject_unknown_cavity_state_code() {
        assert!(CavityState::from_code("3").is_err());
    }

    #[test]
    fn should_treat_preheating_and_cooking_as_active() {
        assert!(CavityState::Preheating.is_active());
        assert!(CavityState::Cooking.is_active());
        assert!(!CavityState::Standby.is_active());
        assert!(!CavityState::NotPresent.is_active());
    }

    #[test]
    fn should_interpret_cook_time_state() {
        assert_eq!(CookTimeState::from_raw(Some(1)), CookTimeState::Running);
        assert_eq!(CookTimeState::from_raw(Some(3)), CookTimeState::Completed);
        assert_eq!(CookTimeState::from_raw(Some(0)), CookTimeState::Waiting);
        assert_eq!(CookTimeState::from_raw(None), CookTimeState::Waiting);
    }

    #[test]
    fn should_index_per_cavity_slots_independently() {
        let mut slots = PerCavity::new(1, 2);
        slots[Cavity::Lower] = 7;
        assert_eq!(slots[Cavity::Upper], 1);
        assert_eq!(slots[Cavity::Lower], 7);
        let collected: Vec<_> = slots.iter().map(|(c, v)| (c, *v)).collect();
        assert_eq!(collected, vec![(Cavity::Upper, 1), (Cavity::Lower, 7)]);
    }
}
