//! Abilities carried by objects: activated and triggered.

use crate::cost::Cost;
use crate::effect::Effect;
use crate::trigger::TriggerCondition;
use crate::zone::Zone;

/// An ability a player can activate by paying its cost.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivatedAbility {
    pub cost: Cost,
    pub effects: Vec<Effect>,
}

/// An ability that fires when its condition is met.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggeredAbility {
    pub condition: TriggerCondition,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AbilityKind {
    Activated(ActivatedAbility),
    Triggered(TriggeredAbility),
}

/// An ability with the zones it functions in.
#[derive(Debug, Clone, PartialEq)]
pub struct Ability {
    pub kind: AbilityKind,
    /// Zones in which this ability is live. Defaults to the arena.
    pub functional_zones: Vec<Zone>,
}

impl Ability {
    pub fn activated(cost: Cost, effects: Vec<Effect>) -> Self {
        Self {
            kind: AbilityKind::Activated(ActivatedAbility { cost, effects }),
            functional_zones: vec![Zone::Arena],
        }
    }

    pub fn triggered(condition: TriggerCondition, effects: Vec<Effect>) -> Self {
        Self {
            kind: AbilityKind::Triggered(TriggeredAbility { condition, effects }),
            functional_zones: vec![Zone::Arena],
        }
    }

    pub fn in_zones(mut self, zones: Vec<Zone>) -> Self {
        self.functional_zones = zones;
        self
    }

    pub fn functions_in(&self, zone: Zone) -> bool {
        self.functional_zones.contains(&zone)
    }

    pub fn as_activated(&self) -> Option<&ActivatedAbility> {
        match &self.kind {
            AbilityKind::Activated(ability) => Some(ability),
            _ => None,
        }
    }

    pub fn as_triggered(&self) -> Option<&TriggeredAbility> {
        match &self.kind {
            AbilityKind::Triggered(ability) => Some(ability),
            _ => None,
        }
    }
}
