//! Targets and filters for effects and abilities.

use crate::ids::{ObjectId, PlayerId};
use crate::types::{CardType, Subtype};
use crate::zone::Zone;

/// A resolved target: a specific object or player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Object(ObjectId),
    Player(PlayerId),
}

/// Which player(s) an effect addresses, resolved against the execution
/// context at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Who {
    /// The controller of the effect.
    You,
    /// The controller's opponent.
    Opponent,
    /// Each player, in turn order from the turn-holder (or from the
    /// controlling effect's controller when one exists).
    EachPlayer,
}

/// A filter over objects, used for identity matching and selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectFilter {
    /// Required name (exact match), if any.
    pub name: Option<String>,
    /// Required card types (must have at least one, if non-empty).
    pub card_types: Vec<CardType>,
    /// Required subtypes (must have at least one, if non-empty).
    pub subtypes: Vec<Subtype>,
    /// Required zone, if any.
    pub zone: Option<Zone>,
    /// Required controller, if any.
    pub controlled_by: Option<PlayerId>,
}

impl ObjectFilter {
    /// Matches any object.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn of_type(card_type: CardType) -> Self {
        Self {
            card_types: vec![card_type],
            ..Default::default()
        }
    }

    pub fn with_subtype(mut self, subtype: Subtype) -> Self {
        self.subtypes.push(subtype);
        self
    }

    pub fn in_zone(mut self, zone: Zone) -> Self {
        self.zone = Some(zone);
        self
    }

    pub fn controlled_by(mut self, player: PlayerId) -> Self {
        self.controlled_by = Some(player);
        self
    }
}

/// What an effect needs targeted, declared when a layer is created.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetSpec {
    /// No target: the effect addresses its context (source, controller,
    /// opponent) directly.
    None,
    /// Target the controller's hero.
    YourHero,
    /// Target the opponent's hero.
    OpponentHero,
    /// Any hero.
    AnyHero,
    /// An object matching the filter.
    Object(ObjectFilter),
}

impl TargetSpec {
    /// Returns true if this spec requires a player-declared target.
    pub fn requires_declaration(&self) -> bool {
        matches!(self, TargetSpec::AnyHero | TargetSpec::Object(_))
    }
}
