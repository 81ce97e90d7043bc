//! The event model: discrete state changes and their compound/composite
//! aggregates.
//!
//! An event is transient; it is consumed entirely by the pipeline in
//! `executor`. What survives is the `EventRecord` log the trigger system
//! reads: individual occurrences for singular triggers, one compound record
//! per compound instruction (triggers keyed to the compound fire exactly
//! once, never once per expansion), and one composite record per named
//! composite instruction (reactions fire at most once, and only if the
//! composite is recorded as occurred).

use crate::counter::CounterKind;
use crate::effect::InstructionTag;
use crate::ids::{ObjectId, PlayerId};
use crate::ledger::AssetKind;
use crate::property::PropertyKind;
use crate::target::Target;
use crate::zone::Zone;

/// Fast dispatch enum for event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Damage,
    LifeGain,
    LifeLoss,
    Draw,
    Pitch,
    Discard,
    ZoneMove,
    CountersAdded,
    CountersRemoved,
    PropertyGained,
    PropertyLost,
    ValueRaised,
    ValueLowered,
    AssetGained,
    TokenCreated,
    LookBegun,
    CombatChainClosed,
    RuleChanged,
    DeckShuffled,
}

/// One discrete state change.
#[derive(Debug, Clone, PartialEq)]
pub enum EventBody {
    Damage {
        source: Option<ObjectId>,
        target: Target,
        amount: u32,
    },
    LifeGain {
        player: PlayerId,
        amount: u32,
    },
    LifeLoss {
        player: PlayerId,
        amount: u32,
    },
    /// One card drawn. "Draw N" expands to N of these.
    DrawCard {
        player: PlayerId,
    },
    PitchCard {
        player: PlayerId,
        object: ObjectId,
    },
    DiscardCard {
        player: PlayerId,
        object: ObjectId,
    },
    ZoneMove {
        object: ObjectId,
        from: Zone,
        to: Zone,
    },
    CountersAdded {
        object: ObjectId,
        counter: CounterKind,
        count: u32,
    },
    CountersRemoved {
        object: ObjectId,
        counter: CounterKind,
        count: u32,
    },
    PropertyGained {
        object: ObjectId,
        property: PropertyKind,
    },
    PropertyLost {
        object: ObjectId,
        property: PropertyKind,
    },
    ValueRaised {
        object: ObjectId,
        property: PropertyKind,
        amount: u32,
        base: bool,
    },
    ValueLowered {
        object: ObjectId,
        property: PropertyKind,
        amount: u32,
        base: bool,
    },
    AssetGained {
        player: PlayerId,
        kind: AssetKind,
        amount: u32,
    },
    TokenCreated {
        object: ObjectId,
    },
    /// A continuous "look" effect begins (game-state-action step 3).
    LookBegun {
        source: ObjectId,
    },
    CombatChainClosed,
    /// A governing directive became active.
    RuleChanged {
        source: Option<ObjectId>,
    },
    /// Reordering of a hidden zone. Untracked state only.
    DeckShuffled {
        player: PlayerId,
    },
}

impl EventBody {
    pub fn kind(&self) -> EventKind {
        match self {
            EventBody::Damage { .. } => EventKind::Damage,
            EventBody::LifeGain { .. } => EventKind::LifeGain,
            EventBody::LifeLoss { .. } => EventKind::LifeLoss,
            EventBody::DrawCard { .. } => EventKind::Draw,
            EventBody::PitchCard { .. } => EventKind::Pitch,
            EventBody::DiscardCard { .. } => EventKind::Discard,
            EventBody::ZoneMove { .. } => EventKind::ZoneMove,
            EventBody::CountersAdded { .. } => EventKind::CountersAdded,
            EventBody::CountersRemoved { .. } => EventKind::CountersRemoved,
            EventBody::PropertyGained { .. } => EventKind::PropertyGained,
            EventBody::PropertyLost { .. } => EventKind::PropertyLost,
            EventBody::ValueRaised { .. } => EventKind::ValueRaised,
            EventBody::ValueLowered { .. } => EventKind::ValueLowered,
            EventBody::AssetGained { .. } => EventKind::AssetGained,
            EventBody::TokenCreated { .. } => EventKind::TokenCreated,
            EventBody::LookBegun { .. } => EventKind::LookBegun,
            EventBody::CombatChainClosed => EventKind::CombatChainClosed,
            EventBody::RuleChanged { .. } => EventKind::RuleChanged,
            EventBody::DeckShuffled { .. } => EventKind::DeckShuffled,
        }
    }

    /// A no-op instruction never occurs: it cannot be replaced and cannot
    /// trigger anything.
    pub fn is_noop(&self) -> bool {
        match self {
            EventBody::Damage { amount, .. }
            | EventBody::LifeGain { amount, .. }
            | EventBody::LifeLoss { amount, .. }
            | EventBody::ValueRaised { amount, .. }
            | EventBody::ValueLowered { amount, .. }
            | EventBody::AssetGained { amount, .. } => *amount == 0,
            EventBody::CountersAdded { count, .. } | EventBody::CountersRemoved { count, .. } => {
                *count == 0
            }
            EventBody::ZoneMove { from, to, .. } => from == to,
            _ => false,
        }
    }

    /// Events touching only untracked state are invisible to the
    /// replacement and trigger machinery.
    pub fn is_tracked(&self) -> bool {
        !matches!(self, EventBody::DeckShuffled { .. })
    }

    /// The numeric magnitude of this event, if it has one. Replacement
    /// effects that modify amounts go through here.
    pub fn amount(&self) -> Option<u32> {
        match self {
            EventBody::Damage { amount, .. }
            | EventBody::LifeGain { amount, .. }
            | EventBody::LifeLoss { amount, .. }
            | EventBody::ValueRaised { amount, .. }
            | EventBody::ValueLowered { amount, .. }
            | EventBody::AssetGained { amount, .. } => Some(*amount),
            EventBody::CountersAdded { count, .. } | EventBody::CountersRemoved { count, .. } => {
                Some(*count)
            }
            _ => None,
        }
    }

    /// Rewrite the numeric magnitude, if this event has one.
    pub fn set_amount(&mut self, new_amount: u32) {
        match self {
            EventBody::Damage { amount, .. }
            | EventBody::LifeGain { amount, .. }
            | EventBody::LifeLoss { amount, .. }
            | EventBody::ValueRaised { amount, .. }
            | EventBody::ValueLowered { amount, .. }
            | EventBody::AssetGained { amount, .. } => *amount = new_amount,
            EventBody::CountersAdded { count, .. } | EventBody::CountersRemoved { count, .. } => {
                *count = new_amount
            }
            _ => {}
        }
    }

    /// The destination zone, for zone-changing events.
    pub fn destination(&self) -> Option<Zone> {
        match self {
            EventBody::ZoneMove { to, .. } => Some(*to),
            _ => None,
        }
    }

    /// Rewrite the destination of a zone-changing event.
    pub fn set_destination(&mut self, zone: Zone) {
        if let EventBody::ZoneMove { to, .. } = self {
            *to = zone;
        }
    }

    /// The player this event principally affects, if one is identifiable.
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            EventBody::LifeGain { player, .. }
            | EventBody::LifeLoss { player, .. }
            | EventBody::DrawCard { player }
            | EventBody::PitchCard { player, .. }
            | EventBody::DiscardCard { player, .. }
            | EventBody::AssetGained { player, .. }
            | EventBody::DeckShuffled { player } => Some(*player),
            EventBody::Damage {
                target: Target::Player(player),
                ..
            } => Some(*player),
            _ => None,
        }
    }

    /// The object this event principally affects, if any.
    pub fn object(&self) -> Option<ObjectId> {
        match self {
            EventBody::ZoneMove { object, .. }
            | EventBody::CountersAdded { object, .. }
            | EventBody::CountersRemoved { object, .. }
            | EventBody::PropertyGained { object, .. }
            | EventBody::PropertyLost { object, .. }
            | EventBody::ValueRaised { object, .. }
            | EventBody::ValueLowered { object, .. }
            | EventBody::TokenCreated { object }
            | EventBody::PitchCard { object, .. }
            | EventBody::DiscardCard { object, .. }
            | EventBody::LookBegun { source: object } => Some(*object),
            EventBody::Damage {
                target: Target::Object(object),
                ..
            } => Some(*object),
            _ => None,
        }
    }
}

/// One entry in the per-resolution event log.
#[derive(Debug, Clone)]
pub enum EventRecord {
    /// A discrete state change and whether it actually occurred.
    Single(SingleRecord),
    /// A compound instruction with its expansions.
    Compound(CompoundRecord),
    /// A named composite instruction.
    Composite(CompositeRecord),
}

#[derive(Debug, Clone)]
pub struct SingleRecord {
    pub body: EventBody,
    pub occurred: bool,
    /// True when a replacement effect rewrote the event away. An
    /// intercepted cost component still counts as paid.
    pub intercepted: bool,
}

#[derive(Debug, Clone)]
pub struct CompoundRecord {
    pub tag: InstructionTag,
    /// How many repetitions the instruction requested.
    pub requested: u32,
    /// The expanded individual records, in order.
    pub parts: Vec<EventRecord>,
}

#[derive(Debug, Clone)]
pub struct CompositeRecord {
    pub name: String,
    /// Recorded as occurred unless every internal sub-event was fully
    /// replaced away. Parameter-only alteration keeps it occurred.
    pub occurred: bool,
    pub parts: Vec<EventRecord>,
}

impl EventRecord {
    pub fn single(body: EventBody, occurred: bool) -> Self {
        EventRecord::Single(SingleRecord {
            body,
            occurred,
            intercepted: false,
        })
    }

    /// Walk all individual records, depth first.
    pub fn singles(&self) -> Vec<&SingleRecord> {
        match self {
            EventRecord::Single(record) => vec![record],
            EventRecord::Compound(compound) => {
                compound.parts.iter().flat_map(|p| p.singles()).collect()
            }
            EventRecord::Composite(composite) => {
                composite.parts.iter().flat_map(|p| p.singles()).collect()
            }
        }
    }

    /// Whether anything in this record actually occurred.
    pub fn occurred(&self) -> bool {
        match self {
            EventRecord::Single(record) => record.occurred,
            EventRecord::Compound(compound) => compound.parts.iter().any(|p| p.occurred()),
            EventRecord::Composite(composite) => composite.occurred,
        }
    }
}
