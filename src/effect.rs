//! Effect primitives: the closed instruction vocabulary the engine executes.
//!
//! Card ability text arrives pre-parsed into these primitives; the engine
//! dispatches on primitive kind, never on card identity. `Repeat` is the
//! compound form ("do X, N times"), `EachPlayer` the multi-player compound,
//! and `Composite` the named instruction built from internal sub-events.

use crate::counter::CounterKind;
use crate::ledger::AssetKind;
use crate::precedence::Directive;
use crate::property::PropertyKind;
use crate::target::{ObjectFilter, TargetSpec, Who};
use crate::zone::Zone;

/// A dynamically evaluated quantity.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueExpr {
    /// A fixed number.
    Fixed(u32),
    /// The modified value of a property of the effect's source. Evaluates to
    /// zero if currently undeterminable (source gone, property absent).
    SourceProperty(PropertyKind),
    /// The number of counters of a kind on the effect's source.
    SourceCounters(CounterKind),
}

impl ValueExpr {
    pub fn fixed(n: u32) -> Self {
        ValueExpr::Fixed(n)
    }
}

/// One effect primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Deal damage to a target.
    DealDamage { target: TargetSpec, amount: ValueExpr },
    /// A player draws cards (expands to one event per card).
    Draw { who: Who, count: ValueExpr },
    /// A player gains life on their hero.
    GainLife { who: Who, amount: ValueExpr },
    /// A player loses life on their hero.
    LoseLife { who: Who, amount: ValueExpr },
    /// A player gains asset points.
    GainAsset {
        who: Who,
        kind: AssetKind,
        amount: ValueExpr,
    },
    /// Put counters on a target.
    AddCounters {
        target: TargetSpec,
        counter: CounterKind,
        count: ValueExpr,
    },
    /// Remove counters from a target.
    RemoveCounters {
        target: TargetSpec,
        counter: CounterKind,
        count: ValueExpr,
    },
    /// Move a target object to a zone.
    MoveTo { target: TargetSpec, zone: Zone },
    /// Destroy a target object (move to its owner's graveyard).
    Destroy { target: TargetSpec },
    /// Grant presence of a property to a target.
    GainProperty {
        target: TargetSpec,
        property: PropertyKind,
    },
    /// Remove presence of a property from a target.
    LoseProperty {
        target: TargetSpec,
        property: PropertyKind,
    },
    /// Raise or lower a numeric property value. `base` selects the base
    /// value; otherwise only the modified value moves.
    ChangeValue {
        target: TargetSpec,
        property: PropertyKind,
        delta: i32,
        base: bool,
    },
    /// Compound: perform the inner effect N times.
    Repeat { count: ValueExpr, effect: Box<Effect> },
    /// Multi-player compound: each player performs the inner effect, in
    /// turn order from the turn-holder (or this effect's controller).
    EachPlayer(Box<Effect>),
    /// Composite: one named instruction built from internal sub-events.
    Composite { name: String, parts: Vec<Effect> },
    /// Search a hidden zone for a matching card and move it. The outcome is
    /// unverifiable by the opponent; the acting player may silently fail it.
    SearchDeck {
        who: Who,
        filter: ObjectFilter,
        to: Zone,
    },
    /// Register a precedence directive (restriction/requirement/allowance).
    Govern(Directive),
    /// Create a token object in the arena under a player's control.
    CreateToken { name: String, who: Who },
    /// Shuffle a player's deck. Touches only untracked state (hidden-zone
    /// ordering), so it is invisible to replacement and trigger machinery.
    ShuffleDeck { who: Who },
}

/// Structural tag naming an instruction, used to key triggers and
/// replacements to a compound ("whenever you are instructed to draw").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionTag {
    DealDamage,
    Draw,
    GainLife,
    LoseLife,
    GainAsset,
    AddCounters,
    RemoveCounters,
    MoveTo,
    Destroy,
    GainProperty,
    LoseProperty,
    ChangeValue,
    SearchDeck,
    Govern,
    CreateToken,
    ShuffleDeck,
}

impl Effect {
    /// The instruction tag of this effect, if it is an elementary
    /// instruction. Compounds and composites carry their inner tags.
    pub fn tag(&self) -> Option<InstructionTag> {
        match self {
            Effect::DealDamage { .. } => Some(InstructionTag::DealDamage),
            Effect::Draw { .. } => Some(InstructionTag::Draw),
            Effect::GainLife { .. } => Some(InstructionTag::GainLife),
            Effect::LoseLife { .. } => Some(InstructionTag::LoseLife),
            Effect::GainAsset { .. } => Some(InstructionTag::GainAsset),
            Effect::AddCounters { .. } => Some(InstructionTag::AddCounters),
            Effect::RemoveCounters { .. } => Some(InstructionTag::RemoveCounters),
            Effect::MoveTo { .. } => Some(InstructionTag::MoveTo),
            Effect::Destroy { .. } => Some(InstructionTag::Destroy),
            Effect::GainProperty { .. } => Some(InstructionTag::GainProperty),
            Effect::LoseProperty { .. } => Some(InstructionTag::LoseProperty),
            Effect::ChangeValue { .. } => Some(InstructionTag::ChangeValue),
            Effect::SearchDeck { .. } => Some(InstructionTag::SearchDeck),
            Effect::Govern(_) => Some(InstructionTag::Govern),
            Effect::CreateToken { .. } => Some(InstructionTag::CreateToken),
            Effect::ShuffleDeck { .. } => Some(InstructionTag::ShuffleDeck),
            Effect::Repeat { .. } | Effect::EachPlayer(_) | Effect::Composite { .. } => None,
        }
    }

    /// The target spec this effect declares, if any.
    pub fn target_spec(&self) -> Option<&TargetSpec> {
        match self {
            Effect::DealDamage { target, .. }
            | Effect::AddCounters { target, .. }
            | Effect::RemoveCounters { target, .. }
            | Effect::MoveTo { target, .. }
            | Effect::Destroy { target }
            | Effect::GainProperty { target, .. }
            | Effect::LoseProperty { target, .. }
            | Effect::ChangeValue { target, .. } => Some(target),
            Effect::Repeat { effect, .. } | Effect::EachPlayer(effect) => effect.target_spec(),
            Effect::Composite { parts, .. } => parts.iter().find_map(|p| p.target_spec()),
            _ => None,
        }
    }

    /// Returns the first declared target spec that requires declaration,
    /// walking compounds and composites.
    pub fn declared_target(&self) -> Option<&TargetSpec> {
        self.target_spec().filter(|s| s.requires_declaration())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags() {
        let draw = Effect::Draw {
            who: Who::You,
            count: ValueExpr::fixed(3),
        };
        assert_eq!(draw.tag(), Some(InstructionTag::Draw));

        let repeat = Effect::Repeat {
            count: ValueExpr::fixed(2),
            effect: Box::new(draw),
        };
        assert_eq!(repeat.tag(), None);
    }

    #[test]
    fn test_declared_target_walks_compounds() {
        let inner = Effect::DealDamage {
            target: TargetSpec::AnyHero,
            amount: ValueExpr::fixed(1),
        };
        let repeat = Effect::Repeat {
            count: ValueExpr::fixed(3),
            effect: Box::new(inner),
        };
        assert_eq!(repeat.declared_target(), Some(&TargetSpec::AnyHero));

        let fixed = Effect::GainLife {
            who: Who::You,
            amount: ValueExpr::fixed(2),
        };
        assert!(fixed.declared_target().is_none());
    }
}
