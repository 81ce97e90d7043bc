//! Triggered abilities and the trigger queue.
//!
//! Triggers are keyed to individual events, to compound instructions (fire
//! exactly once per compound, never once per expansion), to named composite
//! instructions (fire at most once, and only if the composite is recorded
//! as occurred), or to state conditions checked by the game-state-action
//! pass. Pending triggers are queued onto the stack in turn order from the
//! turn-holder, with each player ordering their own.

use std::collections::HashSet;

use crate::counter::CounterKind;
use crate::effect::{Effect, InstructionTag};
use crate::event::{EventKind, EventRecord};
use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId};
use crate::snapshot::ObjectSnapshot;

/// Condition for a triggered ability to fire.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerCondition {
    /// Fires per individual occurrence of an event kind.
    OnEvent(EventKind),
    /// Fires exactly once per compound instruction with this tag,
    /// regardless of how many expansions occur.
    OnCompound(InstructionTag),
    /// Fires at most once per named composite instruction, and only if the
    /// composite is recorded as occurred.
    OnComposite(String),
    /// State-based: fires when the condition holds at a game-state-action
    /// pass. Latched so it fires once per time the condition becomes true.
    State(StateCondition),
}

/// State conditions for state-based triggered abilities.
#[derive(Debug, Clone, PartialEq)]
pub enum StateCondition {
    /// The source's controller's hero is at or below this life total.
    ControllerLifeAtMost(u32),
    /// The source carries at least this many counters of a kind.
    SourceCountersAtLeast { counter: CounterKind, count: u32 },
}

/// A triggered ability waiting to become a triggered layer.
///
/// Owner and controller of the resulting layer are the controller of the
/// source at the instant it triggered, falling back to the source's owner
/// if the source had no controller then; both are captured here.
#[derive(Debug, Clone)]
pub struct PendingTrigger {
    pub source: ObjectId,
    /// Snapshot of the source at the instant it triggered, so the layer
    /// resolves even if the source is gone by then.
    pub snapshot: ObjectSnapshot,
    pub player: PlayerId,
    pub effects: Vec<Effect>,
}

/// Queue of pending triggers awaiting placement on the stack.
#[derive(Debug, Clone, Default)]
pub struct TriggerQueue {
    pending: Vec<PendingTrigger>,
    /// Latches for state triggers: (source, ability index) entries whose
    /// condition currently holds and has already fired.
    state_latched: HashSet<(ObjectId, usize)>,
}

impl TriggerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn add(&mut self, trigger: PendingTrigger) {
        self.pending.push(trigger);
    }

    /// Drain all pending triggers.
    pub fn drain(&mut self) -> Vec<PendingTrigger> {
        std::mem::take(&mut self.pending)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Collect triggers reacting to a fired instruction's record.
    pub fn collect(&mut self, game: &GameState, record: &EventRecord) {
        for (source, _ability_index, condition, effects) in live_triggered_abilities(game) {
            let fires = match &condition {
                TriggerCondition::OnEvent(kind) => record
                    .singles()
                    .iter()
                    .filter(|s| s.occurred && s.body.is_tracked() && s.body.kind() == *kind)
                    .count(),
                TriggerCondition::OnCompound(tag) => match record {
                    EventRecord::Compound(compound) if compound.tag == *tag => 1,
                    _ => 0,
                },
                TriggerCondition::OnComposite(name) => match record {
                    EventRecord::Composite(composite)
                        if composite.name == *name && composite.occurred =>
                    {
                        1
                    }
                    _ => 0,
                },
                TriggerCondition::State(_) => 0,
            };
            for _ in 0..fires {
                if let Some(trigger) = make_pending(game, source, &effects) {
                    self.pending.push(trigger);
                }
            }
        }
    }

    /// Check state-based triggered abilities, latching so each fires once
    /// per time its condition becomes true.
    pub fn collect_state_triggers(&mut self, game: &GameState) {
        let mut still_true: HashSet<(ObjectId, usize)> = HashSet::new();

        for (source, ability_index, condition, effects) in live_triggered_abilities(game) {
            let TriggerCondition::State(state) = &condition else {
                continue;
            };
            if !state_condition_holds(game, source, state) {
                continue;
            }
            let key = (source, ability_index);
            still_true.insert(key);
            if self.state_latched.contains(&key) {
                continue;
            }
            if let Some(trigger) = make_pending(game, source, &effects) {
                self.pending.push(trigger);
                self.state_latched.insert(key);
            }
        }

        // Unlatch entries whose condition stopped holding.
        self.state_latched.retain(|key| still_true.contains(key));
    }
}

/// All triggered abilities on objects in their functional zones.
fn live_triggered_abilities(
    game: &GameState,
) -> Vec<(ObjectId, usize, TriggerCondition, Vec<Effect>)> {
    let mut out = Vec::new();
    for obj in game.objects_in_arena() {
        for (index, ability) in obj.abilities.iter().enumerate() {
            if !ability.functions_in(obj.zone) {
                continue;
            }
            if let Some(triggered) = ability.as_triggered() {
                out.push((
                    obj.id,
                    index,
                    triggered.condition.clone(),
                    triggered.effects.clone(),
                ));
            }
        }
    }
    out
}

fn state_condition_holds(game: &GameState, source: ObjectId, condition: &StateCondition) -> bool {
    match condition {
        StateCondition::ControllerLifeAtMost(value) => {
            let Some(obj) = game.object(source) else {
                return false;
            };
            let Some(player) = obj.controller.or(obj.owner) else {
                return false;
            };
            game.hero_life(player).is_some_and(|life| life <= *value)
        }
        StateCondition::SourceCountersAtLeast { counter, count } => game
            .object(source)
            .is_some_and(|obj| obj.counters.count(counter) >= *count),
    }
}

fn make_pending(game: &GameState, source: ObjectId, effects: &[Effect]) -> Option<PendingTrigger> {
    let obj = game.object(source)?;
    // Controller at the instant of triggering, falling back to owner.
    let player = obj.controller.or(obj.owner)?;
    Some(PendingTrigger {
        source,
        snapshot: ObjectSnapshot::capture(obj),
        player,
        effects: effects.to_vec(),
    })
}
