//! Replacement effects: rewriting events before they happen.
//!
//! A replacement effect watches for matching events and rewrites them. A
//! compound-scoped effect rewrites the compound as a whole and must not
//! additionally rewrite the expanded individual events; the pipeline
//! enforces this by consuming the effect at compound scope. Rollback events
//! are never offered to replacement effects.

use std::collections::HashSet;

use crate::effect::InstructionTag;
use crate::event::{EventBody, EventKind};
use crate::ids::{ObjectId, PlayerId};
use crate::zone::Zone;

/// Unique identifier for a replacement effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplacementEffectId(pub u64);

/// At which grain a matcher applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchScope {
    /// Individual events (including the expansions of a compound).
    Individual,
    /// The compound instruction as a whole, before expansion.
    Compound,
    /// A named composite instruction's sub-events.
    Composite,
}

/// Condition for a replacement effect to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum EventMatcher {
    /// Any event of this kind.
    Kind(EventKind),
    /// Damage dealt to a specific player's hero.
    DamageToPlayer(PlayerId),
    /// A specific player would draw a card.
    WouldDraw(PlayerId),
    /// Any object would move to this zone.
    WouldMoveTo(Zone),
    /// A specific object would move zones.
    ObjectWouldMove(ObjectId),
    /// A compound instruction with this tag, matched as a whole.
    CompoundOf(InstructionTag),
    /// A sub-event of the named composite instruction.
    PartOf {
        composite: String,
        inner: Box<EventMatcher>,
    },
}

impl EventMatcher {
    pub fn scope(&self) -> MatchScope {
        match self {
            EventMatcher::CompoundOf(_) => MatchScope::Compound,
            EventMatcher::PartOf { .. } => MatchScope::Composite,
            _ => MatchScope::Individual,
        }
    }

    /// Check an individual event body against this matcher.
    pub fn matches_body(&self, body: &EventBody) -> bool {
        match self {
            EventMatcher::Kind(kind) => body.kind() == *kind,
            EventMatcher::DamageToPlayer(player) => matches!(
                body,
                EventBody::Damage { target: crate::target::Target::Player(p), .. } if p == player
            ),
            EventMatcher::WouldDraw(player) => {
                matches!(body, EventBody::DrawCard { player: p } if p == player)
            }
            EventMatcher::WouldMoveTo(zone) => {
                matches!(body, EventBody::ZoneMove { to, .. } if to == zone)
            }
            EventMatcher::ObjectWouldMove(object) => {
                matches!(body, EventBody::ZoneMove { object: o, .. } if o == object)
            }
            EventMatcher::CompoundOf(_) => false,
            EventMatcher::PartOf { inner, .. } => inner.matches_body(body),
        }
    }

    /// Check a compound instruction against this matcher.
    pub fn matches_compound(&self, tag: InstructionTag) -> bool {
        matches!(self, EventMatcher::CompoundOf(t) if *t == tag)
    }

    /// For composite-scoped matchers, the composite name they watch.
    pub fn composite_name(&self) -> Option<&str> {
        match self {
            EventMatcher::PartOf { composite, .. } => Some(composite),
            _ => None,
        }
    }
}

/// What happens instead when a replacement applies.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplacementAction {
    /// The event does not happen.
    Prevent,
    /// Add to (or subtract from) the event's magnitude, floor zero.
    Adjust(i32),
    /// Set the event's magnitude.
    SetAmount(u32),
    /// Send a zone-changing event somewhere else. Parameter-only: the
    /// event still occurs.
    ChangeDestination(Zone),
    /// Rewrite a compound's repetition count before expansion.
    SetRepetitions(u32),
}

/// A registered replacement effect.
#[derive(Debug, Clone)]
pub struct ReplacementEffect {
    pub id: ReplacementEffectId,
    /// The object that created this effect, if any.
    pub source: Option<ObjectId>,
    pub controller: Option<PlayerId>,
    pub matcher: EventMatcher,
    pub action: ReplacementAction,
}

impl ReplacementEffect {
    pub fn new(matcher: EventMatcher, action: ReplacementAction) -> Self {
        Self {
            id: ReplacementEffectId(0),
            source: None,
            controller: None,
            matcher,
            action,
        }
    }

    pub fn from_source(mut self, source: ObjectId, controller: PlayerId) -> Self {
        self.source = Some(source);
        self.controller = Some(controller);
        self
    }
}

/// Manages all replacement effects in a game.
#[derive(Debug, Clone, Default)]
pub struct ReplacementManager {
    effects: Vec<ReplacementEffect>,
    /// One-shot effects consumed after a single application.
    one_shot: HashSet<ReplacementEffectId>,
    next_id: u64,
}

impl ReplacementManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effects(&self) -> &[ReplacementEffect] {
        &self.effects
    }

    /// Register an effect. Application order is registration order.
    pub fn add(&mut self, mut effect: ReplacementEffect) -> ReplacementEffectId {
        self.next_id += 1;
        let id = ReplacementEffectId(self.next_id);
        effect.id = id;
        self.effects.push(effect);
        id
    }

    /// Register an effect consumed after one application.
    pub fn add_one_shot(&mut self, effect: ReplacementEffect) -> ReplacementEffectId {
        let id = self.add(effect);
        self.one_shot.insert(id);
        id
    }

    pub fn remove(&mut self, id: ReplacementEffectId) {
        self.effects.retain(|e| e.id != id);
        self.one_shot.remove(&id);
    }

    pub fn remove_from_source(&mut self, source: ObjectId) {
        let ids: Vec<ReplacementEffectId> = self
            .effects
            .iter()
            .filter(|e| e.source == Some(source))
            .map(|e| e.id)
            .collect();
        for id in ids {
            self.remove(id);
        }
    }

    pub fn get(&self, id: ReplacementEffectId) -> Option<&ReplacementEffect> {
        self.effects.iter().find(|e| e.id == id)
    }

    /// Effects applicable to an individual event, in registration order.
    pub fn applicable_to_body(&self, body: &EventBody) -> Vec<ReplacementEffectId> {
        self.effects
            .iter()
            .filter(|e| e.matcher.scope() == MatchScope::Individual && e.matcher.matches_body(body))
            .map(|e| e.id)
            .collect()
    }

    /// Effects applicable to a compound instruction as a whole.
    pub fn applicable_to_compound(&self, tag: InstructionTag) -> Vec<ReplacementEffectId> {
        self.effects
            .iter()
            .filter(|e| e.matcher.matches_compound(tag))
            .map(|e| e.id)
            .collect()
    }

    /// Effects applicable to a sub-event of the named composite.
    pub fn applicable_to_composite_part(
        &self,
        composite: &str,
        body: &EventBody,
    ) -> Vec<ReplacementEffectId> {
        self.effects
            .iter()
            .filter(|e| {
                e.matcher.composite_name() == Some(composite) && e.matcher.matches_body(body)
            })
            .map(|e| e.id)
            .collect()
    }

    /// Consume a one-shot effect after application. Returns true if the
    /// effect was one-shot and has been removed.
    pub fn mark_used(&mut self, id: ReplacementEffectId) -> bool {
        if self.one_shot.remove(&id) {
            self.effects.retain(|e| e.id != id);
            true
        } else {
            false
        }
    }
}
