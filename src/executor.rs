//! Effect execution and the event pipeline.
//!
//! Every state change flows through `fire_body`: no-op elision, the
//! tracked-state visibility check, the replacement pass, state application,
//! and occurrence recording. Compound instructions are rewritten as a whole
//! before expansion; an effect consumed at compound scope never also
//! rewrites the expanded individual events. Trigger collection happens once
//! per instruction record.

use std::collections::HashSet;

use tracing::debug;

use crate::effect::{Effect, InstructionTag, ValueExpr};
use crate::event::{CompoundRecord, CompositeRecord, EventBody, EventRecord, SingleRecord};
use crate::game_state::GameState;
use crate::decision::{BooleanContext, DecisionMaker};
use crate::ids::{ObjectId, PlayerId};
use crate::ledger::AssetKind;
use crate::object::Object;
use crate::replacement::{ReplacementAction, ReplacementEffectId};
use crate::stack::SourceHandle;
use crate::target::{Target, TargetSpec, Who};
use crate::trigger::TriggerQueue;
use crate::zone::Zone;

/// Errors during effect execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// A referenced object is gone and the effect cannot proceed at all.
    MissingObject(ObjectId),
    /// Internal consistency failure.
    Invariant(String),
}

/// Context for executing one layer's effects.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub source: SourceHandle,
    pub controller: PlayerId,
    /// Declared targets, locked when the layer was created.
    pub targets: Vec<Target>,
}

impl ExecutionContext {
    pub fn new(source: SourceHandle, controller: PlayerId) -> Self {
        Self {
            source,
            controller,
            targets: Vec::new(),
        }
    }

    pub fn with_targets(mut self, targets: Vec<Target>) -> Self {
        self.targets = targets;
        self
    }
}

/// Evaluate a dynamic value. An undeterminable value evaluates to zero.
pub fn resolve_value(game: &GameState, ctx: &ExecutionContext, expr: &ValueExpr) -> u32 {
    match expr {
        ValueExpr::Fixed(n) => *n,
        ValueExpr::SourceProperty(kind) => match game.object(ctx.source.id) {
            Some(obj) => obj.value(*kind).unwrap_or(0),
            None => ctx.source.snapshot.value(*kind).unwrap_or(0),
        },
        ValueExpr::SourceCounters(kind) => match game.object(ctx.source.id) {
            Some(obj) => obj.counters.count(kind),
            None => ctx.source.snapshot.counter_count(kind),
        },
    }
}

/// Resolve the players an effect addresses, in turn order from the
/// effect's controller.
fn resolve_players(game: &GameState, ctx: &ExecutionContext, who: Who) -> Vec<PlayerId> {
    match who {
        Who::You => vec![ctx.controller],
        Who::Opponent => vec![game.opponent(ctx.controller)],
        Who::EachPlayer => game.turn_order_from(ctx.controller),
    }
}

/// Resolve a target spec to concrete targets. Declared targets that no
/// longer resolve to a live object are dropped; last-known information is
/// never a valid target.
fn resolve_targets(game: &GameState, ctx: &ExecutionContext, spec: &TargetSpec) -> Vec<Target> {
    match spec {
        TargetSpec::None => Vec::new(),
        TargetSpec::YourHero => game
            .hero_of(ctx.controller)
            .map(|h| vec![Target::Object(h.id)])
            .unwrap_or_default(),
        TargetSpec::OpponentHero => game
            .hero_of(game.opponent(ctx.controller))
            .map(|h| vec![Target::Object(h.id)])
            .unwrap_or_default(),
        TargetSpec::AnyHero | TargetSpec::Object(_) => ctx
            .targets
            .iter()
            .filter(|t| match t {
                Target::Object(id) => game.object_exists(*id),
                Target::Player(_) => true,
            })
            .copied()
            .collect(),
    }
}

// ============================================================================
// The event pipeline
// ============================================================================

/// Whether this event can apply to the current state at all. Events that
/// cannot apply do not occur, are never replaced, and trigger nothing.
fn can_apply(game: &GameState, body: &EventBody) -> bool {
    match body {
        EventBody::DrawCard { player } => game.deck_size(*player) > 0,
        EventBody::ZoneMove { object, .. } => game.object_exists(*object),
        EventBody::Damage {
            target: Target::Object(object),
            ..
        } => game.object_exists(*object),
        EventBody::Damage {
            target: Target::Player(player),
            ..
        } => game.hero_of(*player).is_some(),
        EventBody::CountersAdded { object, .. }
        | EventBody::CountersRemoved { object, .. }
        | EventBody::ValueRaised { object, .. }
        | EventBody::ValueLowered { object, .. } => game.object_exists(*object),
        EventBody::PropertyGained { object, property } => game
            .object(*object)
            .is_some_and(|o| !o.has_property(*property)),
        EventBody::PropertyLost { object, property } => game
            .object(*object)
            .is_some_and(|o| o.has_property(*property)),
        EventBody::PitchCard { object, .. } | EventBody::DiscardCard { object, .. } => {
            game.object_exists(*object)
        }
        _ => true,
    }
}

/// Apply an event to the state. The body has already passed replacement.
fn apply_body(game: &mut GameState, body: &EventBody) {
    match body {
        EventBody::Damage { target, amount, .. } => match target {
            Target::Player(player) => {
                if let Some(hero) = game.hero_of(*player).map(|h| h.id) {
                    game.adjust_life(hero, -(*amount as i32));
                }
            }
            Target::Object(object) => game.adjust_life(*object, -(*amount as i32)),
        },
        EventBody::LifeGain { player, amount } => {
            if let Some(hero) = game.hero_of(*player).map(|h| h.id) {
                game.adjust_life(hero, *amount as i32);
            }
        }
        EventBody::LifeLoss { player, amount } => {
            if let Some(hero) = game.hero_of(*player).map(|h| h.id) {
                game.adjust_life(hero, -(*amount as i32));
            }
        }
        EventBody::DrawCard { player } => {
            game.draw_one(*player);
        }
        EventBody::PitchCard { object, .. } => {
            game.move_object(*object, Zone::Pitch);
        }
        EventBody::DiscardCard { object, .. } => {
            game.move_object(*object, Zone::Graveyard);
        }
        EventBody::ZoneMove { object, to, .. } => {
            game.move_object(*object, *to);
        }
        EventBody::CountersAdded {
            object,
            counter,
            count,
        } => {
            if let Some(obj) = game.object_mut(*object) {
                obj.add_counters(counter.clone(), *count);
            }
        }
        EventBody::CountersRemoved {
            object,
            counter,
            count,
        } => {
            if let Some(obj) = game.object_mut(*object) {
                obj.remove_counters(counter, *count);
            }
        }
        EventBody::PropertyGained { object, property } => {
            if let Some(obj) = game.object_mut(*object) {
                obj.properties.grant(*property);
            }
        }
        EventBody::PropertyLost { object, property } => {
            if let Some(obj) = game.object_mut(*object) {
                obj.properties.remove(*property);
            }
        }
        EventBody::ValueRaised {
            object,
            property,
            amount,
            base,
        } => {
            if let Some(obj) = game.object_mut(*object) {
                let value = obj.properties.numeric_mut(*property);
                if *base {
                    value.adjust_base(*amount as i32);
                } else {
                    value.adjust_modifier(*amount as i32);
                }
            }
        }
        EventBody::ValueLowered {
            object,
            property,
            amount,
            base,
        } => {
            if let Some(obj) = game.object_mut(*object) {
                let value = obj.properties.numeric_mut(*property);
                if *base {
                    value.adjust_base(-(*amount as i32));
                } else {
                    value.adjust_modifier(-(*amount as i32));
                }
            }
        }
        EventBody::AssetGained {
            player,
            kind,
            amount,
        } => {
            game.ledger.credit(*player, *kind, *amount);
        }
        EventBody::TokenCreated { .. } => {}
        EventBody::LookBegun { source } => {
            game.pending_look_effects.retain(|id| id != source);
            if !game.active_look_effects.contains(source) {
                game.active_look_effects.push(*source);
            }
        }
        EventBody::CombatChainClosed => {}
        EventBody::RuleChanged { .. } => {}
        EventBody::DeckShuffled { player } => {
            game.shuffle_deck(*player);
        }
    }
}

/// Run one event through the pipeline. `composite` names the enclosing
/// composite instruction, if any; `excluded` holds replacement effects
/// already consumed at compound scope.
pub fn fire_body(
    game: &mut GameState,
    body: EventBody,
    composite: Option<&str>,
    excluded: &HashSet<ReplacementEffectId>,
) -> SingleRecord {
    // No-op instructions never occur: no replacement, no triggers.
    if body.is_noop() || !can_apply(game, &body) {
        return SingleRecord {
            body,
            occurred: false,
            intercepted: false,
        };
    }

    // Untracked state is invisible to the interception machinery.
    if !body.is_tracked() {
        apply_body(game, &body);
        return SingleRecord {
            body,
            occurred: true,
            intercepted: false,
        };
    }

    let mut body = body;
    let mut applied: HashSet<ReplacementEffectId> = HashSet::new();

    loop {
        let mut candidates = game.replacements.applicable_to_body(&body);
        if let Some(name) = composite {
            candidates.extend(game.replacements.applicable_to_composite_part(name, &body));
        }
        let Some(next) = candidates
            .into_iter()
            .find(|id| !applied.contains(id) && !excluded.contains(id))
        else {
            break;
        };
        applied.insert(next);

        let action = match game.replacements.get(next) {
            Some(effect) => effect.action.clone(),
            None => continue,
        };
        game.replacements.mark_used(next);
        debug!(?action, event = ?body.kind(), "replacement applied");

        match action {
            ReplacementAction::Prevent => {
                return SingleRecord {
                    body,
                    occurred: false,
                    intercepted: true,
                };
            }
            ReplacementAction::Adjust(delta) => {
                let current = body.amount().unwrap_or(0) as i64;
                let adjusted = (current + delta as i64).max(0) as u32;
                body.set_amount(adjusted);
                if adjusted == 0 {
                    // Reduced to nothing: the event no longer occurs.
                    return SingleRecord {
                        body,
                        occurred: false,
                        intercepted: true,
                    };
                }
            }
            ReplacementAction::SetAmount(amount) => {
                body.set_amount(amount);
                if amount == 0 {
                    return SingleRecord {
                        body,
                        occurred: false,
                        intercepted: true,
                    };
                }
            }
            ReplacementAction::ChangeDestination(zone) => {
                // Parameter-only alteration: the event still occurs.
                body.set_destination(zone);
            }
            ReplacementAction::SetRepetitions(_) => {
                // Compound-scope action; meaningless on an individual event.
            }
        }
    }

    apply_body(game, &body);
    SingleRecord {
        body,
        occurred: true,
        intercepted: false,
    }
}

// ============================================================================
// Effect execution
// ============================================================================

/// Build the event bodies for one elementary effect. The number of bodies
/// may exceed one (multi-target, multi-player).
fn bodies_for(
    game: &mut GameState,
    ctx: &ExecutionContext,
    effect: &Effect,
) -> Vec<EventBody> {
    match effect {
        Effect::DealDamage { target, amount } => {
            let amount = resolve_value(game, ctx, amount);
            resolve_targets(game, ctx, target)
                .into_iter()
                .map(|t| EventBody::Damage {
                    source: Some(ctx.source.id),
                    target: t,
                    amount,
                })
                .collect()
        }
        Effect::GainLife { who, amount } => {
            let amount = resolve_value(game, ctx, amount);
            resolve_players(game, ctx, *who)
                .into_iter()
                .map(|player| EventBody::LifeGain { player, amount })
                .collect()
        }
        Effect::LoseLife { who, amount } => {
            let amount = resolve_value(game, ctx, amount);
            resolve_players(game, ctx, *who)
                .into_iter()
                .map(|player| EventBody::LifeLoss { player, amount })
                .collect()
        }
        Effect::GainAsset { who, kind, amount } => {
            let amount = resolve_value(game, ctx, amount);
            resolve_players(game, ctx, *who)
                .into_iter()
                .map(|player| match kind {
                    AssetKind::Life => EventBody::LifeGain { player, amount },
                    _ => EventBody::AssetGained {
                        player,
                        kind: *kind,
                        amount,
                    },
                })
                .collect()
        }
        Effect::AddCounters {
            target,
            counter,
            count,
        } => {
            let count = resolve_value(game, ctx, count);
            resolve_targets(game, ctx, target)
                .into_iter()
                .filter_map(|t| match t {
                    Target::Object(object) => Some(EventBody::CountersAdded {
                        object,
                        counter: counter.clone(),
                        count,
                    }),
                    Target::Player(_) => None,
                })
                .collect()
        }
        Effect::RemoveCounters {
            target,
            counter,
            count,
        } => {
            let count = resolve_value(game, ctx, count);
            resolve_targets(game, ctx, target)
                .into_iter()
                .filter_map(|t| match t {
                    Target::Object(object) => Some(EventBody::CountersRemoved {
                        object,
                        counter: counter.clone(),
                        count,
                    }),
                    Target::Player(_) => None,
                })
                .collect()
        }
        Effect::MoveTo { target, zone } => resolve_targets(game, ctx, target)
            .into_iter()
            .filter_map(|t| match t {
                Target::Object(object) => {
                    let from = game.object(object)?.zone;
                    Some(EventBody::ZoneMove {
                        object,
                        from,
                        to: *zone,
                    })
                }
                Target::Player(_) => None,
            })
            .collect(),
        Effect::Destroy { target } => resolve_targets(game, ctx, target)
            .into_iter()
            .filter_map(|t| match t {
                Target::Object(object) => {
                    let from = game.object(object)?.zone;
                    Some(EventBody::ZoneMove {
                        object,
                        from,
                        to: Zone::Graveyard,
                    })
                }
                Target::Player(_) => None,
            })
            .collect(),
        Effect::GainProperty { target, property } => resolve_targets(game, ctx, target)
            .into_iter()
            .filter_map(|t| match t {
                Target::Object(object) => Some(EventBody::PropertyGained {
                    object,
                    property: *property,
                }),
                Target::Player(_) => None,
            })
            .collect(),
        Effect::LoseProperty { target, property } => resolve_targets(game, ctx, target)
            .into_iter()
            .filter_map(|t| match t {
                Target::Object(object) => Some(EventBody::PropertyLost {
                    object,
                    property: *property,
                }),
                Target::Player(_) => None,
            })
            .collect(),
        Effect::ChangeValue {
            target,
            property,
            delta,
            base,
        } => resolve_targets(game, ctx, target)
            .into_iter()
            .filter_map(|t| match t {
                Target::Object(object) => Some(if *delta >= 0 {
                    EventBody::ValueRaised {
                        object,
                        property: *property,
                        amount: *delta as u32,
                        base: *base,
                    }
                } else {
                    EventBody::ValueLowered {
                        object,
                        property: *property,
                        amount: (-*delta) as u32,
                        base: *base,
                    }
                }),
                Target::Player(_) => None,
            })
            .collect(),
        Effect::Govern(directive) => {
            let mut directive = directive.clone();
            directive.source = directive.source.or(Some(ctx.source.id));
            game.precedence.register(directive);
            vec![EventBody::RuleChanged {
                source: Some(ctx.source.id),
            }]
        }
        Effect::CreateToken { name, who } => resolve_players(game, ctx, *who)
            .into_iter()
            .map(|player| {
                let token = Object::new_token(
                    ObjectId::new(),
                    player,
                    name.clone(),
                    vec![crate::types::CardType::Token],
                    Vec::new(),
                );
                let id = game.register_object(token);
                EventBody::TokenCreated { object: id }
            })
            .collect(),
        Effect::ShuffleDeck { who } => resolve_players(game, ctx, *who)
            .into_iter()
            .map(|player| EventBody::DeckShuffled { player })
            .collect(),
        // Compounds, composites, and searches are handled in execute_effect.
        Effect::Draw { .. }
        | Effect::Repeat { .. }
        | Effect::EachPlayer(_)
        | Effect::Composite { .. }
        | Effect::SearchDeck { .. } => Vec::new(),
    }
}

/// The innermost elementary tag of an effect, for compound records.
fn leaf_tag(effect: &Effect) -> Option<InstructionTag> {
    if let Some(tag) = effect.tag() {
        return Some(tag);
    }
    match effect {
        Effect::Repeat { effect, .. } | Effect::EachPlayer(effect) => leaf_tag(effect),
        Effect::Composite { parts, .. } => parts.iter().find_map(leaf_tag),
        _ => None,
    }
}

/// Rewrite a compound's repetition count through compound-scope
/// replacements. Consumed effects go into `excluded` so they cannot also
/// rewrite the expanded individual events.
fn rewrite_compound(
    game: &mut GameState,
    tag: InstructionTag,
    requested: u32,
    excluded: &mut HashSet<ReplacementEffectId>,
) -> u32 {
    let mut count = requested;
    for id in game.replacements.applicable_to_compound(tag) {
        if excluded.contains(&id) {
            continue;
        }
        let action = match game.replacements.get(id) {
            Some(effect) => effect.action.clone(),
            None => continue,
        };
        excluded.insert(id);
        game.replacements.mark_used(id);
        match action {
            ReplacementAction::SetRepetitions(n) => count = n,
            ReplacementAction::Adjust(delta) => {
                count = (count as i64 + delta as i64).max(0) as u32;
            }
            ReplacementAction::SetAmount(n) => count = n,
            // Preventing a compound rewrites it to zero repetitions; the
            // compound itself is still recorded.
            ReplacementAction::Prevent => count = 0,
            ReplacementAction::ChangeDestination(_) => {}
        }
    }
    count
}

/// Execute one effect, producing its event record. Returns `None` when
/// nothing happened and nothing is visible (no resolvable bodies, or a
/// silently failed unverifiable instruction).
pub fn execute_effect(
    game: &mut GameState,
    queue: &mut TriggerQueue,
    dm: &mut dyn DecisionMaker,
    ctx: &ExecutionContext,
    effect: &Effect,
) -> Result<Option<EventRecord>, ExecutionError> {
    let record = match effect {
        Effect::Draw { who, count } => {
            let requested = resolve_value(game, ctx, count);
            let players = resolve_players(game, ctx, *who);
            let mut excluded = HashSet::new();
            let count = rewrite_compound(game, InstructionTag::Draw, requested, &mut excluded);
            let mut parts = Vec::new();
            for player in players {
                for _ in 0..count {
                    let record = fire_body(
                        game,
                        EventBody::DrawCard { player },
                        None,
                        &excluded,
                    );
                    parts.push(EventRecord::Single(record));
                }
            }
            Some(EventRecord::Compound(CompoundRecord {
                tag: InstructionTag::Draw,
                requested,
                parts,
            }))
        }
        Effect::Repeat { count, effect } => {
            let Some(tag) = leaf_tag(effect) else {
                return Ok(None);
            };
            let requested = resolve_value(game, ctx, count);
            let mut excluded = HashSet::new();
            let count = rewrite_compound(game, tag, requested, &mut excluded);
            let mut parts = Vec::new();
            for _ in 0..count {
                for body in bodies_for(game, ctx, effect) {
                    let record = fire_body(game, body, None, &excluded);
                    parts.push(EventRecord::Single(record));
                }
            }
            Some(EventRecord::Compound(CompoundRecord {
                tag,
                requested,
                parts,
            }))
        }
        Effect::EachPlayer(inner) => {
            // Performed in turn order from this effect's controller.
            let Some(tag) = leaf_tag(inner) else {
                return Ok(None);
            };
            let mut excluded = HashSet::new();
            let requested = game.turn_order_from(ctx.controller).len() as u32;
            let count = rewrite_compound(game, tag, requested, &mut excluded);
            let mut parts = Vec::new();
            for player in game.turn_order_from(ctx.controller).into_iter().take(count as usize) {
                let per_player = ExecutionContext {
                    source: ctx.source.clone(),
                    controller: player,
                    targets: ctx.targets.clone(),
                };
                for body in bodies_for(game, &per_player, inner) {
                    let record = fire_body(game, body, None, &excluded);
                    parts.push(EventRecord::Single(record));
                }
            }
            Some(EventRecord::Compound(CompoundRecord {
                tag,
                requested,
                parts,
            }))
        }
        Effect::Composite { name, parts } => {
            let excluded = HashSet::new();
            let mut records = Vec::new();
            for part in parts {
                for body in bodies_for(game, ctx, part) {
                    let record = fire_body(game, body, Some(name), &excluded);
                    records.push(EventRecord::Single(record));
                }
            }
            // Recorded as occurred unless every internal sub-event was
            // fully replaced away.
            let occurred = records.iter().any(|r| r.occurred());
            Some(EventRecord::Composite(CompositeRecord {
                name: name.clone(),
                occurred,
                parts: records,
            }))
        }
        Effect::SearchDeck { who, filter, to } => {
            let player = resolve_players(game, ctx, *who)
                .into_iter()
                .next()
                .unwrap_or(ctx.controller);
            // The opponent cannot verify the outcome; the acting player may
            // silently fail the instruction.
            let declined = dm.decline_unverifiable(
                game,
                &BooleanContext {
                    player,
                    prompt: "Fail to find in deck search?".to_string(),
                },
            );
            if declined {
                return Ok(None);
            }
            let found = game.player(player).and_then(|p| {
                p.deck
                    .iter()
                    .rev()
                    .copied()
                    .find(|id| game.object(*id).is_some_and(|o| object_matches(o, filter)))
            });
            let Some(card) = found else {
                return Ok(None);
            };
            let excluded = HashSet::new();
            let move_record = fire_body(
                game,
                EventBody::ZoneMove {
                    object: card,
                    from: Zone::Deck,
                    to: *to,
                },
                Some("search"),
                &excluded,
            );
            let shuffle_record = fire_body(
                game,
                EventBody::DeckShuffled { player },
                Some("search"),
                &excluded,
            );
            let occurred = move_record.occurred;
            Some(EventRecord::Composite(CompositeRecord {
                name: "search".to_string(),
                occurred,
                parts: vec![
                    EventRecord::Single(move_record),
                    EventRecord::Single(shuffle_record),
                ],
            }))
        }
        _ => {
            let bodies = bodies_for(game, ctx, effect);
            match bodies.len() {
                0 => None,
                1 => {
                    let excluded = HashSet::new();
                    let body = bodies.into_iter().next().unwrap();
                    Some(EventRecord::Single(fire_body(game, body, None, &excluded)))
                }
                _ => {
                    // Multi-target / multi-player instructions expand as a
                    // compound performed in order.
                    let Some(tag) = effect.tag() else {
                        return Ok(None);
                    };
                    let mut excluded = HashSet::new();
                    let requested = bodies.len() as u32;
                    let count = rewrite_compound(game, tag, requested, &mut excluded);
                    let mut parts = Vec::new();
                    for body in bodies.into_iter().take(count as usize) {
                        let record = fire_body(game, body, None, &excluded);
                        parts.push(EventRecord::Single(record));
                    }
                    Some(EventRecord::Compound(CompoundRecord {
                        tag,
                        requested,
                        parts,
                    }))
                }
            }
        }
    };

    if let Some(record) = &record {
        queue.collect(game, record);
    }
    Ok(record)
}

pub(crate) fn object_matches(obj: &Object, filter: &crate::target::ObjectFilter) -> bool {
    if let Some(name) = &filter.name
        && obj.name != *name
    {
        return false;
    }
    if !filter.card_types.is_empty()
        && !filter.card_types.iter().any(|t| obj.has_card_type(*t))
    {
        return false;
    }
    if !filter.subtypes.is_empty() && !filter.subtypes.iter().any(|s| obj.has_subtype(*s)) {
        return false;
    }
    true
}

/// Execute a list of effects in order, collecting their records.
pub fn execute_effects(
    game: &mut GameState,
    queue: &mut TriggerQueue,
    dm: &mut dyn DecisionMaker,
    ctx: &ExecutionContext,
    effects: &[Effect],
) -> Result<Vec<EventRecord>, ExecutionError> {
    let mut records = Vec::new();
    for effect in effects {
        if let Some(record) = execute_effect(game, queue, dm, ctx, effect)? {
            records.push(record);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardBuilder;
    use crate::decision::AutoDecisionMaker;
    use crate::event::EventKind;
    use crate::ids::CardId;
    use crate::property::PropertyKind;
    use crate::replacement::{EventMatcher, ReplacementEffect};
    use crate::types::CardType;

    fn setup() -> (GameState, TriggerQueue, ExecutionContext) {
        let mut game = GameState::new(vec!["Alice".to_string(), "Bob".to_string()], 20);
        let p0 = PlayerId::from_index(0);
        let hero = game.hero_of(p0).unwrap().clone();
        let ctx = ExecutionContext::new(SourceHandle::of(&hero), p0);
        (game, TriggerQueue::new(), ctx)
    }

    fn stock_deck(game: &mut GameState, player: PlayerId, count: usize) {
        for i in 0..count {
            let def = CardBuilder::new(CardId::new(), &format!("Filler {i}"))
                .card_types(vec![CardType::Action])
                .pitch(1)
                .build();
            game.create_object_from_definition(&def, player, Zone::Deck);
        }
    }

    #[test]
    fn test_zero_damage_never_occurs() {
        let (mut game, mut queue, ctx) = setup();
        let mut dm = AutoDecisionMaker;

        // A replacement watching damage must not see the no-op.
        game.replacements.add(ReplacementEffect::new(
            EventMatcher::Kind(EventKind::Damage),
            ReplacementAction::Adjust(5),
        ));

        let record = execute_effect(
            &mut game,
            &mut queue,
            &mut dm,
            &ctx,
            &Effect::DealDamage {
                target: TargetSpec::OpponentHero,
                amount: ValueExpr::fixed(0),
            },
        )
        .unwrap()
        .unwrap();

        assert!(!record.occurred());
        assert_eq!(game.hero_life(PlayerId::from_index(1)), Some(20));
    }

    #[test]
    fn test_draw_with_short_deck() {
        let (mut game, mut queue, ctx) = setup();
        let mut dm = AutoDecisionMaker;
        let p0 = PlayerId::from_index(0);
        stock_deck(&mut game, p0, 1);

        let record = execute_effect(
            &mut game,
            &mut queue,
            &mut dm,
            &ctx,
            &Effect::Draw {
                who: Who::You,
                count: ValueExpr::fixed(3),
            },
        )
        .unwrap()
        .unwrap();

        let singles = record.singles();
        assert_eq!(singles.len(), 3);
        assert_eq!(singles.iter().filter(|s| s.occurred).count(), 1);
        assert_eq!(game.player(p0).unwrap().hand.len(), 1);
    }

    #[test]
    fn test_compound_replacement_consumed_before_expansion() {
        let (mut game, mut queue, ctx) = setup();
        let mut dm = AutoDecisionMaker;
        let p0 = PlayerId::from_index(0);
        stock_deck(&mut game, p0, 5);

        // Rewrites "draw N" to "draw 1" as a whole.
        game.replacements.add(ReplacementEffect::new(
            EventMatcher::CompoundOf(InstructionTag::Draw),
            ReplacementAction::SetRepetitions(1),
        ));

        let record = execute_effect(
            &mut game,
            &mut queue,
            &mut dm,
            &ctx,
            &Effect::Draw {
                who: Who::You,
                count: ValueExpr::fixed(3),
            },
        )
        .unwrap()
        .unwrap();

        assert_eq!(record.singles().len(), 1);
        assert_eq!(game.player(p0).unwrap().hand.len(), 1);
    }

    #[test]
    fn test_damage_adjust_replacement() {
        let (mut game, mut queue, ctx) = setup();
        let mut dm = AutoDecisionMaker;
        let p1 = PlayerId::from_index(1);

        game.replacements.add(ReplacementEffect::new(
            EventMatcher::DamageToPlayer(p1),
            ReplacementAction::Adjust(-2),
        ));

        execute_effect(
            &mut game,
            &mut queue,
            &mut dm,
            &ctx,
            &Effect::DealDamage {
                target: TargetSpec::OpponentHero,
                amount: ValueExpr::fixed(5),
            },
        )
        .unwrap();

        assert_eq!(game.hero_life(p1), Some(17), "5 damage reduced to 3");
    }

    #[test]
    fn test_composite_fully_replaced_away() {
        let (mut game, mut queue, ctx) = setup();
        let mut dm = AutoDecisionMaker;
        let p1 = PlayerId::from_index(1);

        game.replacements.add(ReplacementEffect::new(
            EventMatcher::PartOf {
                composite: "reckoning".to_string(),
                inner: Box::new(EventMatcher::Kind(EventKind::Damage)),
            },
            ReplacementAction::Prevent,
        ));

        let record = execute_effect(
            &mut game,
            &mut queue,
            &mut dm,
            &ctx,
            &Effect::Composite {
                name: "reckoning".to_string(),
                parts: vec![Effect::DealDamage {
                    target: TargetSpec::OpponentHero,
                    amount: ValueExpr::fixed(4),
                }],
            },
        )
        .unwrap()
        .unwrap();

        assert!(!record.occurred(), "fully replaced away: not occurred");
        assert_eq!(game.hero_life(p1), Some(20));
    }

    #[test]
    fn test_composite_parameter_alteration_still_occurs() {
        let (mut game, mut queue, ctx) = setup();
        let mut dm = AutoDecisionMaker;
        let p0 = PlayerId::from_index(0);

        let def = CardBuilder::new(CardId::new(), "Relic")
            .card_types(vec![CardType::Action])
            .build();
        let relic = game.create_object_from_definition(&def, p0, Zone::Arena);

        game.replacements.add(ReplacementEffect::new(
            EventMatcher::PartOf {
                composite: "entomb".to_string(),
                inner: Box::new(EventMatcher::WouldMoveTo(Zone::Graveyard)),
            },
            ReplacementAction::ChangeDestination(Zone::Banished),
        ));

        let record = execute_effect(
            &mut game,
            &mut queue,
            &mut dm,
            &ctx,
            &Effect::Composite {
                name: "entomb".to_string(),
                parts: vec![Effect::Destroy {
                    target: TargetSpec::Object(crate::target::ObjectFilter::any()),
                }],
            },
        )
        .unwrap();

        // Destroy needs a declared target.
        assert!(record.is_none() || !record.unwrap().occurred());

        let ctx = ctx.with_targets(vec![Target::Object(relic)]);
        let record = execute_effect(
            &mut game,
            &mut queue,
            &mut dm,
            &ctx,
            &Effect::Composite {
                name: "entomb".to_string(),
                parts: vec![Effect::Destroy {
                    target: TargetSpec::Object(crate::target::ObjectFilter::any()),
                }],
            },
        )
        .unwrap()
        .unwrap();

        assert!(record.occurred(), "parameter-only alteration still occurs");
        assert_eq!(game.object(relic).unwrap().zone, Zone::Banished);
    }

    #[test]
    fn test_each_player_performed_in_turn_order() {
        let (mut game, mut queue, ctx) = setup();
        let mut dm = AutoDecisionMaker;

        let record = execute_effect(
            &mut game,
            &mut queue,
            &mut dm,
            &ctx,
            &Effect::EachPlayer(Box::new(Effect::LoseLife {
                who: Who::You,
                amount: ValueExpr::fixed(1),
            })),
        )
        .unwrap()
        .unwrap();

        assert_eq!(record.singles().len(), 2);
        assert_eq!(game.hero_life(PlayerId::from_index(0)), Some(19));
        assert_eq!(game.hero_life(PlayerId::from_index(1)), Some(19));
    }

    #[test]
    fn test_untracked_shuffle_invisible_to_replacements() {
        let (mut game, mut queue, ctx) = setup();
        let mut dm = AutoDecisionMaker;
        let p0 = PlayerId::from_index(0);
        stock_deck(&mut game, p0, 3);

        // A Prevent watching everything by kind cannot see untracked events.
        game.replacements.add(ReplacementEffect::new(
            EventMatcher::Kind(EventKind::DeckShuffled),
            ReplacementAction::Prevent,
        ));

        let record = execute_effect(
            &mut game,
            &mut queue,
            &mut dm,
            &ctx,
            &Effect::ShuffleDeck { who: Who::You },
        )
        .unwrap()
        .unwrap();

        assert!(record.occurred(), "shuffle happens despite the matcher");
    }

    #[test]
    fn test_dynamic_value_falls_back_to_lki() {
        let (mut game, mut queue, ctx) = setup();
        let mut dm = AutoDecisionMaker;
        let p0 = PlayerId::from_index(0);
        let p1 = PlayerId::from_index(1);

        let def = CardBuilder::new(CardId::new(), "Blade")
            .card_types(vec![CardType::Action])
            .power(3)
            .build();
        let blade = game.create_object_from_definition(&def, p0, Zone::Arena);
        let blade_obj = game.object(blade).unwrap().clone();
        let ctx = ExecutionContext::new(SourceHandle::of(&blade_obj), ctx.controller);

        // Source ceases to exist; the layer still resolves from LKI.
        game.cease_to_exist(blade);

        execute_effect(
            &mut game,
            &mut queue,
            &mut dm,
            &ctx,
            &Effect::DealDamage {
                target: TargetSpec::OpponentHero,
                amount: ValueExpr::SourceProperty(PropertyKind::Power),
            },
        )
        .unwrap();

        assert_eq!(game.hero_life(p1), Some(17), "damage from snapshot power");
    }
}
