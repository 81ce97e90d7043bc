//! The game-state-action pass: the fixed automatic-check sequence.
//!
//! Whenever the game would settle into a new priority state, this pass runs
//! first. Each step is an atomic simultaneous event across all qualifying
//! objects, in a fixed order: (1) heroes at zero life end the game, (2)
//! remaining non-hero living objects at zero life are cleared
//! simultaneously, (3) continuous "look" effects begin, (4) state-based
//! triggered effects fire and queue onto the stack in turn order from the
//! turn-holder, (5) the combat-chain close step runs if something has
//! closed the chain. The ordering is load-bearing: hero death always
//! resolves before generic zero-life clearing.

use std::collections::HashSet;

use tracing::debug;

use crate::decision::{DecisionMaker, OrderContext};
use crate::event::{EventBody, EventRecord};
use crate::executor::fire_body;
use crate::game_state::{GameOutcome, GameState};
use crate::ids::{ObjectId, PlayerId};
use crate::object::ObjectKind;
use crate::snapshot::ObjectSnapshot;
use crate::stack::Layer;
use crate::trigger::TriggerQueue;
use crate::types::Keyword;
use crate::zone::Zone;

/// Result of a game-state-action pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GsaOutcome {
    /// The pass reached a fixed point; play continues.
    Stable,
    /// Step 1 ended the game.
    GameOver(GameOutcome),
}

/// Run the fixed five-step sequence until no step acts.
pub fn run_game_state_actions(
    game: &mut GameState,
    queue: &mut TriggerQueue,
    dm: &mut dyn DecisionMaker,
) -> GsaOutcome {
    loop {
        // Step 1: any hero at zero life ends the game. Single death is a
        // loss for its controller; simultaneous deaths are a draw.
        let dead: Vec<PlayerId> = game
            .turn_order
            .iter()
            .copied()
            .filter(|p| game.hero_life(*p) == Some(0))
            .collect();
        if !dead.is_empty() {
            let outcome = if dead.len() >= game.players_in_game() {
                GameOutcome::Draw
            } else {
                let loser = dead[0];
                GameOutcome::Win {
                    winner: game.opponent(loser),
                    loser,
                }
            };
            debug!(?outcome, "hero death ends the game");
            game.outcome = Some(outcome);
            return GsaOutcome::GameOver(outcome);
        }

        let mut acted = false;

        // Step 2: non-hero living objects at zero life are cleared
        // simultaneously. Snapshots are captured before any of them move,
        // so each reflects the state before the whole clearing.
        let dying: Vec<ObjectId> = game
            .objects_in_arena()
            .iter()
            .filter(|o| !o.is_hero() && o.is_living() && o.life() == Some(0))
            .map(|o| o.id)
            .collect();
        if !dying.is_empty() {
            acted = true;
            let pre_captured: Vec<(ObjectId, ObjectSnapshot)> = dying
                .iter()
                .filter_map(|id| game.object(*id).map(|o| (*id, ObjectSnapshot::capture(o))))
                .collect();
            let excluded = HashSet::new();
            for &id in &dying {
                let Some(obj) = game.object(id) else { continue };
                let is_card = obj.kind == ObjectKind::Card;
                let record = fire_body(
                    game,
                    EventBody::ZoneMove {
                        object: id,
                        from: Zone::Arena,
                        to: Zone::Graveyard,
                    },
                    None,
                    &excluded,
                );
                let record = EventRecord::Single(record);
                queue.collect(game, &record);
                if !is_card {
                    // Token/macro clearing captured LKI at removal; replace
                    // it with the simultaneous pre-capture.
                    if let Some((_, snapshot)) =
                        pre_captured.iter().find(|(pre_id, _)| *pre_id == id)
                    {
                        game.store_lki(id, snapshot.clone());
                    }
                }
            }
        }

        // Step 3: continuous "look" effects may begin.
        let pending_looks: Vec<ObjectId> = game.pending_look_effects.clone();
        if !pending_looks.is_empty() {
            acted = true;
            let excluded = HashSet::new();
            for source in pending_looks {
                let record = fire_body(game, EventBody::LookBegun { source }, None, &excluded);
                queue.collect(game, &EventRecord::Single(record));
            }
        }

        // Step 4: state-based triggered effects whose condition now holds
        // fire, queued onto the stack in turn order from the turn-holder.
        queue.collect_state_triggers(game);
        if !queue.is_empty() {
            acted = true;
            let pending = queue.drain();
            for player in game.turn_order_from(game.turn.turn_player) {
                let mut own: Vec<_> = pending
                    .iter()
                    .filter(|t| t.player == player)
                    .cloned()
                    .collect();
                if own.len() > 1 {
                    let order = dm.decide_order(
                        game,
                        &OrderContext {
                            player,
                            count: own.len(),
                            prompt: "Order your triggered effects".to_string(),
                        },
                    );
                    let mut reordered = Vec::with_capacity(own.len());
                    for index in order {
                        if index < own.len() {
                            reordered.push(own[index].clone());
                        }
                    }
                    if reordered.len() == own.len() {
                        own = reordered;
                    }
                }
                for trigger in own {
                    game.stack.push(Layer::triggered_layer(trigger));
                }
            }
        }

        // Step 5: if combat is open and something has closed it, the close
        // step begins.
        if game.combat.pending_close() {
            acted = true;
            close_combat_chain(game, queue);
        }

        if !acted {
            return GsaOutcome::Stable;
        }
    }
}

/// The combat-chain close step: chain cards leave for their owners'
/// graveyards and the chain empties.
fn close_combat_chain(game: &mut GameState, queue: &mut TriggerQueue) {
    let links = game.combat.close();
    let excluded = HashSet::new();
    for link in &links {
        let mut chain_cards = vec![link.attack];
        chain_cards.extend(link.defenders.iter().copied());
        for card in chain_cards {
            let Some(obj) = game.object(card) else { continue };
            if obj.zone != Zone::Arena {
                continue;
            }
            // Heroes and equipment stay in the arena; played cards leave.
            if obj.is_hero() || obj.has_card_type(crate::types::CardType::Equipment) {
                continue;
            }
            let record = fire_body(
                game,
                EventBody::ZoneMove {
                    object: card,
                    from: Zone::Arena,
                    to: Zone::Graveyard,
                },
                None,
                &excluded,
            );
            queue.collect(game, &EventRecord::Single(record));
        }
    }
    let record = fire_body(game, EventBody::CombatChainClosed, None, &excluded);
    queue.collect(game, &EventRecord::Single(record));
}

/// Whether an attack grants its action point back when its link resolves.
pub fn refunds_action_point(game: &GameState, attack: ObjectId) -> bool {
    game.object(attack)
        .map(|o| o.has_keyword(Keyword::GoAgain))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::Ability;
    use crate::card::CardBuilder;
    use crate::decision::AutoDecisionMaker;
    use crate::effect::{Effect, ValueExpr};
    use crate::ids::CardId;
    use crate::target::Who;
    use crate::trigger::{StateCondition, TriggerCondition};
    use crate::types::CardType;

    fn setup() -> (GameState, TriggerQueue) {
        (
            GameState::new(vec!["Alice".to_string(), "Bob".to_string()], 20),
            TriggerQueue::new(),
        )
    }

    #[test]
    fn test_stable_when_nothing_qualifies() {
        let (mut game, mut queue) = setup();
        let mut dm = AutoDecisionMaker;
        assert_eq!(
            run_game_state_actions(&mut game, &mut queue, &mut dm),
            GsaOutcome::Stable
        );
    }

    #[test]
    fn test_single_hero_death_is_loss() {
        let (mut game, mut queue) = setup();
        let mut dm = AutoDecisionMaker;
        let p0 = PlayerId::from_index(0);
        let p1 = PlayerId::from_index(1);

        let hero = game.hero_of(p0).unwrap().id;
        game.adjust_life(hero, -20);

        let outcome = run_game_state_actions(&mut game, &mut queue, &mut dm);
        assert_eq!(
            outcome,
            GsaOutcome::GameOver(GameOutcome::Win {
                winner: p1,
                loser: p0
            })
        );
    }

    #[test]
    fn test_simultaneous_hero_deaths_draw() {
        let (mut game, mut queue) = setup();
        let mut dm = AutoDecisionMaker;

        for player in [PlayerId::from_index(0), PlayerId::from_index(1)] {
            let hero = game.hero_of(player).unwrap().id;
            game.adjust_life(hero, -20);
        }
        let outcome = run_game_state_actions(&mut game, &mut queue, &mut dm);
        assert_eq!(outcome, GsaOutcome::GameOver(GameOutcome::Draw));
    }

    #[test]
    fn test_hero_death_resolves_before_object_clearing() {
        let (mut game, mut queue) = setup();
        let mut dm = AutoDecisionMaker;
        let p0 = PlayerId::from_index(0);

        // A dying ally shares the moment with a dying hero.
        let def = CardBuilder::new(CardId::new(), "Ally")
            .card_types(vec![CardType::Token])
            .life(1)
            .build();
        let ally = game.create_object_from_definition(&def, p0, Zone::Arena);
        game.adjust_life(ally, -1);
        let hero = game.hero_of(p0).unwrap().id;
        game.adjust_life(hero, -20);

        let outcome = run_game_state_actions(&mut game, &mut queue, &mut dm);
        assert!(matches!(outcome, GsaOutcome::GameOver(_)));
        // Step 1 ended the game before step 2 touched the ally.
        assert!(game.object_exists(ally));
    }

    #[test]
    fn test_zero_life_objects_cleared_simultaneously() {
        let (mut game, mut queue) = setup();
        let mut dm = AutoDecisionMaker;
        let p0 = PlayerId::from_index(0);

        let def = CardBuilder::new(CardId::new(), "Ally")
            .card_types(vec![CardType::Token])
            .power(2)
            .life(2)
            .build();
        let first = game.create_object_from_definition(&def, p0, Zone::Arena);
        let second = game.create_object_from_definition(&def, p0, Zone::Arena);
        game.adjust_life(first, -2);
        game.adjust_life(second, -2);

        run_game_state_actions(&mut game, &mut queue, &mut dm);
        assert!(!game.object_exists(first));
        assert!(!game.object_exists(second));
        // Pre-captured LKI reflects the state before the clearing.
        assert_eq!(game.lki(first).unwrap().power(), Some(2));
    }

    #[test]
    fn test_look_effects_begin_in_step_three() {
        let (mut game, mut queue) = setup();
        let mut dm = AutoDecisionMaker;
        let p0 = PlayerId::from_index(0);

        let def = CardBuilder::new(CardId::new(), "Spyglass")
            .card_types(vec![CardType::Equipment])
            .build();
        let glass = game.create_object_from_definition(&def, p0, Zone::Arena);
        game.pending_look_effects.push(glass);

        run_game_state_actions(&mut game, &mut queue, &mut dm);
        assert!(game.pending_look_effects.is_empty());
        assert_eq!(game.active_look_effects, vec![glass]);
    }

    #[test]
    fn test_state_triggers_queue_onto_stack() {
        let (mut game, mut queue) = setup();
        let mut dm = AutoDecisionMaker;
        let p0 = PlayerId::from_index(0);

        let def = CardBuilder::new(CardId::new(), "Last Stand")
            .card_types(vec![CardType::Token])
            .ability(Ability::triggered(
                TriggerCondition::State(StateCondition::ControllerLifeAtMost(5)),
                vec![Effect::GainLife {
                    who: Who::You,
                    amount: ValueExpr::fixed(3),
                }],
            ))
            .build();
        game.create_object_from_definition(&def, p0, Zone::Arena);

        let hero = game.hero_of(p0).unwrap().id;
        game.adjust_life(hero, -16);

        run_game_state_actions(&mut game, &mut queue, &mut dm);
        assert_eq!(game.stack.len(), 1, "state trigger queued as a layer");
    }

    #[test]
    fn test_combat_close_step_runs_in_step_five() {
        let (mut game, mut queue) = setup();
        let mut dm = AutoDecisionMaker;
        let p0 = PlayerId::from_index(0);

        let def = CardBuilder::new(CardId::new(), "Swing")
            .card_types(vec![CardType::Action])
            .subtypes(vec![crate::types::Subtype::Attack])
            .power(4)
            .build();
        let attack = game.create_object_from_definition(&def, p0, Zone::Arena);
        game.combat.open_link(attack);
        game.combat.request_close();

        run_game_state_actions(&mut game, &mut queue, &mut dm);
        assert!(!game.combat.is_open());
        assert_eq!(
            game.object(attack).unwrap().zone,
            Zone::Graveyard,
            "chain card left for the graveyard"
        );
    }
}
