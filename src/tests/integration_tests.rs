//! Cross-module scenarios exercising the engine end to end.

use crate::ability::Ability;
use crate::card::CardBuilder;
use crate::decision::{AutoDecisionMaker, LegalAction, PendingDecision};
use crate::effect::{Effect, InstructionTag, ValueExpr};
use crate::engine::{Engine, Submission};
use crate::error::EngineError;
use crate::event::EventKind;
use crate::executor::{ExecutionContext, execute_effect};
use crate::game_actions::{GsaOutcome, run_game_state_actions};
use crate::game_state::{GameOutcome, GameState};
use crate::ids::{CardId, ObjectId, PlayerId};
use crate::precedence::{Directive, GovernedAction};
use crate::stack::SourceHandle;
use crate::target::{TargetSpec, Who};
use crate::trigger::{TriggerCondition, TriggerQueue};
use crate::types::{CardType, Subtype};
use crate::zone::Zone;

fn two_player_game() -> GameState {
    GameState::new(vec!["Alice".to_string(), "Bob".to_string()], 20)
}

fn started_engine() -> (Engine, PlayerId, PlayerId) {
    let mut engine = Engine::new(two_player_game());
    let mut dm = AutoDecisionMaker;
    engine.start(&mut dm).unwrap();
    (engine, PlayerId::from_index(0), PlayerId::from_index(1))
}

fn attack_card(game: &mut GameState, owner: PlayerId, cost: i32, power: i32) -> ObjectId {
    let def = CardBuilder::new(CardId::new(), "Strike")
        .card_types(vec![CardType::Action])
        .subtypes(vec![Subtype::Attack])
        .cost(cost)
        .power(power)
        .defense(2)
        .pitch(1)
        .build();
    game.create_object_from_definition(&def, owner, Zone::Hand)
}

fn defense_card(game: &mut GameState, owner: PlayerId, defense: i32) -> ObjectId {
    let def = CardBuilder::new(CardId::new(), "Guard")
        .card_types(vec![CardType::DefenseReaction])
        .cost(0)
        .defense(defense)
        .pitch(1)
        .build();
    game.create_object_from_definition(&def, owner, Zone::Hand)
}

// Scenario A: a hero at 15 life takes 20 damage; life clamps to zero, and
// at the next priority-state transition hero death resolves before generic
// zero-life clearing.
#[test]
fn scenario_a_hero_death_before_object_clearing() {
    let mut game = two_player_game();
    let mut queue = TriggerQueue::new();
    let mut dm = AutoDecisionMaker;
    let p0 = PlayerId::from_index(0);
    let p1 = PlayerId::from_index(1);

    let hero = game.hero_of(p1).unwrap().id;
    game.adjust_life(hero, -5); // hero at 15

    // A zero-life ally shares the moment.
    let ally_def = CardBuilder::new(CardId::new(), "Ally")
        .card_types(vec![CardType::Token])
        .life(1)
        .build();
    let ally = game.create_object_from_definition(&ally_def, p1, Zone::Arena);
    game.adjust_life(ally, -1);

    let source = SourceHandle::of(game.hero_of(p0).unwrap());
    let ctx = ExecutionContext::new(source, p0);
    execute_effect(
        &mut game,
        &mut queue,
        &mut dm,
        &ctx,
        &Effect::DealDamage {
            target: TargetSpec::OpponentHero,
            amount: ValueExpr::fixed(20),
        },
    )
    .unwrap();

    assert_eq!(game.hero_life(p1), Some(0), "life clamps to zero");

    let outcome = run_game_state_actions(&mut game, &mut queue, &mut dm);
    assert_eq!(
        outcome,
        GsaOutcome::GameOver(GameOutcome::Win {
            winner: p0,
            loser: p1
        }),
        "controller loses at step one"
    );
    assert!(
        game.object_exists(ally),
        "step one ended the game before step two cleared the ally"
    );
}

// Scenario B: "draw 3" with one card left in deck: one individual draw
// occurs, two do not; a per-draw trigger fires at most once per card
// actually drawn; a compound-keyed trigger fires exactly once.
#[test]
fn scenario_b_draw_three_with_one_card_left() {
    let mut game = two_player_game();
    let mut queue = TriggerQueue::new();
    let mut dm = AutoDecisionMaker;
    let p0 = PlayerId::from_index(0);

    let filler = CardBuilder::new(CardId::new(), "Filler")
        .card_types(vec![CardType::Action])
        .build();
    game.create_object_from_definition(&filler, p0, Zone::Deck);

    // One watcher per trigger style.
    let per_draw = CardBuilder::new(CardId::new(), "Draw Watcher")
        .card_types(vec![CardType::Token])
        .ability(Ability::triggered(
            TriggerCondition::OnEvent(EventKind::Draw),
            vec![Effect::GainLife {
                who: Who::You,
                amount: ValueExpr::fixed(1),
            }],
        ))
        .build();
    game.create_object_from_definition(&per_draw, p0, Zone::Arena);
    let per_compound = CardBuilder::new(CardId::new(), "Instruction Watcher")
        .card_types(vec![CardType::Token])
        .ability(Ability::triggered(
            TriggerCondition::OnCompound(InstructionTag::Draw),
            vec![Effect::GainLife {
                who: Who::You,
                amount: ValueExpr::fixed(1),
            }],
        ))
        .build();
    game.create_object_from_definition(&per_compound, p0, Zone::Arena);

    let source = SourceHandle::of(game.hero_of(p0).unwrap());
    let ctx = ExecutionContext::new(source, p0);
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
    assert_eq!(
        singles.iter().filter(|s| s.occurred).count(),
        1,
        "one draw occurred, two did not"
    );
    assert_eq!(
        queue.len(),
        2,
        "one per-draw firing plus exactly one compound firing"
    );
}

// Scenario C: two defenders declared, then the attack gains "cannot be
// defended by more than one card": both originals remain declared.
#[test]
fn scenario_c_no_retroactive_defender_removal() {
    let (mut engine, p0, p1) = started_engine();
    let mut dm = AutoDecisionMaker;

    let attack = attack_card(engine.state_mut_for_tests(), p0, 0, 6);
    let guard_a = defense_card(engine.state_mut_for_tests(), p1, 3);
    let guard_b = defense_card(engine.state_mut_for_tests(), p1, 3);

    engine
        .submit(
            p0,
            LegalAction::PlayCard {
                card: attack,
                from_zone: Zone::Hand,
                targets: vec![],
                pitch: vec![],
            },
            &mut dm,
        )
        .unwrap();
    engine.submit(p0, LegalAction::Pass, &mut dm).unwrap();
    let result = engine.submit(p1, LegalAction::Pass, &mut dm).unwrap();
    assert!(matches!(
        result,
        Submission::Suspended(PendingDecision::DeclareDefenders { .. })
    ));

    engine
        .submit(
            p1,
            LegalAction::DeclareDefenders {
                defenders: vec![guard_a, guard_b],
            },
            &mut dm,
        )
        .unwrap();

    // The restriction arrives after declaration.
    engine.state_mut_for_tests().precedence.register(
        Directive::restriction(GovernedAction::DeclareDefender).defender_limit(attack, 1),
    );

    let link = engine.state().combat.links().last().unwrap();
    assert_eq!(
        link.defenders,
        vec![guard_a, guard_b],
        "both original defenders remain declared"
    );
    // Damage already used both: 6 power - 6 defense = 0.
    assert_eq!(engine.state().hero_life(p1), Some(20));
}

// Scenario D: a restriction and an allowance on the same play are both
// active: the restriction wins and the play is prevented.
#[test]
fn scenario_d_restriction_beats_allowance() {
    let (mut engine, p0, _p1) = started_engine();
    let mut dm = AutoDecisionMaker;

    let def = CardBuilder::new(CardId::new(), "Lost Relic")
        .card_types(vec![CardType::Action])
        .cost(0)
        .pitch(1)
        .build();
    let card = engine
        .state_mut_for_tests()
        .create_object_from_definition(&def, p0, Zone::Banished);

    engine.state_mut_for_tests().precedence.register(
        Directive::allowance(GovernedAction::PlayCard)
            .for_player(p0)
            .from_zone(Zone::Banished),
    );
    engine.state_mut_for_tests().precedence.register(
        Directive::restriction(GovernedAction::PlayCard)
            .for_player(p0)
            .from_zone(Zone::Banished),
    );

    let err = engine
        .submit(
            p0,
            LegalAction::PlayCard {
                card,
                from_zone: Zone::Banished,
                targets: vec![],
                pitch: vec![],
            },
            &mut dm,
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::IllegalAction(_)));
    assert_eq!(
        engine.state().object(card).unwrap().zone,
        Zone::Banished,
        "nothing moved"
    );
}

// The allowance alone overrides the base game rule.
#[test]
fn allowance_alone_permits_banished_play() {
    let (mut engine, p0, _p1) = started_engine();
    let mut dm = AutoDecisionMaker;

    let def = CardBuilder::new(CardId::new(), "Lost Relic")
        .card_types(vec![CardType::Action])
        .cost(0)
        .pitch(1)
        .build();
    let card = engine
        .state_mut_for_tests()
        .create_object_from_definition(&def, p0, Zone::Banished);
    engine.state_mut_for_tests().precedence.register(
        Directive::allowance(GovernedAction::PlayCard)
            .for_player(p0)
            .from_zone(Zone::Banished),
    );

    let result = engine
        .submit(
            p0,
            LegalAction::PlayCard {
                card,
                from_zone: Zone::Banished,
                targets: vec![],
                pitch: vec![],
            },
            &mut dm,
        )
        .unwrap();
    assert_eq!(result, Submission::Completed);
    assert_eq!(engine.state().stack.len(), 1);
}

// Scenario E: paying cost 2 by pitching a card worth 3 succeeds, leaves one
// unspent point, and forces no further pitching.
#[test]
fn scenario_e_pitch_surplus_stays() {
    let (mut engine, p0, _p1) = started_engine();
    let mut dm = AutoDecisionMaker;

    let attack = attack_card(engine.state_mut_for_tests(), p0, 2, 4);
    let worth_three = {
        let def = CardBuilder::new(CardId::new(), "Gem")
            .card_types(vec![CardType::Action])
            .cost(0)
            .pitch(3)
            .build();
        engine
            .state_mut_for_tests()
            .create_object_from_definition(&def, p0, Zone::Hand)
    };
    let spare = defense_card(engine.state_mut_for_tests(), p0, 2);

    let result = engine
        .submit(
            p0,
            LegalAction::PlayCard {
                card: attack,
                from_zone: Zone::Hand,
                targets: vec![],
                pitch: vec![worth_three, spare],
            },
            &mut dm,
        )
        .unwrap();
    assert_eq!(result, Submission::Completed);

    let state = engine.state();
    assert_eq!(state.ledger.pool(p0).resource, 1, "one unspent point");
    assert_eq!(state.object(worth_three).unwrap().zone, Zone::Pitch);
    assert_eq!(
        state.object(spare).unwrap().zone,
        Zone::Hand,
        "no forced further pitching"
    );
}

// LKI round-trip: the captured snapshot is immune to later modification.
#[test]
fn lki_round_trip_is_frozen() {
    let mut game = two_player_game();
    let p0 = PlayerId::from_index(0);

    let def = CardBuilder::new(CardId::new(), "Stalwart")
        .card_types(vec![CardType::Token])
        .power(3)
        .life(2)
        .build();
    let id = game.create_object_from_definition(&def, p0, Zone::Arena);
    game.cease_to_exist(id);

    let before = game.lki(id).unwrap().power();
    assert_eq!(before, Some(3));

    // Later attempts to touch the dead object change nothing.
    game.adjust_life(id, -5);
    assert!(game.object(id).is_none());
    assert_eq!(game.lki(id).unwrap().power(), Some(3));
    assert_eq!(game.lki(id).unwrap().value(crate::property::PropertyKind::Life), Some(2));
}

// A triggered layer resolves from its source's last known information even
// after the source is gone.
#[test]
fn triggered_layer_outlives_its_source() {
    let mut game = two_player_game();
    let mut queue = TriggerQueue::new();
    let mut dm = AutoDecisionMaker;
    let p0 = PlayerId::from_index(0);
    let p1 = PlayerId::from_index(1);

    let def = CardBuilder::new(CardId::new(), "Vengeful Idol")
        .card_types(vec![CardType::Token])
        .power(2)
        .ability(Ability::triggered(
            TriggerCondition::OnEvent(EventKind::LifeGain),
            vec![Effect::DealDamage {
                target: TargetSpec::OpponentHero,
                amount: ValueExpr::SourceProperty(crate::property::PropertyKind::Power),
            }],
        ))
        .build();
    let idol = game.create_object_from_definition(&def, p0, Zone::Arena);

    let source = SourceHandle::of(game.hero_of(p0).unwrap());
    let ctx = ExecutionContext::new(source, p0);
    execute_effect(
        &mut game,
        &mut queue,
        &mut dm,
        &ctx,
        &Effect::GainLife {
            who: Who::You,
            amount: ValueExpr::fixed(1),
        },
    )
    .unwrap();
    assert_eq!(queue.len(), 1);

    // The idol dies before its trigger resolves.
    let pending = queue.drain().into_iter().next().unwrap();
    game.cease_to_exist(idol);

    let layer = crate::stack::Layer::triggered_layer(pending);
    let ctx = ExecutionContext::new(layer.source.clone(), layer.controller);
    for effect in &layer.effects {
        execute_effect(&mut game, &mut queue, &mut dm, &ctx, effect).unwrap();
    }
    assert_eq!(
        game.hero_life(p1),
        Some(18),
        "damage equal to the idol's last known power"
    );
}
