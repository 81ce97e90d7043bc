//! The engine facade: action submission, the priority loop, and the
//! read-only query surface.
//!
//! Flow for a submitted action: precedence check, cost payment (which may
//! itself fire sub-events), a layer is pushed, priority cycles, the top
//! layer resolves through the event model, and the game-state-action pass
//! runs whenever play would settle into a new priority state. An illegal
//! action or unpayable cost rolls the game back to the checkpoint taken
//! before the action chain began; an invariant violation halts the engine
//! instance for good.

use tracing::{debug, info};

use crate::cost::{AssetCost, Cost, CostError, pay_cost};
use crate::decision::{
    DecisionMaker, LegalAction, PendingDecision, SelectObjectsContext, compute_legal_actions,
};
use crate::error::EngineError;
use crate::executor::{ExecutionContext, execute_effects, fire_body, object_matches};
use crate::event::{EventBody, EventRecord};
use crate::game_actions::{GsaOutcome, refunds_action_point, run_game_state_actions};
use crate::game_state::{GameOutcome, GameState};
use crate::ids::{ObjectId, PlayerId};
use crate::precedence::{ActionQuery, Verdict};
use crate::property::PropertyKind;
use crate::reversal::ReversalManager;
use crate::stack::{Layer, LayerKind};
use crate::target::{Target, TargetSpec};
use crate::trigger::TriggerQueue;
use crate::turn::{
    PassResult, PassTracker, Phase, PriorityState, begin_action_phase, begin_next_turn,
    execute_end_phase, execute_start_phase, pass_priority, suspend_priority,
};
use crate::types::CardType;
use crate::zone::Zone;

/// What a submission produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The action completed; play continues.
    Completed,
    /// The engine is suspended on exactly one pending decision.
    Suspended(PendingDecision),
    /// The game has ended.
    GameOver(GameOutcome),
}

/// One game instance behind the query/action API. The whole object graph
/// is owned here; callers never mutate it directly.
#[derive(Debug)]
pub struct Engine {
    game: GameState,
    queue: TriggerQueue,
    reversal: ReversalManager,
    passes: PassTracker,
    pending: Option<PendingDecision>,
    halted: bool,
}

impl Engine {
    pub fn new(game: GameState) -> Self {
        let players = game.players_in_game();
        Self {
            game,
            queue: TriggerQueue::new(),
            reversal: ReversalManager::new(),
            passes: PassTracker::new(players),
            pending: None,
            halted: false,
        }
    }

    /// Read-only view of the game state for observers.
    pub fn state(&self) -> &GameState {
        &self.game
    }

    /// Direct state access for in-crate tests. Callers outside the crate
    /// act only through the query/action API.
    #[cfg(test)]
    pub(crate) fn state_mut_for_tests(&mut self) -> &mut GameState {
        &mut self.game
    }

    /// The single outstanding decision, if the engine is suspended.
    pub fn pending_decision(&self) -> Option<&PendingDecision> {
        self.pending.as_ref()
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.game.outcome
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Begin the game: shuffle, deal starting hands, and walk the first
    /// turn up to the action phase.
    pub fn start(&mut self, dm: &mut dyn DecisionMaker) -> Result<Submission, EngineError> {
        for player in self.game.turn_order.clone() {
            self.game.shuffle_deck(player);
            for _ in 0..self.game.config.starting_hand_size {
                self.game.draw_one(player);
            }
        }
        execute_start_phase(&mut self.game);
        if let GsaOutcome::GameOver(outcome) =
            run_game_state_actions(&mut self.game, &mut self.queue, dm)
        {
            return Ok(Submission::GameOver(outcome));
        }
        begin_action_phase(&mut self.game);
        self.settle_and_grant(self.game.turn.turn_player, dm)
    }

    /// Legal actions for a player given the current priority, stack, and
    /// phase state.
    pub fn legal_actions(&self, player: PlayerId) -> Vec<LegalAction> {
        if self.halted || self.game.outcome.is_some() {
            return Vec::new();
        }
        if let Some(pending) = &self.pending {
            return match pending {
                PendingDecision::DeclareDefenders { player: p, .. } if *p == player => {
                    vec![LegalAction::DeclareDefenders {
                        defenders: Vec::new(),
                    }]
                }
                _ => Vec::new(),
            };
        }
        compute_legal_actions(&self.game, player)
    }

    /// Submit a chosen action. Returns success, suspension, or game end;
    /// failures report a structured reason and leave the game at the last
    /// legal state.
    pub fn submit(
        &mut self,
        player: PlayerId,
        action: LegalAction,
        dm: &mut dyn DecisionMaker,
    ) -> Result<Submission, EngineError> {
        if self.halted {
            return Err(EngineError::InvariantViolation(
                "engine is halted".to_string(),
            ));
        }
        if let Some(outcome) = self.game.outcome {
            return Ok(Submission::GameOver(outcome));
        }

        if let Some(pending) = self.pending.clone() {
            return match (&pending, &action) {
                (
                    PendingDecision::DeclareDefenders { player: p, attack },
                    LegalAction::DeclareDefenders { defenders },
                ) if *p == player => self.declare_defenders(player, *attack, defenders.clone(), dm),
                _ => Err(EngineError::AwaitingChoice(format!(
                    "pending decision for player {:?}",
                    pending.player()
                ))),
            };
        }

        if self.game.turn.priority != PriorityState::Held(player) {
            return Err(EngineError::IllegalAction(
                "player does not hold priority".to_string(),
            ));
        }

        match action {
            LegalAction::Pass => self.pass(player, dm),
            LegalAction::PlayCard {
                card,
                from_zone,
                targets,
                pitch,
            } => self.play_card(player, card, from_zone, targets, pitch, dm),
            LegalAction::ActivateAbility {
                source,
                ability_index,
                targets,
                pitch,
            } => self.activate_ability(player, source, ability_index, targets, pitch, dm),
            LegalAction::DeclareDefenders { .. } => Err(EngineError::IllegalAction(
                "no defender declaration is pending".to_string(),
            )),
        }
    }

    // =========================================================================
    // Priority
    // =========================================================================

    fn pass(
        &mut self,
        player: PlayerId,
        dm: &mut dyn DecisionMaker,
    ) -> Result<Submission, EngineError> {
        debug!(?player, "passes priority");
        match pass_priority(&mut self.game, &mut self.passes) {
            PassResult::Continue => Ok(Submission::Completed),
            PassResult::StackResolves => self.resolve_top(dm),
            PassResult::PhaseEnds => self.end_action_phase(dm),
        }
    }

    /// Run the game-state-action pass and settle into a new priority
    /// state held by the given player.
    fn settle_and_grant(
        &mut self,
        player: PlayerId,
        dm: &mut dyn DecisionMaker,
    ) -> Result<Submission, EngineError> {
        if let GsaOutcome::GameOver(outcome) =
            run_game_state_actions(&mut self.game, &mut self.queue, dm)
        {
            return Ok(Submission::GameOver(outcome));
        }
        self.check_invariants()?;
        if let Some(pending) = &self.pending {
            suspend_priority(&mut self.game);
            return Ok(Submission::Suspended(pending.clone()));
        }
        self.passes.reset();
        self.game.turn.priority = PriorityState::Held(player);
        Ok(Submission::Completed)
    }

    // =========================================================================
    // Playing cards and activating abilities
    // =========================================================================

    fn play_card(
        &mut self,
        player: PlayerId,
        card: ObjectId,
        from_zone: Zone,
        targets: Vec<Target>,
        pitch: Vec<ObjectId>,
        dm: &mut dyn DecisionMaker,
    ) -> Result<Submission, EngineError> {
        let Some(obj) = self.game.object(card) else {
            return Err(EngineError::IllegalAction("no such card".to_string()));
        };
        let name = obj.name.clone();
        let is_action = obj.has_card_type(CardType::Action);
        let is_attack = obj.is_attack();
        let resource_cost = obj.value(PropertyKind::Cost).unwrap_or(0);
        let resolve_effects = obj.resolve_effects.clone();

        let in_zone = self
            .game
            .player(player)
            .and_then(|p| p.zone_list(from_zone))
            .map(|list| list.contains(&card))
            .unwrap_or(false);
        if !in_zone {
            return Err(EngineError::IllegalAction(format!(
                "{name} is not in {from_zone:?}"
            )));
        }

        // Precedence is evaluated at the moment of the action.
        let query = ActionQuery::play(player, from_zone).named(&name);
        if self.game.precedence.judge(&query) == Verdict::Forbidden {
            return Err(EngineError::IllegalAction(format!(
                "a restriction prevents playing {name}"
            )));
        }
        if is_action && (self.game.turn.phase != Phase::Action
            || self.game.turn.turn_player != player)
        {
            return Err(EngineError::IllegalAction(
                "action cards need the action phase".to_string(),
            ));
        }

        if pitch.contains(&card) {
            return Err(EngineError::IllegalAction(
                "a card cannot pay for itself by pitching".to_string(),
            ));
        }

        // Targeting fails pre-mutation.
        self.validate_targets(player, &resolve_effects, &targets)?;

        // From here on the game mutates: checkpoint for rollback.
        self.reversal.save(&self.game, &self.queue);
        suspend_priority(&mut self.game);

        let assets = AssetCost {
            action: if is_action { 1 } else { 0 },
            resource: resource_cost,
            life: 0,
            chi: 0,
        };
        let cost = Cost::assets(assets);
        let Some(source) = self.game.object(card).map(crate::stack::SourceHandle::of) else {
            return self.rollback(
                "card vanished before payment".to_string(),
                EngineError::IllegalAction("no such card".to_string()),
                dm,
            );
        };
        if let Err(err) = pay_cost(
            &mut self.game,
            &mut self.queue,
            dm,
            player,
            &source,
            &cost,
            &pitch,
        ) {
            return self.rollback(err.to_string(), cost_error_to_engine(err), dm);
        }

        // A non-attack action closes an open combat chain.
        if is_action && !is_attack && self.game.combat.is_open() {
            self.game.combat.request_close();
        }

        self.game.move_object(card, Zone::Stack);
        let Some(card_obj) = self.game.object(card).cloned() else {
            self.halted = true;
            return Err(EngineError::InvariantViolation(
                "played card vanished during payment".to_string(),
            ));
        };
        let layer = Layer::card_layer(&card_obj, player, resolve_effects, targets);
        info!(card = %name, ?player, "card played onto the stack");
        self.game.stack.push(layer);
        self.reversal.clear();

        // The actor regains priority immediately afterward.
        self.settle_and_grant(player, dm)
    }

    fn activate_ability(
        &mut self,
        player: PlayerId,
        source: ObjectId,
        ability_index: usize,
        targets: Vec<Target>,
        pitch: Vec<ObjectId>,
        dm: &mut dyn DecisionMaker,
    ) -> Result<Submission, EngineError> {
        let Some(obj) = self.game.object(source) else {
            return Err(EngineError::IllegalAction("no such object".to_string()));
        };
        if obj.controller != Some(player) {
            return Err(EngineError::IllegalAction(
                "you do not control that object".to_string(),
            ));
        }
        let Some(activated) = obj
            .abilities
            .get(ability_index)
            .filter(|a| a.functions_in(obj.zone))
            .and_then(|a| a.as_activated())
            .cloned()
        else {
            return Err(EngineError::IllegalAction(
                "no such activated ability".to_string(),
            ));
        };

        if self.game.precedence.judge(&ActionQuery::activate(player)) == Verdict::Forbidden {
            return Err(EngineError::IllegalAction(
                "a restriction prevents activating abilities".to_string(),
            ));
        }

        self.validate_targets(player, &activated.effects, &targets)?;

        self.reversal.save(&self.game, &self.queue);
        suspend_priority(&mut self.game);

        let Some(source_handle) = self.game.object(source).map(crate::stack::SourceHandle::of)
        else {
            return self.rollback(
                "source vanished before payment".to_string(),
                EngineError::IllegalAction("no such object".to_string()),
                dm,
            );
        };
        if let Err(err) = pay_cost(
            &mut self.game,
            &mut self.queue,
            dm,
            player,
            &source_handle,
            &activated.cost,
            &pitch,
        ) {
            return self.rollback(err.to_string(), cost_error_to_engine(err), dm);
        }

        let Some(obj) = self.game.object(source).cloned() else {
            self.halted = true;
            return Err(EngineError::InvariantViolation(
                "ability source vanished during payment".to_string(),
            ));
        };
        let layer = Layer::activated_layer(&obj, player, activated.effects, targets);
        info!(source = %obj.name, ?player, "ability activated");
        self.game.stack.push(layer);
        self.reversal.clear();

        self.settle_and_grant(player, dm)
    }

    /// Validate declared targets against the effects' target specs.
    /// Targeting failures happen before any mutation.
    fn validate_targets(
        &self,
        player: PlayerId,
        effects: &[crate::effect::Effect],
        targets: &[Target],
    ) -> Result<(), EngineError> {
        let Some(spec) = effects.iter().find_map(|e| e.declared_target()) else {
            return Ok(());
        };
        let legal = self.legal_targets(player, spec);
        if legal.is_empty() {
            return Err(EngineError::NoLegalTarget(
                "targeting requirement unsatisfiable".to_string(),
            ));
        }
        if targets.is_empty() {
            return Err(EngineError::IllegalAction(
                "a target must be declared".to_string(),
            ));
        }
        for target in targets {
            if !legal.contains(target) {
                return Err(EngineError::NoLegalTarget(format!(
                    "{target:?} is not a legal target"
                )));
            }
        }
        Ok(())
    }

    /// Legal targets for a spec. Last-known information is never a valid
    /// target: only live objects qualify.
    pub fn legal_targets(&self, player: PlayerId, spec: &TargetSpec) -> Vec<Target> {
        match spec {
            TargetSpec::None => Vec::new(),
            TargetSpec::YourHero => self
                .game
                .hero_of(player)
                .map(|h| vec![Target::Object(h.id)])
                .unwrap_or_default(),
            TargetSpec::OpponentHero => self
                .game
                .hero_of(self.game.opponent(player))
                .map(|h| vec![Target::Object(h.id)])
                .unwrap_or_default(),
            TargetSpec::AnyHero => self
                .game
                .objects_in_arena()
                .iter()
                .filter(|o| o.is_hero())
                .map(|o| Target::Object(o.id))
                .collect(),
            TargetSpec::Object(filter) => self
                .game
                .objects_in_arena()
                .iter()
                .filter(|o| object_matches(o, filter))
                .map(|o| Target::Object(o.id))
                .collect(),
        }
    }

    // =========================================================================
    // Stack resolution
    // =========================================================================

    fn resolve_top(&mut self, dm: &mut dyn DecisionMaker) -> Result<Submission, EngineError> {
        suspend_priority(&mut self.game);
        let Some(layer) = self.game.stack.pop() else {
            self.halted = true;
            return Err(EngineError::InvariantViolation(
                "resolve with empty stack".to_string(),
            ));
        };
        debug!(kind = ?layer.kind, "resolving top layer");

        let ctx = ExecutionContext::new(layer.source.clone(), layer.controller)
            .with_targets(layer.targets.clone());
        if let Err(err) =
            execute_effects(&mut self.game, &mut self.queue, dm, &ctx, &layer.effects)
        {
            self.halted = true;
            return Err(EngineError::InvariantViolation(format!(
                "resolution failed: {err:?}"
            )));
        }

        if layer.kind == LayerKind::CardLayer {
            self.dispose_resolved_card(&layer, dm)?;
        }

        // Resolution settles into a new priority state for the turn-holder.
        let turn_player = self.game.turn.turn_player;
        self.settle_and_grant(turn_player, dm)
    }

    /// Route a resolved card layer's source where it belongs: attacks open
    /// a chain link and wait for defenders, permanents stay in the arena,
    /// everything else goes to the graveyard.
    fn dispose_resolved_card(
        &mut self,
        layer: &Layer,
        _dm: &mut dyn DecisionMaker,
    ) -> Result<(), EngineError> {
        let card = layer.source.id;
        let Some(obj) = self.game.object(card) else {
            // The source is gone; the layer resolved from last-known
            // information and there is nothing to route.
            return Ok(());
        };
        if obj.zone != Zone::Stack {
            return Ok(());
        }

        if obj.is_attack() {
            self.game.move_object(card, Zone::Arena);
            self.game.combat.open_link(card);
            let defender = self.game.opponent(layer.controller);
            self.pending = Some(PendingDecision::DeclareDefenders {
                player: defender,
                attack: card,
            });
            debug!(?defender, "attack resolved; defender window opens");
        } else if obj.card_types.iter().any(|t| t.is_permanent()) {
            self.game.move_object(card, Zone::Arena);
        } else {
            self.game.move_object(card, Zone::Graveyard);
        }
        Ok(())
    }

    // =========================================================================
    // Combat
    // =========================================================================

    fn declare_defenders(
        &mut self,
        player: PlayerId,
        attack: ObjectId,
        defenders: Vec<ObjectId>,
        dm: &mut dyn DecisionMaker,
    ) -> Result<Submission, EngineError> {
        // Validate the whole declaration before any mutation; precedence is
        // evaluated per defender at the moment of its declaration.
        for (already, defender) in defenders.iter().enumerate() {
            let query = ActionQuery::defend(player, attack, already as u32);
            if self.game.precedence.judge(&query) == Verdict::Forbidden {
                return Err(EngineError::IllegalAction(format!(
                    "a restriction prevents declaring defender {already}"
                )));
            }
            let valid = self.game.object(*defender).is_some_and(|o| {
                let from_hand = self
                    .game
                    .player(player)
                    .map(|p| p.hand.contains(defender))
                    .unwrap_or(false);
                let equipment = o.zone == Zone::Arena
                    && o.controller == Some(player)
                    && o.has_card_type(CardType::Equipment);
                o.has_property(PropertyKind::Defense) && (from_hand || equipment)
            });
            if !valid {
                return Err(EngineError::IllegalAction(format!(
                    "{defender:?} cannot defend"
                )));
            }
        }

        // Locked from here: later restriction changes never undo these.
        for defender in &defenders {
            if self
                .game
                .player(player)
                .map(|p| p.hand.contains(defender))
                .unwrap_or(false)
            {
                self.game.move_object(*defender, Zone::Arena);
            }
            self.game.combat.declare_defender(*defender);
        }
        if let Some(link) = self.game.combat.current_link_mut() {
            link.defenders_declared = true;
        }
        info!(count = defenders.len(), "defenders declared and locked");
        self.pending = None;

        self.resolve_chain_link(attack, player, dm)
    }

    /// The damage step of the current chain link.
    fn resolve_chain_link(
        &mut self,
        attack: ObjectId,
        defender: PlayerId,
        dm: &mut dyn DecisionMaker,
    ) -> Result<Submission, EngineError> {
        let power = self
            .game
            .object(attack)
            .and_then(|o| o.power())
            .or_else(|| self.game.lki(attack).and_then(|s| s.power()))
            .unwrap_or(0);
        let defense: u32 = self
            .game
            .combat
            .current_link()
            .map(|link| {
                link.defenders
                    .iter()
                    .filter_map(|d| self.game.object(*d).and_then(|o| o.defense()))
                    .sum()
            })
            .unwrap_or(0);
        let damage = power.saturating_sub(defense);
        debug!(power, defense, damage, "chain link damage step");

        let excluded = std::collections::HashSet::new();
        let record = fire_body(
            &mut self.game,
            EventBody::Damage {
                source: Some(attack),
                target: Target::Player(defender),
                amount: damage,
            },
            None,
            &excluded,
        );
        self.queue.collect(&self.game, &EventRecord::Single(record));

        if let Some(link) = self.game.combat.current_link_mut() {
            link.resolved = true;
        }

        let attacker = self.game.opponent(defender);
        if refunds_action_point(&self.game, attack) {
            self.game
                .ledger
                .credit(attacker, crate::ledger::AssetKind::Action, 1);
        }

        self.settle_and_grant(attacker, dm)
    }

    // =========================================================================
    // Phase flow
    // =========================================================================

    fn end_action_phase(&mut self, dm: &mut dyn DecisionMaker) -> Result<Submission, EngineError> {
        suspend_priority(&mut self.game);
        if self.game.combat.is_open() {
            self.game.combat.request_close();
        }
        if let GsaOutcome::GameOver(outcome) =
            run_game_state_actions(&mut self.game, &mut self.queue, dm)
        {
            return Ok(Submission::GameOver(outcome));
        }
        // Closing the chain may have queued triggered layers: the phase
        // only ends once the stack is empty again.
        if !self.game.stack.is_empty() {
            let turn_player = self.game.turn.turn_player;
            return self.settle_and_grant(turn_player, dm);
        }

        // End phase: optional arsenal fill, then pitch recycling and the
        // draw back up to intellect.
        let turn_player = self.game.turn.turn_player;
        let arsenal_empty = self
            .game
            .player(turn_player)
            .map(|p| p.arsenal.is_empty())
            .unwrap_or(false);
        let hand = self
            .game
            .player(turn_player)
            .map(|p| p.hand.clone())
            .unwrap_or_default();
        if arsenal_empty && !hand.is_empty() {
            let chosen = dm.decide_objects(
                &self.game,
                &SelectObjectsContext {
                    player: turn_player,
                    options: hand.clone(),
                    min: 0,
                    max: 1,
                    prompt: "Put a card into your arsenal?".to_string(),
                },
            );
            if let Some(card) = chosen.first().filter(|c| hand.contains(c)) {
                self.game.move_object(*card, Zone::Arsenal);
            }
        }
        execute_end_phase(&mut self.game);
        if let GsaOutcome::GameOver(outcome) =
            run_game_state_actions(&mut self.game, &mut self.queue, dm)
        {
            return Ok(Submission::GameOver(outcome));
        }

        begin_next_turn(&mut self.game)
            .map_err(|e| EngineError::InvariantViolation(format!("{e:?}")))?;
        execute_start_phase(&mut self.game);
        if let GsaOutcome::GameOver(outcome) =
            run_game_state_actions(&mut self.game, &mut self.queue, dm)
        {
            return Ok(Submission::GameOver(outcome));
        }
        begin_action_phase(&mut self.game);
        let turn_player = self.game.turn.turn_player;
        self.settle_and_grant(turn_player, dm)
    }

    // =========================================================================
    // Rollback and invariants
    // =========================================================================

    /// Roll the game back to the last legal state. No triggered effect
    /// fires from the rollback and no replacement effect intercepts it.
    fn rollback(
        &mut self,
        reason: String,
        error: EngineError,
        dm: &mut dyn DecisionMaker,
    ) -> Result<Submission, EngineError> {
        info!(%reason, "rolling back action chain");
        self.reversal.restore(&mut self.game, &mut self.queue);
        dm.on_action_cancelled(&self.game, &reason);
        Err(error)
    }

    /// Consistency checks over stack, zones, and ledger. A failure halts
    /// this engine instance rather than continuing on corrupted state.
    fn check_invariants(&mut self) -> Result<(), EngineError> {
        for player in &self.game.players {
            if self.game.outcome.is_none() {
                let hero_ok = player
                    .hero
                    .map(|id| self.game.object_exists(id))
                    .unwrap_or(false);
                if !hero_ok {
                    self.halted = true;
                    return Err(EngineError::InvariantViolation(format!(
                        "player {:?} has no hero object",
                        player.id
                    )));
                }
            }
            for zone in [Zone::Deck, Zone::Hand, Zone::Arsenal, Zone::Pitch] {
                if let Some(list) = player.zone_list(zone) {
                    for id in list {
                        if !self.game.object_exists(*id) {
                            self.halted = true;
                            return Err(EngineError::InvariantViolation(format!(
                                "zone {zone:?} lists missing object {id:?}"
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn cost_error_to_engine(err: CostError) -> EngineError {
    match &err {
        CostError::Unpayable { .. } | CostError::ComponentFailed(_) => {
            EngineError::UnpayableCost(err.to_string())
        }
        CostError::Declined => EngineError::IllegalAction(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardBuilder;
    use crate::decision::AutoDecisionMaker;
    use crate::effect::{Effect, ValueExpr};
    use crate::ids::CardId;
    use crate::target::Who;

    fn started_engine() -> (Engine, PlayerId, PlayerId) {
        let game = GameState::new(vec!["Alice".to_string(), "Bob".to_string()], 20);
        let mut engine = Engine::new(game);
        let mut dm = AutoDecisionMaker;
        engine.start(&mut dm).unwrap();
        (engine, PlayerId::from_index(0), PlayerId::from_index(1))
    }

    fn hand_card(engine: &mut Engine, player: PlayerId, cost: i32, power: Option<i32>) -> ObjectId {
        let mut builder = CardBuilder::new(CardId::new(), "Test Swing")
            .card_types(vec![CardType::Action])
            .cost(cost)
            .pitch(1);
        if let Some(power) = power {
            builder = builder
                .subtypes(vec![crate::types::Subtype::Attack])
                .power(power);
        }
        let def = builder.build();
        engine
            .game
            .create_object_from_definition(&def, player, Zone::Hand)
    }

    fn pitch_fodder(engine: &mut Engine, player: PlayerId, pitch: i32) -> ObjectId {
        let def = CardBuilder::new(CardId::new(), "Fodder")
            .card_types(vec![CardType::Action])
            .cost(0)
            .pitch(pitch)
            .build();
        engine
            .game
            .create_object_from_definition(&def, player, Zone::Hand)
    }

    #[test]
    fn test_start_grants_priority_to_turn_holder() {
        let (engine, p0, p1) = started_engine();
        assert_eq!(engine.state().turn.priority, PriorityState::Held(p0));
        assert!(!engine.legal_actions(p0).is_empty());
        assert!(engine.legal_actions(p1).is_empty());
    }

    #[test]
    fn test_submit_without_priority_fails() {
        let (mut engine, _p0, p1) = started_engine();
        let mut dm = AutoDecisionMaker;
        let err = engine.submit(p1, LegalAction::Pass, &mut dm).unwrap_err();
        assert!(matches!(err, EngineError::IllegalAction(_)));
    }

    #[test]
    fn test_play_attack_and_defend_flow() {
        let (mut engine, p0, p1) = started_engine();
        let mut dm = AutoDecisionMaker;
        let attack = hand_card(&mut engine, p0, 1, Some(4));
        let fodder = pitch_fodder(&mut engine, p0, 1);

        let result = engine
            .submit(
                p0,
                LegalAction::PlayCard {
                    card: attack,
                    from_zone: Zone::Hand,
                    targets: vec![],
                    pitch: vec![fodder],
                },
                &mut dm,
            )
            .unwrap();
        assert_eq!(result, Submission::Completed);
        assert_eq!(engine.state().stack.len(), 1);

        // Both players pass; the attack resolves and the defender window
        // opens.
        engine.submit(p0, LegalAction::Pass, &mut dm).unwrap();
        let result = engine.submit(p1, LegalAction::Pass, &mut dm).unwrap();
        let Submission::Suspended(PendingDecision::DeclareDefenders { player, .. }) = result
        else {
            panic!("expected defender window, got {result:?}");
        };
        assert_eq!(player, p1);

        // Defend with nothing: full power hits the hero.
        let result = engine
            .submit(
                p1,
                LegalAction::DeclareDefenders { defenders: vec![] },
                &mut dm,
            )
            .unwrap();
        assert_eq!(result, Submission::Completed);
        assert_eq!(engine.state().hero_life(p1), Some(16));
    }

    #[test]
    fn test_unpayable_cost_rolls_back() {
        let (mut engine, p0, _p1) = started_engine();
        let mut dm = AutoDecisionMaker;
        let card = hand_card(&mut engine, p0, 3, None);
        let hand_before: Vec<ObjectId> = engine.state().player(p0).unwrap().hand.clone();

        let err = engine
            .submit(
                p0,
                LegalAction::PlayCard {
                    card,
                    from_zone: Zone::Hand,
                    targets: vec![],
                    pitch: vec![],
                },
                &mut dm,
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::UnpayableCost(_)));

        // Full rollback: hand unchanged, stack empty, priority restored.
        assert_eq!(engine.state().player(p0).unwrap().hand, hand_before);
        assert!(engine.state().stack.is_empty());
        assert_eq!(engine.state().turn.priority, PriorityState::Held(p0));
    }

    #[test]
    fn test_all_pass_ends_phase_and_turn_advances() {
        let (mut engine, p0, p1) = started_engine();
        let mut dm = AutoDecisionMaker;

        engine.submit(p0, LegalAction::Pass, &mut dm).unwrap();
        let result = engine.submit(p1, LegalAction::Pass, &mut dm).unwrap();
        assert_eq!(result, Submission::Completed);
        assert_eq!(engine.state().turn.turn_number, 2);
        assert_eq!(engine.state().turn.turn_player, p1);
        assert_eq!(engine.state().turn.priority, PriorityState::Held(p1));
    }

    #[test]
    fn test_lethal_attack_ends_game_via_gsa() {
        let (mut engine, p0, p1) = started_engine();
        let mut dm = AutoDecisionMaker;
        let hero = engine.state().hero_of(p1).unwrap().id;
        engine.game.adjust_life(hero, -16); // at 4 life

        let attack = hand_card(&mut engine, p0, 0, Some(5));
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
        engine.submit(p1, LegalAction::Pass, &mut dm).unwrap();
        let result = engine
            .submit(
                p1,
                LegalAction::DeclareDefenders { defenders: vec![] },
                &mut dm,
            )
            .unwrap();
        assert_eq!(
            result,
            Submission::GameOver(GameOutcome::Win {
                winner: p0,
                loser: p1
            })
        );
        assert!(engine.legal_actions(p0).is_empty());
    }

    #[test]
    fn test_resolved_non_attack_goes_to_graveyard() {
        let (mut engine, p0, p1) = started_engine();
        let mut dm = AutoDecisionMaker;

        let def = CardBuilder::new(CardId::new(), "Lesson")
            .card_types(vec![CardType::Action])
            .cost(0)
            .on_resolve(vec![Effect::Draw {
                who: Who::You,
                count: ValueExpr::fixed(1),
            }])
            .build();
        let card = engine
            .game
            .create_object_from_definition(&def, p0, Zone::Hand);

        engine
            .submit(
                p0,
                LegalAction::PlayCard {
                    card,
                    from_zone: Zone::Hand,
                    targets: vec![],
                    pitch: vec![],
                },
                &mut dm,
            )
            .unwrap();
        engine.submit(p0, LegalAction::Pass, &mut dm).unwrap();
        engine.submit(p1, LegalAction::Pass, &mut dm).unwrap();

        assert_eq!(engine.state().object(card).unwrap().zone, Zone::Graveyard);
    }
}
