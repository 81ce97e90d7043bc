//! Turn structure and priority.
//!
//! A turn runs start phase, action phase, end phase. Priority exists only
//! within the action phase: outside it, during resolution, during cost
//! payment, and during game-state actions the game is in `NoPriority`.

use crate::game_state::GameState;
use crate::ids::PlayerId;

/// Errors during turn progression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnError {
    /// No players left in the game.
    NoPlayersRemaining,
    /// The game has already ended.
    GameEnded,
}

/// The phases of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Action,
    End,
}

/// Who, if anyone, holds priority. Exactly one player holds it at a time,
/// and only within action-phase moments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityState {
    NoPriority,
    Held(PlayerId),
}

/// Turn-scoped state.
#[derive(Debug, Clone)]
pub struct TurnState {
    pub turn_number: u32,
    pub turn_player: PlayerId,
    pub phase: Phase,
    pub priority: PriorityState,
}

impl TurnState {
    pub fn new(first_player: PlayerId) -> Self {
        Self {
            turn_number: 1,
            turn_player: first_player,
            phase: Phase::Start,
            priority: PriorityState::NoPriority,
        }
    }

    pub fn priority_holder(&self) -> Option<PlayerId> {
        match self.priority {
            PriorityState::Held(player) => Some(player),
            PriorityState::NoPriority => None,
        }
    }
}

/// Result of passing priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassResult {
    /// The other player now holds priority.
    Continue,
    /// All players passed in succession; resolve the top of the stack.
    StackResolves,
    /// All players passed with an empty stack; the phase ends.
    PhaseEnds,
}

/// Tracks consecutive priority passes.
#[derive(Debug, Clone, Default)]
pub struct PassTracker {
    pub consecutive_passes: usize,
    pub players_in_game: usize,
}

impl PassTracker {
    pub fn new(players_in_game: usize) -> Self {
        Self {
            consecutive_passes: 0,
            players_in_game,
        }
    }

    /// Records a pass. Returns true if all players have now passed.
    pub fn record_pass(&mut self) -> bool {
        self.consecutive_passes += 1;
        self.consecutive_passes >= self.players_in_game
    }

    /// Resets the pass counter (called when a player takes an action).
    pub fn reset(&mut self) {
        self.consecutive_passes = 0;
    }
}

/// Returns true if the given player currently holds priority.
pub fn has_priority(game: &GameState, player: PlayerId) -> bool {
    game.turn.priority == PriorityState::Held(player)
}

/// Passes priority for the current holder.
pub fn pass_priority(game: &mut GameState, tracker: &mut PassTracker) -> PassResult {
    if tracker.record_pass() {
        if game.stack.is_empty() {
            PassResult::PhaseEnds
        } else {
            PassResult::StackResolves
        }
    } else {
        if let Some(holder) = game.turn.priority_holder() {
            let next = game.opponent(holder);
            game.turn.priority = PriorityState::Held(next);
        }
        PassResult::Continue
    }
}

/// Grants priority to the turn-holder (the priority-eligible default) and
/// resets the pass count.
pub fn reset_priority(game: &mut GameState, tracker: &mut PassTracker) {
    tracker.reset();
    game.turn.priority = PriorityState::Held(game.turn.turn_player);
}

/// Drops into the no-priority state (resolution, cost payment,
/// game-state actions, non-action phases).
pub fn suspend_priority(game: &mut GameState) {
    game.turn.priority = PriorityState::NoPriority;
}

/// Executes the start phase: no priority is granted here.
pub fn execute_start_phase(game: &mut GameState) {
    game.turn.phase = Phase::Start;
    game.turn.priority = PriorityState::NoPriority;
}

/// Enters the action phase: the turn-holder gets their action points.
pub fn begin_action_phase(game: &mut GameState) {
    game.turn.phase = Phase::Action;
    let turn_player = game.turn.turn_player;
    let points = game.config.action_points;
    game.ledger.grant_action_points(turn_player, points);
}

/// Executes the end phase: phase-scoped points clear, end-of-turn
/// directives expire, pitched cards recycle to the deck bottom in pitch
/// order, and the turn-holder draws back up to intellect.
pub fn execute_end_phase(game: &mut GameState) {
    game.turn.phase = Phase::End;
    game.turn.priority = PriorityState::NoPriority;

    let turn_player = game.turn.turn_player;
    game.ledger.clear_action_points(turn_player);
    game.ledger.clear_pools(turn_player);
    game.precedence.expire_end_of_turn();

    // Pitch recycling: bottom of deck, preserving pitch order.
    let pitched = game
        .player_mut(turn_player)
        .map(|p| p.take_pitch())
        .unwrap_or_default();
    for (position, card) in pitched.into_iter().enumerate() {
        if let Some(obj) = game.object_mut(card) {
            obj.zone = crate::zone::Zone::Deck;
        }
        if let Some(player) = game.player_mut(turn_player) {
            player.deck.insert(position, card);
        }
    }

    // Draw up to intellect.
    let intellect = game
        .hero_of(turn_player)
        .and_then(|hero| hero.intellect())
        .unwrap_or(0) as usize;
    while game
        .player(turn_player)
        .map(|p| p.hand.len() < intellect)
        .unwrap_or(false)
    {
        if game.draw_one(turn_player).is_none() {
            break;
        }
    }
}

/// Advances to the next turn.
pub fn begin_next_turn(game: &mut GameState) -> Result<(), TurnError> {
    if game.players_in_game() == 0 {
        return Err(TurnError::NoPlayersRemaining);
    }
    if game.outcome.is_some() {
        return Err(TurnError::GameEnded);
    }
    let next_player = game.opponent(game.turn.turn_player);
    game.turn.turn_number += 1;
    game.turn.turn_player = next_player;
    game.turn.phase = Phase::Start;
    game.turn.priority = PriorityState::NoPriority;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardBuilder;
    use crate::ids::CardId;
    use crate::types::CardType;
    use crate::zone::Zone;

    fn test_game() -> GameState {
        GameState::new(vec!["Alice".to_string(), "Bob".to_string()], 20)
    }

    #[test]
    fn test_pass_priority_empty_stack() {
        let mut game = test_game();
        let mut tracker = PassTracker::new(2);
        reset_priority(&mut game, &mut tracker);

        assert_eq!(pass_priority(&mut game, &mut tracker), PassResult::Continue);
        assert_eq!(
            game.turn.priority_holder(),
            Some(PlayerId::from_index(1)),
            "priority passes clockwise"
        );
        assert_eq!(
            pass_priority(&mut game, &mut tracker),
            PassResult::PhaseEnds
        );
    }

    #[test]
    fn test_pass_priority_with_stack() {
        let mut game = test_game();
        let mut tracker = PassTracker::new(2);
        reset_priority(&mut game, &mut tracker);

        let hero_id = game.hero_of(PlayerId::from_index(0)).unwrap().id;
        let hero = game.object(hero_id).unwrap().clone();
        game.stack.push(crate::stack::Layer::activated_layer(
            &hero,
            PlayerId::from_index(0),
            vec![],
            vec![],
        ));

        pass_priority(&mut game, &mut tracker);
        assert_eq!(
            pass_priority(&mut game, &mut tracker),
            PassResult::StackResolves
        );
    }

    #[test]
    fn test_action_phase_grants_action_points() {
        let mut game = test_game();
        begin_action_phase(&mut game);
        let turn_player = game.turn.turn_player;
        assert_eq!(game.ledger.pool(turn_player).action, 1);
    }

    #[test]
    fn test_end_phase_recycles_pitch_and_draws() {
        let mut game = test_game();
        let p0 = game.turn.turn_player;

        for i in 0..6u32 {
            let def = CardBuilder::new(CardId::from_raw(50 + i), &format!("Card {i}"))
                .card_types(vec![CardType::Action])
                .pitch(1)
                .build();
            game.create_object_from_definition(&def, p0, Zone::Deck);
        }
        // Two cards sit in the pitch zone.
        let pitched_a = game.player_mut(p0).unwrap().deck.pop().unwrap();
        let pitched_b = game.player_mut(p0).unwrap().deck.pop().unwrap();
        game.object_mut(pitched_a).unwrap().zone = Zone::Pitch;
        game.object_mut(pitched_b).unwrap().zone = Zone::Pitch;
        game.player_mut(p0).unwrap().pitch = vec![pitched_a, pitched_b];

        execute_end_phase(&mut game);

        let player = game.player(p0).unwrap();
        // Pitched cards went to the deck bottom in pitch order.
        assert_eq!(player.deck[0], pitched_a);
        assert_eq!(player.deck[1], pitched_b);
        assert!(player.pitch.is_empty());
        // Drew up to intellect (4).
        assert_eq!(player.hand.len(), 4);
    }

    #[test]
    fn test_next_turn_swaps_turn_player(){
        let mut game = test_game();
        let first = game.turn.turn_player;
        begin_next_turn(&mut game).unwrap();
        assert_eq!(game.turn.turn_player, game.opponent(first));
        assert_eq!(game.turn.turn_number, 2);
        assert_eq!(game.turn.phase, Phase::Start);
    }

    #[test]
    fn test_no_priority_outside_action_phase() {
        let mut game = test_game();
        execute_start_phase(&mut game);
        assert_eq!(game.turn.priority, PriorityState::NoPriority);
        execute_end_phase(&mut game);
        assert_eq!(game.turn.priority, PriorityState::NoPriority);
    }
}
