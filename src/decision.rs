//! Player decisions: legal actions, pending choices, and the
//! `DecisionMaker` trait harnesses implement to drive a game.
//!
//! Exactly one decision is outstanding at a time; the engine suspends at
//! well-defined points (targets, ordering, defender declarations,
//! acknowledgments) and resumes deterministically once the choice arrives.

use crate::cost::can_cover_assets;
use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId};
use crate::precedence::{ActionQuery, Verdict};
use crate::property::PropertyKind;
use crate::target::Target;
use crate::turn::{Phase, has_priority};
use crate::types::CardType;
use crate::zone::Zone;

/// A legal action a player can take.
#[derive(Debug, Clone, PartialEq)]
pub enum LegalAction {
    /// Pass priority.
    Pass,

    /// Play a card as a layer. Targets and the pitch plan (cards to pitch
    /// toward the resource component, in order) are declared up front.
    PlayCard {
        card: ObjectId,
        from_zone: Zone,
        targets: Vec<Target>,
        pitch: Vec<ObjectId>,
    },

    /// Activate an ability on an arena object.
    ActivateAbility {
        source: ObjectId,
        ability_index: usize,
        targets: Vec<Target>,
        pitch: Vec<ObjectId>,
    },

    /// Declare the defending cards for the current chain link. Submitted
    /// by the defending player while the defender window is open.
    DeclareDefenders { defenders: Vec<ObjectId> },
}

/// The single outstanding decision, when the engine is suspended.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingDecision {
    /// The defending player must declare defenders for the current link.
    DeclareDefenders { player: PlayerId, attack: ObjectId },
}

impl PendingDecision {
    pub fn player(&self) -> PlayerId {
        match self {
            PendingDecision::DeclareDefenders { player, .. } => *player,
        }
    }
}

// ============================================================================
// Decision contexts
// ============================================================================

/// Context for a yes/no decision.
#[derive(Debug, Clone)]
pub struct BooleanContext {
    pub player: PlayerId,
    pub prompt: String,
}

/// Context for ordering N items (e.g. triggered layers).
#[derive(Debug, Clone)]
pub struct OrderContext {
    pub player: PlayerId,
    pub count: usize,
    pub prompt: String,
}

/// Context for selecting objects from a pool.
#[derive(Debug, Clone)]
pub struct SelectObjectsContext {
    pub player: PlayerId,
    pub options: Vec<ObjectId>,
    pub min: usize,
    pub max: usize,
    pub prompt: String,
}

/// Context for acknowledging a cost (including a zero cost).
#[derive(Debug, Clone)]
pub struct CostContext {
    pub player: PlayerId,
    pub description: String,
}

/// Supplies player choices at the engine's decision points.
///
/// Default implementations provide deterministic minimal behavior:
/// optional actions decline, orders stay as given, mandatory
/// acknowledgments accept.
pub trait DecisionMaker {
    /// Optional yes/no choices ("may" effects). Default: decline.
    fn decide_boolean(&mut self, _game: &GameState, _ctx: &BooleanContext) -> bool {
        false
    }

    /// Whether to silently fail an instruction whose outcome the opponent
    /// cannot verify. Default: perform it.
    fn decline_unverifiable(&mut self, _game: &GameState, _ctx: &BooleanContext) -> bool {
        false
    }

    /// Acknowledge a cost before the action proceeds. A zero cost is still
    /// a real cost requiring this acknowledgment. Default: acknowledge.
    fn acknowledge_cost(&mut self, _game: &GameState, _ctx: &CostContext) -> bool {
        true
    }

    /// Order N items. Returns indices in the desired order. Default: keep
    /// the given order.
    fn decide_order(&mut self, _game: &GameState, ctx: &OrderContext) -> Vec<usize> {
        (0..ctx.count).collect()
    }

    /// Select objects (arsenal fill, search results). Default: none.
    fn decide_objects(&mut self, _game: &GameState, _ctx: &SelectObjectsContext) -> Vec<ObjectId> {
        Vec::new()
    }

    /// Called when an action chain is rolled back. The game state has been
    /// restored to the checkpoint taken before the action started.
    fn on_action_cancelled(&mut self, _game: &GameState, _reason: &str) {}
}

/// Decision maker with all defaults: declines options, keeps orders.
#[derive(Debug, Default)]
pub struct AutoDecisionMaker;

impl DecisionMaker for AutoDecisionMaker {}

// ============================================================================
// Legal action computation
// ============================================================================

/// Compute the legal actions for a player given the current priority,
/// stack, and phase state.
pub fn compute_legal_actions(game: &GameState, player: PlayerId) -> Vec<LegalAction> {
    let mut actions = Vec::new();
    if game.outcome.is_some() {
        return actions;
    }
    if !has_priority(game, player) {
        return actions;
    }

    actions.push(LegalAction::Pass);

    let hand: Vec<ObjectId> = game
        .player(player)
        .map(|p| p.hand.clone())
        .unwrap_or_default();

    for card in hand {
        if can_play(game, player, card, Zone::Hand) {
            actions.push(LegalAction::PlayCard {
                card,
                from_zone: Zone::Hand,
                targets: Vec::new(),
                pitch: Vec::new(),
            });
        }
    }

    // Activated abilities on arena objects this player controls.
    for obj in game.objects_in_arena() {
        if obj.controller != Some(player) {
            continue;
        }
        for (index, ability) in obj.abilities.iter().enumerate() {
            if !ability.functions_in(obj.zone) {
                continue;
            }
            let Some(activated) = ability.as_activated() else {
                continue;
            };
            if game.precedence.judge(&ActionQuery::activate(player)) == Verdict::Forbidden {
                continue;
            }
            if can_cover_assets(game, player, &activated.cost.assets) {
                actions.push(LegalAction::ActivateAbility {
                    source: obj.id,
                    ability_index: index,
                    targets: Vec::new(),
                    pitch: Vec::new(),
                });
            }
        }
    }

    actions
}

/// Whether a card is playable by this player right now, before target and
/// payment declaration.
pub fn can_play(game: &GameState, player: PlayerId, card: ObjectId, from_zone: Zone) -> bool {
    let Some(obj) = game.object(card) else {
        return false;
    };

    // Precedence is evaluated at the moment of the action.
    let query = ActionQuery::play(player, from_zone).named(&obj.name);
    if game.precedence.judge(&query) == Verdict::Forbidden {
        return false;
    }

    // Action-speed cards need the action phase, the turn, and a point.
    if obj.has_card_type(CardType::Action) {
        if game.turn.phase != Phase::Action || game.turn.turn_player != player {
            return false;
        }
        if game.ledger.pool(player).action == 0 {
            return false;
        }
    }

    // The asset cost must be coverable, counting pitchable cards in hand.
    let Some(cost) = obj.value(PropertyKind::Cost) else {
        return true;
    };
    let pool = game.ledger.pool(player);
    let pitch_potential: u32 = game
        .player(player)
        .map(|p| {
            p.hand
                .iter()
                .filter(|id| **id != card)
                .filter_map(|id| game.object(*id).and_then(|o| o.pitch()))
                .sum()
        })
        .unwrap_or(0);
    pool.resource_capacity() + pitch_potential >= cost
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardBuilder;
    use crate::ids::CardId;
    use crate::precedence::Directive;
    use crate::turn::{PassTracker, begin_action_phase, reset_priority};

    fn playable_game() -> (GameState, PlayerId) {
        let mut game = GameState::new(vec!["Alice".to_string(), "Bob".to_string()], 20);
        let p0 = PlayerId::from_index(0);
        begin_action_phase(&mut game);
        let mut tracker = PassTracker::new(2);
        reset_priority(&mut game, &mut tracker);
        (game, p0)
    }

    fn add_hand_card(game: &mut GameState, player: PlayerId, cost: i32, pitch: i32) -> ObjectId {
        let def = CardBuilder::new(CardId::new(), "Swing")
            .card_types(vec![CardType::Action])
            .cost(cost)
            .power(3)
            .pitch(pitch)
            .build();
        game.create_object_from_definition(&def, player, Zone::Hand)
    }

    #[test]
    fn test_pass_is_always_legal_with_priority() {
        let (game, p0) = playable_game();
        let actions = compute_legal_actions(&game, p0);
        assert!(actions.contains(&LegalAction::Pass));

        let p1 = PlayerId::from_index(1);
        assert!(compute_legal_actions(&game, p1).is_empty());
    }

    #[test]
    fn test_affordable_card_is_playable() {
        let (mut game, p0) = playable_game();
        let card = add_hand_card(&mut game, p0, 1, 1);
        let _payer = add_hand_card(&mut game, p0, 0, 2);

        assert!(can_play(&game, p0, card, Zone::Hand));
    }

    #[test]
    fn test_unaffordable_card_is_not_playable() {
        let (mut game, p0) = playable_game();
        let card = add_hand_card(&mut game, p0, 5, 1);
        assert!(
            !can_play(&game, p0, card, Zone::Hand),
            "no pitch fodder covers cost 5"
        );
    }

    #[test]
    fn test_restriction_blocks_play() {
        let (mut game, p0) = playable_game();
        let card = add_hand_card(&mut game, p0, 0, 1);
        game.precedence.register(
            Directive::restriction(crate::precedence::GovernedAction::PlayCard)
                .for_player(p0)
                .from_zone(Zone::Hand),
        );
        assert!(!can_play(&game, p0, card, Zone::Hand));
    }

    #[test]
    fn test_action_needs_action_point() {
        let (mut game, p0) = playable_game();
        let card = add_hand_card(&mut game, p0, 0, 1);
        assert!(can_play(&game, p0, card, Zone::Hand));

        game.ledger.clear_action_points(p0);
        assert!(!can_play(&game, p0, card, Zone::Hand));
    }
}
