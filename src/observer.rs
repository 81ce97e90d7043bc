//! Read-only state snapshots for observers.
//!
//! Training harnesses and UIs consume these views; they carry no live
//! references into the engine and serialize to JSON. Hidden zones are
//! reported as counts only.

use serde::{Deserialize, Serialize};

use crate::game_state::{GameOutcome, GameState};
use crate::object::Object;
use crate::property::PropertyKind;
use crate::stack::LayerKind;
use crate::turn::{Phase, PriorityState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub turn_number: u32,
    pub turn_player: u8,
    pub phase: String,
    pub priority_holder: Option<u8>,
    pub players: Vec<PlayerView>,
    pub arena: Vec<ObjectView>,
    pub stack: Vec<LayerView>,
    pub combat_open: bool,
    pub outcome: Option<OutcomeView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: u8,
    pub name: String,
    pub life: Option<u32>,
    pub action_points: u32,
    pub resource_points: u32,
    pub chi_points: u32,
    pub hand_size: usize,
    pub deck_size: usize,
    pub arsenal_size: usize,
    pub pitch: Vec<ObjectView>,
    pub graveyard: Vec<ObjectView>,
    pub banished: Vec<ObjectView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectView {
    pub id: u64,
    pub name: String,
    pub types: Vec<String>,
    pub power: Option<u32>,
    pub defense: Option<u32>,
    pub life: Option<u32>,
    pub counters: Vec<(String, u32)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerView {
    pub kind: String,
    pub source: String,
    pub controller: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeView {
    pub winner: Option<u8>,
    pub draw: bool,
}

fn object_view(obj: &Object) -> ObjectView {
    ObjectView {
        id: obj.id.0,
        name: obj.name.clone(),
        types: obj.card_types.iter().map(|t| format!("{t:?}")).collect(),
        power: obj.value(PropertyKind::Power),
        defense: obj.value(PropertyKind::Defense),
        life: obj.value(PropertyKind::Life),
        counters: obj
            .counters
            .snapshot()
            .into_iter()
            .map(|(kind, count)| (format!("{kind:?}"), count))
            .collect(),
    }
}

impl GameSnapshot {
    /// Capture the observable state of a game.
    pub fn capture(game: &GameState) -> Self {
        let players = game
            .players
            .iter()
            .map(|player| {
                let views = |ids: &Vec<crate::ids::ObjectId>| -> Vec<ObjectView> {
                    ids.iter()
                        .filter_map(|id| game.object(*id))
                        .map(object_view)
                        .collect()
                };
                let pool = game.ledger.pool(player.id);
                PlayerView {
                    id: player.id.0,
                    name: player.name.clone(),
                    life: game.hero_life(player.id),
                    action_points: pool.action,
                    resource_points: pool.resource,
                    chi_points: pool.chi,
                    hand_size: player.hand.len(),
                    deck_size: player.deck.len(),
                    arsenal_size: player.arsenal.len(),
                    pitch: views(&player.pitch),
                    graveyard: views(&player.graveyard),
                    banished: views(&player.banished),
                }
            })
            .collect();

        let stack = game
            .stack
            .iter()
            .map(|layer| LayerView {
                kind: match layer.kind {
                    LayerKind::CardLayer => "card".to_string(),
                    LayerKind::ActivatedLayer => "activated".to_string(),
                    LayerKind::TriggeredLayer => "triggered".to_string(),
                },
                source: layer.source.snapshot.name.clone(),
                controller: layer.controller.0,
            })
            .collect();

        Self {
            turn_number: game.turn.turn_number,
            turn_player: game.turn.turn_player.0,
            phase: match game.turn.phase {
                Phase::Start => "start".to_string(),
                Phase::Action => "action".to_string(),
                Phase::End => "end".to_string(),
            },
            priority_holder: match game.turn.priority {
                PriorityState::Held(player) => Some(player.0),
                PriorityState::NoPriority => None,
            },
            players,
            arena: game.objects_in_arena().into_iter().map(object_view).collect(),
            stack,
            combat_open: game.combat.is_open(),
            outcome: game.outcome.map(|outcome| match outcome {
                GameOutcome::Win { winner, .. } => OutcomeView {
                    winner: Some(winner.0),
                    draw: false,
                },
                GameOutcome::Draw => OutcomeView {
                    winner: None,
                    draw: true,
                },
            }),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
