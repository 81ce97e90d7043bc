//! Rollback: restoring the last legal state.
//!
//! A checkpoint is taken before an action chain begins. An illegal action,
//! or one discovered illegal mid-execution (including after partial cost
//! payment), restores the checkpoint wholesale. Because restoration
//! replaces the state rather than un-executing events, no triggered effect
//! fires from the rollback and no replacement effect can intercept it. If
//! no checkpoint exists, the current state is the baseline.

use crate::game_state::GameState;
use crate::trigger::TriggerQueue;

/// A saved point to restore to.
#[derive(Debug, Clone)]
struct Checkpoint {
    game: GameState,
    queue: TriggerQueue,
}

/// Manages the single rollback point of an action chain.
#[derive(Debug, Clone, Default)]
pub struct ReversalManager {
    checkpoint: Option<Box<Checkpoint>>,
}

impl ReversalManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save a checkpoint before starting an action chain.
    pub fn save(&mut self, game: &GameState, queue: &TriggerQueue) {
        self.checkpoint = Some(Box::new(Checkpoint {
            game: game.clone(),
            queue: queue.clone(),
        }));
    }

    pub fn has_checkpoint(&self) -> bool {
        self.checkpoint.is_some()
    }

    /// Restore the checkpoint, if one exists. Returns true on restoration;
    /// false means the current state remains the baseline.
    pub fn restore(&mut self, game: &mut GameState, queue: &mut TriggerQueue) -> bool {
        match self.checkpoint.take() {
            Some(checkpoint) => {
                *game = checkpoint.game;
                *queue = checkpoint.queue;
                true
            }
            None => false,
        }
    }

    /// Drop the checkpoint after the action completes legally.
    pub fn clear(&mut self) {
        self.checkpoint = None;
    }
}
