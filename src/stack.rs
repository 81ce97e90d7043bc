//! The stack: a last-in-first-out list of layers awaiting resolution.
//!
//! A layer is an object on the stack. It holds a snapshot of its source's
//! data, so it persists and resolves even if the source has since ceased
//! to exist. Owner/controller are fixed at creation: a card-layer's owner
//! is the card's owner; an activated-layer's owner and controller are the
//! activating player; a triggered-layer's owner and controller are the
//! controller of its source at the instant it triggered, falling back to
//! the source's owner.

use crate::effect::Effect;
use crate::ids::{ObjectId, PlayerId};
use crate::object::Object;
use crate::snapshot::ObjectSnapshot;
use crate::target::Target;
use crate::trigger::PendingTrigger;

/// The kind of layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    CardLayer,
    ActivatedLayer,
    TriggeredLayer,
}

/// A handle to a layer's source: the source's id plus a snapshot of its
/// data taken when the layer was created. Resolution reads the live object
/// when it still exists and the snapshot otherwise.
#[derive(Debug, Clone)]
pub struct SourceHandle {
    pub id: ObjectId,
    pub snapshot: ObjectSnapshot,
}

impl SourceHandle {
    pub fn of(obj: &Object) -> Self {
        Self {
            id: obj.id,
            snapshot: ObjectSnapshot::capture(obj),
        }
    }
}

/// An unresolved ability or card instance on the stack.
#[derive(Debug, Clone)]
pub struct Layer {
    /// The layer's own object identity.
    pub id: ObjectId,
    pub kind: LayerKind,
    pub source: SourceHandle,
    pub owner: Option<PlayerId>,
    /// The stack is a contested zone; a layer always has a controller.
    pub controller: PlayerId,
    pub effects: Vec<Effect>,
    /// Declared targets, locked when the layer was created.
    pub targets: Vec<Target>,
}

impl Layer {
    /// A card played as a layer. Owner is the card's owner.
    pub fn card_layer(
        card: &Object,
        playing_player: PlayerId,
        effects: Vec<Effect>,
        targets: Vec<Target>,
    ) -> Self {
        Self {
            id: ObjectId::new(),
            kind: LayerKind::CardLayer,
            source: SourceHandle::of(card),
            owner: card.owner,
            controller: playing_player,
            effects,
            targets,
        }
    }

    /// An activated ability. Owner and controller are the activating player.
    pub fn activated_layer(
        source: &Object,
        activating_player: PlayerId,
        effects: Vec<Effect>,
        targets: Vec<Target>,
    ) -> Self {
        Self {
            id: ObjectId::new(),
            kind: LayerKind::ActivatedLayer,
            source: SourceHandle::of(source),
            owner: Some(activating_player),
            controller: activating_player,
            effects,
            targets,
        }
    }

    /// A triggered ability. Owner and controller were fixed when the
    /// trigger fired.
    pub fn triggered_layer(pending: PendingTrigger) -> Self {
        Self {
            id: ObjectId::new(),
            kind: LayerKind::TriggeredLayer,
            source: SourceHandle {
                id: pending.source,
                snapshot: pending.snapshot,
            },
            owner: Some(pending.player),
            controller: pending.player,
            effects: pending.effects,
            targets: Vec::new(),
        }
    }
}

/// The last-in-first-out pending-ability list.
#[derive(Debug, Clone, Default)]
pub struct Stack {
    layers: Vec<Layer>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Pop the top layer for resolution.
    pub fn pop(&mut self) -> Option<Layer> {
        self.layers.pop()
    }

    pub fn top(&self) -> Option<&Layer> {
        self.layers.last()
    }

    /// Layers from bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }
}
