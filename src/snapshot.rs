//! Last-known-information snapshots.
//!
//! When an object ceases to exist, the engine captures an immutable
//! snapshot of its full state. The snapshot exists only to satisfy rules
//! and effects that still reference that specific object; it is never a
//! valid target and is never mutated after capture.

use std::collections::HashSet;

use crate::counter::CounterKind;
use crate::ids::{CardId, ObjectId, PlayerId};
use crate::object::{Object, ObjectKind};
use crate::property::PropertyKind;
use crate::types::{CardType, Class, Keyword, Subtype, Talent};
use crate::zone::Zone;

/// An immutable snapshot of an object's full state at the instant it
/// ceased to exist.
#[derive(Debug, Clone)]
pub struct ObjectSnapshot {
    pub object_id: ObjectId,
    pub kind: ObjectKind,
    pub card: Option<CardId>,

    pub name: String,
    pub card_types: Vec<CardType>,
    pub subtypes: Vec<Subtype>,
    pub class: Class,
    pub talent: Option<Talent>,
    pub keywords: HashSet<Keyword>,

    pub owner: Option<PlayerId>,
    pub controller: Option<PlayerId>,
    pub zone: Zone,

    /// Base values of the numeric properties the object had.
    pub base_values: Vec<(PropertyKind, u32)>,
    /// Modified values of the numeric properties the object had.
    pub values: Vec<(PropertyKind, u32)>,
    pub counters: Vec<(CounterKind, u32)>,
}

impl ObjectSnapshot {
    /// Capture an object's state at this moment.
    pub fn capture(obj: &Object) -> Self {
        let mut base_values = Vec::new();
        let mut values = Vec::new();
        for kind in PropertyKind::NUMERIC {
            if obj.has_property(kind) {
                if let Some(base) = obj.base_value(kind) {
                    base_values.push((kind, base));
                }
                if let Some(value) = obj.value(kind) {
                    values.push((kind, value));
                }
            }
        }

        Self {
            object_id: obj.id,
            kind: obj.kind,
            card: obj.card,
            name: obj.name.clone(),
            card_types: obj.card_types.clone(),
            subtypes: obj.subtypes.clone(),
            class: obj.class,
            talent: obj.talent,
            keywords: obj.keywords.clone(),
            owner: obj.owner,
            controller: obj.controller,
            zone: obj.zone,
            base_values,
            values,
            counters: obj.counters.snapshot(),
        }
    }

    /// The modified value a numeric property had at capture.
    pub fn value(&self, kind: PropertyKind) -> Option<u32> {
        self.values
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, v)| *v)
    }

    /// The base value a numeric property had at capture.
    pub fn base_value(&self, kind: PropertyKind) -> Option<u32> {
        self.base_values
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, v)| *v)
    }

    pub fn power(&self) -> Option<u32> {
        self.value(PropertyKind::Power)
    }

    pub fn counter_count(&self, kind: &CounterKind) -> u32 {
        self.counters
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn has_card_type(&self, card_type: CardType) -> bool {
        self.card_types.contains(&card_type)
    }

    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }
}
