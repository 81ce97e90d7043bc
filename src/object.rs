//! Runtime representation of game objects: cards, tokens, macros, and
//! attack proxies. Layers live on the stack and are modeled in `stack`.

use std::collections::HashSet;

use crate::ability::Ability;
use crate::card::CardDefinition;
use crate::counter::{CounterKind, CounterMap, CounterSymbol};
use crate::ids::{CardId, ObjectId, PlayerId};
use crate::property::{PropertyKind, PropertySet};
use crate::types::{CardType, Class, Keyword, Subtype, Talent};
use crate::zone::Zone;

/// The kind of game object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// A physical card.
    Card,
    /// A token object.
    Token,
    /// A rules- or effect-generated macro object. Macros may have no owner.
    Macro,
    /// An attack proxy representing a weapon strike on the combat chain.
    Attack,
}

/// Runtime representation of a game object.
///
/// Ownership and control are independent axes: the owner is assigned once
/// at creation and never changes (and may be absent); the controller exists
/// only while the object is in a contested zone.
#[derive(Debug, Clone)]
pub struct Object {
    pub id: ObjectId,
    pub kind: ObjectKind,
    /// Reference to the card definition this object was created from.
    pub card: Option<CardId>,

    // Identity set, used for name/type matching.
    pub name: String,
    pub card_types: Vec<CardType>,
    pub subtypes: Vec<Subtype>,
    pub class: Class,
    pub talent: Option<Talent>,
    pub keywords: HashSet<Keyword>,
    pub text: String,

    pub owner: Option<PlayerId>,
    pub controller: Option<PlayerId>,
    pub zone: Zone,

    pub properties: PropertySet,
    pub counters: CounterMap,
    pub abilities: Vec<Ability>,
    /// Effects executed when this card resolves as a layer.
    pub resolve_effects: Vec<crate::effect::Effect>,
}

impl Object {
    /// Creates a new object from a card definition.
    pub fn from_definition(
        id: ObjectId,
        def: &CardDefinition,
        owner: PlayerId,
        zone: Zone,
    ) -> Self {
        let mut properties = PropertySet::new();
        properties.grant(PropertyKind::Name);
        properties.grant(PropertyKind::Types);
        properties.grant(PropertyKind::Class);
        if !def.subtypes.is_empty() {
            properties.grant(PropertyKind::Subtypes);
        }
        if def.talent.is_some() {
            properties.grant(PropertyKind::Talent);
        }
        if !def.keywords.is_empty() {
            properties.grant(PropertyKind::Keywords);
        }
        if !def.text.is_empty() {
            properties.grant(PropertyKind::Text);
        }
        for (kind, base) in def.printed_values() {
            properties.grant_numeric(kind, base);
        }

        Self {
            id,
            kind: ObjectKind::Card,
            card: Some(def.id),
            name: def.name.clone(),
            card_types: def.card_types.clone(),
            subtypes: def.subtypes.clone(),
            class: def.class,
            talent: def.talent,
            keywords: def.keywords.iter().copied().collect(),
            text: def.text.clone(),
            owner: Some(owner),
            controller: if zone.is_contested() { Some(owner) } else { None },
            zone,
            properties,
            counters: CounterMap::new(),
            abilities: def.abilities.clone(),
            resolve_effects: def.on_resolve.clone(),
        }
    }

    /// Creates a token in the arena.
    pub fn new_token(
        id: ObjectId,
        owner: PlayerId,
        name: String,
        card_types: Vec<CardType>,
        subtypes: Vec<Subtype>,
    ) -> Self {
        let mut properties = PropertySet::new();
        properties.grant(PropertyKind::Name);
        properties.grant(PropertyKind::Types);
        Self {
            id,
            kind: ObjectKind::Token,
            card: None,
            name,
            card_types,
            subtypes,
            class: Class::Generic,
            talent: None,
            keywords: HashSet::new(),
            text: String::new(),
            owner: Some(owner),
            controller: Some(owner),
            zone: Zone::Arena,
            properties,
            counters: CounterMap::new(),
            abilities: Vec::new(),
            resolve_effects: Vec::new(),
        }
    }

    /// Creates a rules-generated macro object. Macros have no owner.
    pub fn new_macro(id: ObjectId, name: String, controller: PlayerId) -> Self {
        let mut properties = PropertySet::new();
        properties.grant(PropertyKind::Name);
        Self {
            id,
            kind: ObjectKind::Macro,
            card: None,
            name,
            card_types: vec![CardType::Macro],
            subtypes: Vec::new(),
            class: Class::Generic,
            talent: None,
            keywords: HashSet::new(),
            text: String::new(),
            owner: None,
            controller: Some(controller),
            zone: Zone::Arena,
            properties,
            counters: CounterMap::new(),
            abilities: Vec::new(),
            resolve_effects: Vec::new(),
        }
    }

    /// The counter contribution to a numeric property, folded in at the
    /// same evaluation step as non-base modifiers.
    fn counter_sum(&self, kind: PropertyKind) -> i32 {
        match kind {
            PropertyKind::Power => self.counters.symbol_sum(CounterSymbol::Power),
            PropertyKind::Defense => self.counters.symbol_sum(CounterSymbol::Defense),
            PropertyKind::Life => self.counters.symbol_sum(CounterSymbol::Life),
            _ => 0,
        }
    }

    /// Whether the object currently has a property.
    pub fn has_property(&self, kind: PropertyKind) -> bool {
        self.properties.has(kind)
    }

    /// The base value of a numeric property, if present.
    pub fn base_value(&self, kind: PropertyKind) -> Option<u32> {
        self.properties.numeric(kind).map(|v| v.base())
    }

    /// The modified value of a numeric property, if present: base plus all
    /// active modifiers and counters, clamped at zero.
    pub fn value(&self, kind: PropertyKind) -> Option<u32> {
        let counter_sum = self.counter_sum(kind);
        self.properties
            .numeric(kind)
            .map(|v| v.modified(counter_sum))
    }

    pub fn power(&self) -> Option<u32> {
        self.value(PropertyKind::Power)
    }

    pub fn defense(&self) -> Option<u32> {
        self.value(PropertyKind::Defense)
    }

    pub fn life(&self) -> Option<u32> {
        self.value(PropertyKind::Life)
    }

    pub fn pitch(&self) -> Option<u32> {
        self.value(PropertyKind::Pitch)
    }

    pub fn cost(&self) -> Option<u32> {
        self.value(PropertyKind::Cost)
    }

    pub fn intellect(&self) -> Option<u32> {
        self.value(PropertyKind::Intellect)
    }

    /// A living object has a life property; it is cleared when that
    /// property's modified value reaches zero.
    pub fn is_living(&self) -> bool {
        self.has_property(PropertyKind::Life)
    }

    pub fn is_hero(&self) -> bool {
        self.has_card_type(CardType::Hero)
    }

    pub fn has_card_type(&self, card_type: CardType) -> bool {
        self.card_types.contains(&card_type)
    }

    pub fn has_subtype(&self, subtype: Subtype) -> bool {
        self.subtypes.contains(&subtype)
    }

    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    pub fn is_attack(&self) -> bool {
        self.has_subtype(Subtype::Attack) || self.kind == ObjectKind::Attack
    }

    /// Adds counters of the specified kind.
    pub fn add_counters(&mut self, kind: CounterKind, amount: u32) {
        self.counters.add(kind, amount);
    }

    /// Removes counters of the specified kind. Returns the number removed.
    pub fn remove_counters(&mut self, kind: &CounterKind, amount: u32) -> u32 {
        self.counters.remove(kind, amount)
    }
}
