//! Static card data: what the external loader hands the engine.
//!
//! A card definition is the printed face of a card: name, cost, type box,
//! printed numeric properties, and ability text already parsed into effect
//! primitives. The engine never sees raw rules text.

use crate::ability::Ability;
use crate::ids::CardId;
use crate::property::PropertyKind;
use crate::types::{CardType, Class, Keyword, Subtype, Talent};

/// Static card definition from the card database.
#[derive(Debug, Clone)]
pub struct CardDefinition {
    pub id: CardId,
    pub name: String,
    pub card_types: Vec<CardType>,
    pub subtypes: Vec<Subtype>,
    pub class: Class,
    pub talent: Option<Talent>,
    pub keywords: Vec<Keyword>,
    pub text: String,

    // Printed numeric properties. Absent means the card does not have the
    // property at all, which is different from a printed zero.
    pub cost: Option<i32>,
    pub power: Option<i32>,
    pub defense: Option<i32>,
    pub life: Option<i32>,
    pub intellect: Option<i32>,
    pub pitch: Option<i32>,

    /// Abilities, pre-parsed into effect primitives by the loader.
    pub abilities: Vec<Ability>,
    /// Effects executed when the card resolves as a layer (non-permanents).
    pub on_resolve: Vec<crate::effect::Effect>,
}

impl CardDefinition {
    /// The printed numeric properties as (kind, base) pairs.
    pub fn printed_values(&self) -> Vec<(PropertyKind, i32)> {
        let mut values = Vec::new();
        if let Some(cost) = self.cost {
            values.push((PropertyKind::Cost, cost));
        }
        if let Some(power) = self.power {
            values.push((PropertyKind::Power, power));
        }
        if let Some(defense) = self.defense {
            values.push((PropertyKind::Defense, defense));
        }
        if let Some(life) = self.life {
            values.push((PropertyKind::Life, life));
        }
        if let Some(intellect) = self.intellect {
            values.push((PropertyKind::Intellect, intellect));
        }
        if let Some(pitch) = self.pitch {
            values.push((PropertyKind::Pitch, pitch));
        }
        values
    }

    pub fn is_hero(&self) -> bool {
        self.card_types.contains(&CardType::Hero)
    }
}

/// Builder for card definitions.
#[derive(Debug, Clone)]
pub struct CardBuilder {
    def: CardDefinition,
}

impl CardBuilder {
    pub fn new(id: CardId, name: &str) -> Self {
        Self {
            def: CardDefinition {
                id,
                name: name.to_string(),
                card_types: Vec::new(),
                subtypes: Vec::new(),
                class: Class::Generic,
                talent: None,
                keywords: Vec::new(),
                text: String::new(),
                cost: None,
                power: None,
                defense: None,
                life: None,
                intellect: None,
                pitch: None,
                abilities: Vec::new(),
                on_resolve: Vec::new(),
            },
        }
    }

    pub fn card_types(mut self, card_types: Vec<CardType>) -> Self {
        self.def.card_types = card_types;
        self
    }

    pub fn subtypes(mut self, subtypes: Vec<Subtype>) -> Self {
        self.def.subtypes = subtypes;
        self
    }

    pub fn class(mut self, class: Class) -> Self {
        self.def.class = class;
        self
    }

    pub fn talent(mut self, talent: Talent) -> Self {
        self.def.talent = Some(talent);
        self
    }

    pub fn keywords(mut self, keywords: Vec<Keyword>) -> Self {
        self.def.keywords = keywords;
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.def.text = text.to_string();
        self
    }

    pub fn cost(mut self, cost: i32) -> Self {
        self.def.cost = Some(cost);
        self
    }

    pub fn power(mut self, power: i32) -> Self {
        self.def.power = Some(power);
        self
    }

    pub fn defense(mut self, defense: i32) -> Self {
        self.def.defense = Some(defense);
        self
    }

    pub fn life(mut self, life: i32) -> Self {
        self.def.life = Some(life);
        self
    }

    pub fn intellect(mut self, intellect: i32) -> Self {
        self.def.intellect = Some(intellect);
        self
    }

    pub fn pitch(mut self, pitch: i32) -> Self {
        self.def.pitch = Some(pitch);
        self
    }

    pub fn ability(mut self, ability: Ability) -> Self {
        self.def.abilities.push(ability);
        self
    }

    pub fn on_resolve(mut self, effects: Vec<crate::effect::Effect>) -> Self {
        self.def.on_resolve = effects;
        self
    }

    pub fn build(self) -> CardDefinition {
        self.def
    }
}

/// A hero definition helper: heroes carry life and intellect.
pub fn hero_definition(id: CardId, name: &str, life: i32, intellect: i32) -> CardDefinition {
    CardBuilder::new(id, name)
        .card_types(vec![CardType::Hero])
        .life(life)
        .intellect(intellect)
        .build()
}
