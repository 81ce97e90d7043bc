//! The single shared mutable structure owned by the engine: object index,
//! zones, stack, ledger, turn state, and the effect managers.
//!
//! Objects are stored by stable identifier in an index; zone and controller
//! relationships are lookups, never embedded back-pointers. External
//! callers act only through the engine's query/action API.

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::card::{CardDefinition, hero_definition};
use crate::combat::CombatChain;
use crate::ids::{CardId, ObjectId, PlayerId};
use crate::ledger::AssetLedger;
use crate::object::{Object, ObjectKind};
use crate::player::Player;
use crate::precedence::PrecedenceManager;
use crate::property::PropertyKind;
use crate::replacement::ReplacementManager;
use crate::snapshot::ObjectSnapshot;
use crate::stack::Stack;
use crate::turn::TurnState;
use crate::zone::Zone;

/// How the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Win { winner: PlayerId, loser: PlayerId },
    Draw,
}

/// Setup knobs for a game instance.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub starting_hand_size: usize,
    /// Action points granted to the turn-holder each action phase.
    pub action_points: u32,
    /// RNG seed for deterministic shuffles.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_hand_size: 4,
            action_points: 1,
            seed: None,
        }
    }
}

/// The complete state of one game instance. Multiple instances are fully
/// independent; nothing is shared between them.
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub players: Vec<Player>,
    pub turn_order: Vec<PlayerId>,
    objects: HashMap<ObjectId, Object>,
    /// The shared arena zone (heroes, equipment, tokens, attacks).
    pub arena: Vec<ObjectId>,
    pub stack: Stack,
    pub ledger: AssetLedger,
    pub turn: TurnState,
    pub replacements: ReplacementManager,
    pub precedence: PrecedenceManager,
    pub combat: CombatChain,
    /// Last-known-information store: snapshots of objects that have ceased
    /// to exist, keyed by their final id.
    lki: HashMap<ObjectId, ObjectSnapshot>,
    /// Sources whose continuous "look" effects are waiting to begin.
    pub pending_look_effects: Vec<ObjectId>,
    /// Sources whose "look" effects are active.
    pub active_look_effects: Vec<ObjectId>,
    pub outcome: Option<GameOutcome>,
    rng: StdRng,
}

impl GameState {
    /// Create a game with default heroes at the given starting life.
    pub fn new(names: Vec<String>, starting_life: i32) -> Self {
        Self::new_with_config(names, starting_life, GameConfig::default())
    }

    pub fn new_with_config(names: Vec<String>, starting_life: i32, config: GameConfig) -> Self {
        let player_count = names.len();
        let mut players = Vec::with_capacity(player_count);
        let mut turn_order = Vec::with_capacity(player_count);
        for (index, name) in names.into_iter().enumerate() {
            let id = PlayerId::from_index(index as u8);
            players.push(Player::new(id, name));
            turn_order.push(id);
        }

        let first_player = turn_order[0];
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut game = Self {
            config,
            players,
            turn_order: turn_order.clone(),
            objects: HashMap::new(),
            arena: Vec::new(),
            stack: Stack::new(),
            ledger: AssetLedger::new(player_count),
            turn: TurnState::new(first_player),
            replacements: ReplacementManager::new(),
            precedence: PrecedenceManager::new(),
            combat: CombatChain::new(),
            lki: HashMap::new(),
            pending_look_effects: Vec::new(),
            active_look_effects: Vec::new(),
            outcome: None,
            rng,
        };

        for player_id in turn_order {
            let name = game.player(player_id).unwrap().name.clone();
            let def = hero_definition(CardId::new(), &format!("{name}'s Hero"), starting_life, 4);
            let hero = game.create_object_from_definition(&def, player_id, Zone::Arena);
            game.player_mut(player_id).unwrap().hero = Some(hero);
        }

        // Base playability rules: cards are played from hand or arsenal.
        // Playing from anywhere else takes an effect-level allowance, which
        // overrides these game-rule restrictions.
        use crate::precedence::{Directive, GovernedAction};
        for zone in [Zone::Deck, Zone::Pitch, Zone::Graveyard, Zone::Banished] {
            game.precedence.register(
                Directive::restriction(GovernedAction::PlayCard)
                    .game_rule()
                    .from_zone(zone),
            );
        }

        game
    }

    // =========================================================================
    // Players
    // =========================================================================

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn players_in_game(&self) -> usize {
        self.players.iter().filter(|p| p.is_in_game()).count()
    }

    /// The other player in a two-player game.
    pub fn opponent(&self, player: PlayerId) -> PlayerId {
        self.turn_order
            .iter()
            .copied()
            .find(|p| *p != player)
            .unwrap_or(player)
    }

    /// Players in turn order starting from the given player.
    pub fn turn_order_from(&self, start: PlayerId) -> Vec<PlayerId> {
        let start_index = self
            .turn_order
            .iter()
            .position(|p| *p == start)
            .unwrap_or(0);
        (0..self.turn_order.len())
            .map(|i| self.turn_order[(start_index + i) % self.turn_order.len()])
            .collect()
    }

    // =========================================================================
    // Objects
    // =========================================================================

    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(&id)
    }

    pub fn object_exists(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// All objects currently in the arena, heroes included.
    pub fn objects_in_arena(&self) -> Vec<&Object> {
        self.arena
            .iter()
            .filter_map(|id| self.objects.get(id))
            .collect()
    }

    /// Create an object from a card definition and place it in a zone.
    pub fn create_object_from_definition(
        &mut self,
        def: &CardDefinition,
        owner: PlayerId,
        zone: Zone,
    ) -> ObjectId {
        let id = ObjectId::new();
        let obj = Object::from_definition(id, def, owner, zone);
        self.objects.insert(id, obj);
        self.insert_into_zone_list(id, owner, zone);
        id
    }

    /// Register an already-built object (tokens, macros, attack proxies).
    pub fn register_object(&mut self, obj: Object) -> ObjectId {
        let id = obj.id;
        let zone = obj.zone;
        let owner = obj.owner.or(obj.controller).unwrap_or(self.turn.turn_player);
        self.objects.insert(id, obj);
        self.insert_into_zone_list(id, owner, zone);
        id
    }

    fn insert_into_zone_list(&mut self, id: ObjectId, owner: PlayerId, zone: Zone) {
        match zone {
            Zone::Arena => self.arena.push(id),
            Zone::Stack => {}
            _ => {
                if let Some(list) = self
                    .player_mut(owner)
                    .and_then(|p| p.zone_list_mut(zone))
                {
                    list.push(id);
                }
            }
        }
    }

    fn remove_from_zone_list(&mut self, id: ObjectId, owner: Option<PlayerId>, zone: Zone) {
        match zone {
            Zone::Arena => self.arena.retain(|o| *o != id),
            Zone::Stack => {}
            _ => {
                if let Some(owner) = owner
                    && let Some(list) = self
                        .player_mut(owner)
                        .and_then(|p| p.zone_list_mut(zone))
                {
                    list.retain(|o| *o != id);
                }
            }
        }
    }

    /// Move an object to a new zone, maintaining zone lists and the
    /// controller axis: entering a contested zone assigns the mover's
    /// controller (defaulting to owner), leaving one clears it. Tokens,
    /// macros, and attack proxies cease to exist when they leave the arena.
    pub fn move_object(&mut self, id: ObjectId, to: Zone) -> bool {
        let Some(obj) = self.objects.get(&id) else {
            return false;
        };
        let from = obj.zone;
        let owner = obj.owner;
        let kind = obj.kind;

        if from == to {
            return false;
        }

        if kind != ObjectKind::Card && from == Zone::Arena {
            self.cease_to_exist(id);
            return true;
        }

        self.remove_from_zone_list(id, owner, from);
        let obj = self.objects.get_mut(&id).expect("object present");
        obj.zone = to;
        obj.controller = if to.is_contested() {
            obj.controller.or(obj.owner)
        } else {
            None
        };
        let owner = obj.owner.or(obj.controller).unwrap_or(self.turn.turn_player);
        self.insert_into_zone_list(id, owner, to);
        true
    }

    /// Remove an object from the game, capturing last-known information at
    /// the instant it ceases to exist.
    pub fn cease_to_exist(&mut self, id: ObjectId) {
        let Some(obj) = self.objects.get(&id) else {
            return;
        };
        let owner = obj.owner;
        let zone = obj.zone;
        let snapshot = ObjectSnapshot::capture(obj);
        self.lki.insert(id, snapshot);
        self.remove_from_zone_list(id, owner, zone);
        self.objects.remove(&id);
        self.replacements.remove_from_source(id);
        self.precedence.expire_from_source(id);
        self.pending_look_effects.retain(|o| *o != id);
        self.active_look_effects.retain(|o| *o != id);
    }

    /// Last-known information for an object that has ceased to exist.
    pub fn lki(&self, id: ObjectId) -> Option<&ObjectSnapshot> {
        self.lki.get(&id)
    }

    /// Store a pre-captured snapshot, overriding the one taken at removal.
    /// Used for simultaneous clearings, where every snapshot must reflect
    /// the state before any of them was performed.
    pub fn store_lki(&mut self, id: ObjectId, snapshot: ObjectSnapshot) {
        self.lki.insert(id, snapshot);
    }

    // =========================================================================
    // Heroes and life
    // =========================================================================

    pub fn hero_of(&self, player: PlayerId) -> Option<&Object> {
        let hero_id = self.player(player)?.hero?;
        self.object(hero_id)
    }

    /// The player's hero's modified life value.
    pub fn hero_life(&self, player: PlayerId) -> Option<u32> {
        self.hero_of(player)?.life()
    }

    /// Adjust a living object's life by a modifier delta (damage, life
    /// gain/loss). The modified value clamps at zero on read.
    pub fn adjust_life(&mut self, id: ObjectId, delta: i32) {
        if let Some(obj) = self.objects.get_mut(&id)
            && obj.has_property(PropertyKind::Life)
        {
            obj.properties
                .numeric_mut(PropertyKind::Life)
                .adjust_modifier(delta);
        }
    }

    // =========================================================================
    // Decks
    // =========================================================================

    /// Deterministically shuffle a player's deck.
    pub fn shuffle_deck(&mut self, player: PlayerId) {
        let mut rng = self.rng.clone();
        if let Some(p) = self.player_mut(player) {
            p.shuffle_deck(&mut rng);
        }
        self.rng = rng;
    }

    /// Move the top card of the deck to the player's hand. Returns the
    /// card, or `None` if the deck is empty.
    pub fn draw_one(&mut self, player: PlayerId) -> Option<ObjectId> {
        let card = self.player_mut(player)?.take_top_of_deck()?;
        if let Some(obj) = self.objects.get_mut(&card) {
            obj.zone = Zone::Hand;
        }
        self.player_mut(player)?.hand.push(card);
        Some(card)
    }

    pub fn deck_size(&self, player: PlayerId) -> usize {
        self.player(player).map(|p| p.deck.len()).unwrap_or(0)
    }
}
