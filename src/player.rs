//! Per-player state: hero, zone lists, and deck handling.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::ids::{ObjectId, PlayerId};
use crate::zone::Zone;

/// One player's side of the game.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// The player's hero object, set during game setup.
    pub hero: Option<ObjectId>,
    /// Top of deck is the end of the vec.
    pub deck: Vec<ObjectId>,
    pub hand: Vec<ObjectId>,
    /// At most one card, staged face down.
    pub arsenal: Vec<ObjectId>,
    /// Pitched cards in pitch order; recycled to the deck bottom at end of
    /// turn.
    pub pitch: Vec<ObjectId>,
    pub graveyard: Vec<ObjectId>,
    pub banished: Vec<ObjectId>,
    in_game: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            hero: None,
            deck: Vec::new(),
            hand: Vec::new(),
            arsenal: Vec::new(),
            pitch: Vec::new(),
            graveyard: Vec::new(),
            banished: Vec::new(),
            in_game: true,
        }
    }

    pub fn is_in_game(&self) -> bool {
        self.in_game
    }

    pub fn leave_game(&mut self) {
        self.in_game = false;
    }

    /// The list of objects in one of this player's zones. Shared zones
    /// (arena, stack) are not per-player and return `None`.
    pub fn zone_list(&self, zone: Zone) -> Option<&Vec<ObjectId>> {
        match zone {
            Zone::Deck => Some(&self.deck),
            Zone::Hand => Some(&self.hand),
            Zone::Arsenal => Some(&self.arsenal),
            Zone::Pitch => Some(&self.pitch),
            Zone::Graveyard => Some(&self.graveyard),
            Zone::Banished => Some(&self.banished),
            Zone::Arena | Zone::Stack => None,
        }
    }

    pub fn zone_list_mut(&mut self, zone: Zone) -> Option<&mut Vec<ObjectId>> {
        match zone {
            Zone::Deck => Some(&mut self.deck),
            Zone::Hand => Some(&mut self.hand),
            Zone::Arsenal => Some(&mut self.arsenal),
            Zone::Pitch => Some(&mut self.pitch),
            Zone::Graveyard => Some(&mut self.graveyard),
            Zone::Banished => Some(&mut self.banished),
            Zone::Arena | Zone::Stack => None,
        }
    }

    /// Take the top card of the deck.
    pub fn take_top_of_deck(&mut self) -> Option<ObjectId> {
        self.deck.pop()
    }

    /// Return the pitched cards, clearing the pitch zone. Callers put them
    /// on the bottom of the deck in pitch order.
    pub fn take_pitch(&mut self) -> Vec<ObjectId> {
        std::mem::take(&mut self.pitch)
    }

    pub fn shuffle_deck(&mut self, rng: &mut StdRng) {
        self.deck.shuffle(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn ids(values: &[u64]) -> Vec<ObjectId> {
        values.iter().map(|v| ObjectId::from_raw(*v)).collect()
    }

    #[test]
    fn test_deck_top_is_end() {
        let mut player = Player::new(PlayerId::from_index(0), "Alice".to_string());
        player.deck = ids(&[1, 2, 3]);
        assert_eq!(player.take_top_of_deck(), Some(ObjectId::from_raw(3)));
        assert_eq!(player.take_top_of_deck(), Some(ObjectId::from_raw(2)));
    }

    #[test]
    fn test_take_pitch_preserves_order() {
        let mut player = Player::new(PlayerId::from_index(0), "Alice".to_string());
        player.pitch = ids(&[5, 6]);
        let pitch = player.take_pitch();
        assert_eq!(pitch, ids(&[5, 6]));
        assert!(player.pitch.is_empty());
    }

    #[test]
    fn test_shuffle_is_seed_deterministic() {
        let mut a = Player::new(PlayerId::from_index(0), "A".to_string());
        let mut b = Player::new(PlayerId::from_index(1), "B".to_string());
        a.deck = ids(&[1, 2, 3, 4, 5, 6, 7, 8]);
        b.deck = ids(&[1, 2, 3, 4, 5, 6, 7, 8]);

        let mut rng_a = StdRng::seed_from_u64(11);
        let mut rng_b = StdRng::seed_from_u64(11);
        a.shuffle_deck(&mut rng_a);
        b.shuffle_deck(&mut rng_b);
        assert_eq!(a.deck, b.deck);
    }

    #[test]
    fn test_shared_zones_have_no_player_list() {
        let player = Player::new(PlayerId::from_index(0), "Alice".to_string());
        assert!(player.zone_list(Zone::Arena).is_none());
        assert!(player.zone_list(Zone::Stack).is_none());
        assert!(player.zone_list(Zone::Hand).is_some());
    }
}
