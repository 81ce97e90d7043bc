use std::sync::atomic::{AtomicU8, AtomicU32, AtomicU64, Ordering};

/// Global counter for auto-incrementing player IDs.
static PLAYER_ID_COUNTER: AtomicU8 = AtomicU8::new(0);
/// Global counter for auto-incrementing object IDs (starts at 1, 0 is reserved).
static OBJECT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
/// Global counter for auto-incrementing card definition IDs (starts at 1, 0 is reserved).
static CARD_ID_COUNTER: AtomicU32 = AtomicU32::new(1);

/// Player identifier, index-based for efficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u8);

/// Unique object identifier, monotonically increasing across all game
/// instances in the process. An object keeps one ID for its whole existence;
/// IDs are never reused, so a stale ID reliably resolves to nothing once its
/// object has ceased to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// Card definition identifier, references static card data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CardId(pub u32);

impl PlayerId {
    /// Create a new player ID with auto-incrementing counter.
    pub fn new() -> Self {
        Self(PLAYER_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Create a player ID from a specific index (for when you need explicit control).
    pub fn from_index(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectId {
    /// Create a new object ID with auto-incrementing counter.
    pub fn new() -> Self {
        Self(OBJECT_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Create an object ID from a specific value (for when you need explicit control).
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl CardId {
    /// Create a new card ID with auto-incrementing counter.
    pub fn new() -> Self {
        Self(CARD_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Create a card ID from a specific value (for when you need explicit control).
    pub fn from_raw(id: u32) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_from_index() {
        let p1 = PlayerId::from_index(0);
        let p2 = PlayerId::from_index(1);
        assert_ne!(p1, p2);
        assert_eq!(p1.index(), 0);
        assert_eq!(p2.index(), 1);
    }

    #[test]
    fn test_object_id_auto_increment() {
        let o1 = ObjectId::new();
        let o2 = ObjectId::new();
        assert_ne!(o1, o2);
        assert!(o2 > o1);
    }

    #[test]
    fn test_object_id_from_raw() {
        let o1 = ObjectId::from_raw(100);
        assert_eq!(o1.0, 100);
    }

    #[test]
    fn test_card_id_auto_increment() {
        let c1 = CardId::new();
        let c2 = CardId::new();
        assert_ne!(c1, c2);
    }
}
