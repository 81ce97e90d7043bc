//! The combat chain: attacks, chain links, and defender declarations.
//!
//! Each attack that resolves opens a chain link. Defenders declared on a
//! link are locked: precedence is evaluated at the moment of declaration,
//! and later restriction changes never retroactively remove a declared
//! defender. The chain close step is run by the game-state-action pass
//! once something has closed the chain.

use crate::ids::ObjectId;

/// One attack and its locked defenders.
#[derive(Debug, Clone)]
pub struct ChainLink {
    pub attack: ObjectId,
    /// Declared defending cards, locked at declaration.
    pub defenders: Vec<ObjectId>,
    /// Set once the defending player has finished declaring.
    pub defenders_declared: bool,
    /// Set once the link's damage step has resolved.
    pub resolved: bool,
}

impl ChainLink {
    pub fn new(attack: ObjectId) -> Self {
        Self {
            attack,
            defenders: Vec::new(),
            defenders_declared: false,
            resolved: false,
        }
    }
}

/// The combat chain.
#[derive(Debug, Clone, Default)]
pub struct CombatChain {
    links: Vec<ChainLink>,
    open: bool,
    /// Something has closed the chain; the close step runs at the next
    /// game-state-action pass.
    pending_close: bool,
}

impl CombatChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn pending_close(&self) -> bool {
        self.pending_close
    }

    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    /// The link currently being fought, if any.
    pub fn current_link(&self) -> Option<&ChainLink> {
        self.links.last()
    }

    pub fn current_link_mut(&mut self) -> Option<&mut ChainLink> {
        self.links.last_mut()
    }

    /// Open a new chain link for a resolving attack.
    pub fn open_link(&mut self, attack: ObjectId) -> &mut ChainLink {
        self.open = true;
        self.pending_close = false;
        self.links.push(ChainLink::new(attack));
        self.links.last_mut().unwrap()
    }

    /// Declare a defender on the current link. Declarations accumulate;
    /// they are never removed by later effects.
    pub fn declare_defender(&mut self, defender: ObjectId) -> bool {
        match self.links.last_mut() {
            Some(link) if !link.resolved => {
                link.defenders.push(defender);
                true
            }
            _ => false,
        }
    }

    /// Number of defenders already declared on the current link.
    pub fn declared_defenders(&self) -> u32 {
        self.current_link()
            .map(|link| link.defenders.len() as u32)
            .unwrap_or(0)
    }

    /// Mark that something has closed the chain. The close step itself is
    /// performed by the game-state-action pass.
    pub fn request_close(&mut self) {
        if self.open {
            self.pending_close = true;
        }
    }

    /// Run the close step: clears all links and closes the chain. Returns
    /// the cards that were on the chain for graveyard routing.
    pub fn close(&mut self) -> Vec<ChainLink> {
        self.open = false;
        self.pending_close = false;
        std::mem::take(&mut self.links)
    }
}
