//! The asset ledger: per-player pools of the four point kinds.
//!
//! Action, resource, and chi points live in per-player pools; life is not
//! pooled here, it derives from the hero object's life property. Chi
//! substitutes for resource and is always spent first; it never substitutes
//! for life or action points. Action points are scoped to the turn-holder's
//! action phase.

use crate::ids::PlayerId;

/// The four asset kinds costs are paid in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Action,
    Resource,
    Life,
    Chi,
}

impl AssetKind {
    /// Payment order across kinds: chi, then resource, then life, then
    /// action. Each kind is fully paid before the next begins.
    pub const PAYMENT_ORDER: [AssetKind; 4] = [
        AssetKind::Chi,
        AssetKind::Resource,
        AssetKind::Life,
        AssetKind::Action,
    ];
}

/// One player's pooled points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetPool {
    pub action: u32,
    pub resource: u32,
    pub chi: u32,
}

impl AssetPool {
    pub fn is_empty(&self) -> bool {
        self.action == 0 && self.resource == 0 && self.chi == 0
    }

    /// Points available toward a resource payment: chi substitutes.
    pub fn resource_capacity(&self) -> u32 {
        self.resource + self.chi
    }

    /// Spend toward a resource cost, chi first. Returns the amount still
    /// unpaid after the pool is exhausted.
    pub fn spend_resource(&mut self, amount: u32) -> u32 {
        let from_chi = self.chi.min(amount);
        self.chi -= from_chi;
        let remaining = amount - from_chi;
        let from_resource = self.resource.min(remaining);
        self.resource -= from_resource;
        remaining - from_resource
    }

    /// Spend chi directly (a chi-kind cost component).
    pub fn spend_chi(&mut self, amount: u32) -> u32 {
        let spent = self.chi.min(amount);
        self.chi -= spent;
        amount - spent
    }

    /// Spend action points.
    pub fn spend_action(&mut self, amount: u32) -> u32 {
        let spent = self.action.min(amount);
        self.action -= spent;
        amount - spent
    }
}

/// Per-player asset pools, indexed by player.
#[derive(Debug, Clone, Default)]
pub struct AssetLedger {
    pools: Vec<AssetPool>,
}

impl AssetLedger {
    pub fn new(player_count: usize) -> Self {
        Self {
            pools: vec![AssetPool::default(); player_count],
        }
    }

    pub fn pool(&self, player: PlayerId) -> &AssetPool {
        &self.pools[player.index()]
    }

    pub fn pool_mut(&mut self, player: PlayerId) -> &mut AssetPool {
        &mut self.pools[player.index()]
    }

    /// Credit points of a pooled kind. Life is not pooled; crediting life
    /// goes through the hero object, not the ledger.
    pub fn credit(&mut self, player: PlayerId, kind: AssetKind, amount: u32) {
        let pool = self.pool_mut(player);
        match kind {
            AssetKind::Action => pool.action += amount,
            AssetKind::Resource => pool.resource += amount,
            AssetKind::Chi => pool.chi += amount,
            AssetKind::Life => {}
        }
    }

    /// Grant the action points for the start of a player's action phase.
    pub fn grant_action_points(&mut self, player: PlayerId, amount: u32) {
        self.pool_mut(player).action = amount;
    }

    /// Clear phase-scoped action points at the end of the action phase.
    pub fn clear_action_points(&mut self, player: PlayerId) {
        self.pool_mut(player).action = 0;
    }

    /// Clear all pooled points for a player (end of turn).
    pub fn clear_pools(&mut self, player: PlayerId) {
        *self.pool_mut(player) = AssetPool::default();
    }
}
