//! Costs and their ordered payment.
//!
//! A cost is an asset-cost and/or an effect-cost. Multi-kind asset payment
//! runs chi, then resource, then life, then action, each kind fully paid
//! before the next begins. Pitching is offered only while the resource
//! component is being paid, and never beyond what that component needs.
//! Effect components run in payer-chosen order; a component intercepted by
//! a replacement effect still counts as paid. A cost evaluating to exactly
//! zero is still a real cost requiring explicit acknowledgment.

use tracing::debug;

use crate::decision::{CostContext, DecisionMaker, OrderContext};
use crate::effect::Effect;
use crate::event::EventBody;
use crate::executor::{ExecutionContext, execute_effect, fire_body};
use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId};
use crate::ledger::AssetKind;
use crate::stack::SourceHandle;
use crate::trigger::TriggerQueue;

/// Points demanded per asset kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetCost {
    pub action: u32,
    pub resource: u32,
    pub life: u32,
    pub chi: u32,
}

impl AssetCost {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn resource(amount: u32) -> Self {
        Self {
            resource: amount,
            ..Self::default()
        }
    }

    pub fn action(amount: u32) -> Self {
        Self {
            action: amount,
            ..Self::default()
        }
    }

    pub fn with_life(mut self, amount: u32) -> Self {
        self.life = amount;
        self
    }

    pub fn with_chi(mut self, amount: u32) -> Self {
        self.chi = amount;
        self
    }

    pub fn with_action(mut self, amount: u32) -> Self {
        self.action = amount;
        self
    }

    pub fn is_zero(&self) -> bool {
        self.action == 0 && self.resource == 0 && self.life == 0 && self.chi == 0
    }

    fn component(&self, kind: AssetKind) -> u32 {
        match kind {
            AssetKind::Action => self.action,
            AssetKind::Resource => self.resource,
            AssetKind::Life => self.life,
            AssetKind::Chi => self.chi,
        }
    }
}

/// A complete cost: asset components plus effect components.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cost {
    pub assets: AssetCost,
    pub effects: Vec<Effect>,
}

impl Cost {
    /// An empty cost. Still requires acknowledgment when paid.
    pub fn free() -> Self {
        Self::default()
    }

    pub fn resource(amount: u32) -> Self {
        Self {
            assets: AssetCost::resource(amount),
            effects: Vec::new(),
        }
    }

    pub fn assets(assets: AssetCost) -> Self {
        Self {
            assets,
            effects: Vec::new(),
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn is_zero(&self) -> bool {
        self.assets.is_zero() && self.effects.is_empty()
    }
}

/// Why a cost could not be paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CostError {
    /// The required points of a kind cannot be produced.
    Unpayable { kind: AssetKind },
    /// An effect component could not be generated or could not resolve.
    ComponentFailed(String),
    /// The payer declined to acknowledge the cost.
    Declined,
}

impl std::fmt::Display for CostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CostError::Unpayable { kind } => write!(f, "cannot produce {kind:?} points"),
            CostError::ComponentFailed(msg) => write!(f, "cost component failed: {msg}"),
            CostError::Declined => write!(f, "cost not acknowledged"),
        }
    }
}

/// Quick affordability check for legal-action computation: can the player
/// cover the asset components, counting pitchable cards in hand toward the
/// resource component?
pub fn can_cover_assets(game: &GameState, player: PlayerId, assets: &AssetCost) -> bool {
    let pool = game.ledger.pool(player);
    if pool.chi < assets.chi {
        return false;
    }
    let chi_left = pool.chi - assets.chi;
    let pitch_potential: u32 = game
        .player(player)
        .map(|p| {
            p.hand
                .iter()
                .filter_map(|id| game.object(*id).and_then(|o| o.pitch()))
                .sum()
        })
        .unwrap_or(0);
    if chi_left + pool.resource + pitch_potential < assets.resource {
        return false;
    }
    if game.hero_life(player).unwrap_or(0) < assets.life {
        return false;
    }
    pool.action >= assets.action
}

/// Pay a cost. Each asset kind is fully paid before the next begins, in
/// the fixed order chi, resource, life, action. On failure the caller
/// rolls the whole action back.
pub fn pay_cost(
    game: &mut GameState,
    queue: &mut TriggerQueue,
    dm: &mut dyn DecisionMaker,
    payer: PlayerId,
    source: &SourceHandle,
    cost: &Cost,
    pitch_plan: &[ObjectId],
) -> Result<(), CostError> {
    // Zero costs are real costs: explicit acknowledgment gates the action.
    if cost.is_zero() {
        let acknowledged = dm.acknowledge_cost(
            game,
            &CostContext {
                player: payer,
                description: "zero cost".to_string(),
            },
        );
        if !acknowledged {
            return Err(CostError::Declined);
        }
        return Ok(());
    }

    for kind in AssetKind::PAYMENT_ORDER {
        let demanded = cost.assets.component(kind);
        if demanded == 0 {
            continue;
        }
        debug!(?kind, demanded, "paying asset component");
        match kind {
            AssetKind::Chi => {
                let unpaid = game.ledger.pool_mut(payer).spend_chi(demanded);
                if unpaid > 0 {
                    return Err(CostError::Unpayable { kind });
                }
            }
            AssetKind::Resource => {
                pay_resource_component(game, queue, payer, demanded, pitch_plan)?;
            }
            AssetKind::Life => {
                if game.hero_life(payer).unwrap_or(0) < demanded {
                    return Err(CostError::Unpayable { kind });
                }
                let excluded = std::collections::HashSet::new();
                let record = fire_body(
                    game,
                    EventBody::LifeLoss {
                        player: payer,
                        amount: demanded,
                    },
                    None,
                    &excluded,
                );
                // An intercepted life payment still counts as paid.
                let record = crate::event::EventRecord::Single(record);
                queue.collect(game, &record);
            }
            AssetKind::Action => {
                let unpaid = game.ledger.pool_mut(payer).spend_action(demanded);
                if unpaid > 0 {
                    return Err(CostError::Unpayable { kind });
                }
            }
        }
    }

    // Effect components are generated in payer-chosen order.
    let mut order: Vec<usize> = (0..cost.effects.len()).collect();
    if cost.effects.len() > 1 {
        let chosen = dm.decide_order(
            game,
            &OrderContext {
                player: payer,
                count: cost.effects.len(),
                prompt: "Order the cost components".to_string(),
            },
        );
        if chosen.len() == order.len() && order.iter().all(|i| chosen.contains(i)) {
            order = chosen;
        }
    }
    let ctx = ExecutionContext::new(source.clone(), payer);
    for index in order {
        let effect = &cost.effects[index];
        let record = execute_effect(game, queue, dm, &ctx, effect)
            .map_err(|e| CostError::ComponentFailed(format!("{e:?}")))?;
        match record {
            None => {
                return Err(CostError::ComponentFailed(
                    "component could not be generated".to_string(),
                ));
            }
            Some(record) => {
                let paid = record.occurred()
                    || record.singles().iter().any(|s| s.intercepted);
                if !paid {
                    return Err(CostError::ComponentFailed(
                        "component could not resolve".to_string(),
                    ));
                }
            }
        }
    }

    Ok(())
}

/// Pay the resource component: chi substitutes first, then resource
/// points, then pitching from the declared plan, stopping as soon as the
/// component is covered. Pitching beyond the component's needs is not
/// permitted; surplus yield from the final pitch stays in the pool.
fn pay_resource_component(
    game: &mut GameState,
    queue: &mut TriggerQueue,
    payer: PlayerId,
    demanded: u32,
    pitch_plan: &[ObjectId],
) -> Result<(), CostError> {
    let mut remaining = game.ledger.pool_mut(payer).spend_resource(demanded);

    let mut plan = pitch_plan.iter();
    while remaining > 0 {
        let Some(&card) = plan.next() else {
            return Err(CostError::Unpayable {
                kind: AssetKind::Resource,
            });
        };
        let in_hand = game
            .player(payer)
            .map(|p| p.hand.contains(&card))
            .unwrap_or(false);
        let yield_value = game.object(card).and_then(|o| o.pitch());
        let (Some(yield_value), true) = (yield_value, in_hand) else {
            return Err(CostError::Unpayable {
                kind: AssetKind::Resource,
            });
        };

        let excluded = std::collections::HashSet::new();
        let record = fire_body(
            game,
            EventBody::PitchCard {
                player: payer,
                object: card,
            },
            None,
            &excluded,
        );
        let occurred = record.occurred;
        let record = crate::event::EventRecord::Single(record);
        queue.collect(game, &record);
        if !occurred {
            continue;
        }

        game.ledger
            .credit(payer, AssetKind::Resource, yield_value);
        remaining = game.ledger.pool_mut(payer).spend_resource(remaining);
    }

    Ok(())
}
