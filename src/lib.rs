pub mod ability;
pub mod card;
pub mod combat;
pub mod cost;
pub mod counter;
pub mod decision;
pub mod effect;
pub mod engine;
pub mod error;
pub mod event;
pub mod executor;
pub mod game_actions;
pub mod game_state;
pub mod ids;
pub mod ledger;
pub mod object;
#[cfg(feature = "serialization")]
pub mod observer;
pub mod player;
pub mod precedence;
pub mod property;
pub mod replacement;
pub mod reversal;
pub mod snapshot;
pub mod stack;
pub mod target;
pub mod trigger;
pub mod turn;
pub mod types;
pub mod zone;

#[cfg(test)]
mod tests;

pub use ability::{Ability, AbilityKind, ActivatedAbility, TriggeredAbility};
pub use card::{CardBuilder, CardDefinition, hero_definition};
pub use combat::{ChainLink, CombatChain};
pub use cost::{AssetCost, Cost, CostError, can_cover_assets, pay_cost};
pub use counter::{CounterKind, CounterMap, CounterSymbol};
pub use decision::{
    AutoDecisionMaker, BooleanContext, CostContext, DecisionMaker, LegalAction, OrderContext,
    PendingDecision, SelectObjectsContext, compute_legal_actions,
};
pub use effect::{Effect, InstructionTag, ValueExpr};
pub use engine::{Engine, Submission};
pub use error::{EngineError, Result};
pub use event::{CompoundRecord, CompositeRecord, EventBody, EventKind, EventRecord, SingleRecord};
pub use executor::{ExecutionContext, ExecutionError, execute_effect, execute_effects, fire_body, resolve_value};
pub use game_actions::{GsaOutcome, run_game_state_actions};
pub use game_state::{GameConfig, GameOutcome, GameState};
pub use ids::{CardId, ObjectId, PlayerId};
pub use ledger::{AssetKind, AssetLedger, AssetPool};
pub use object::{Object, ObjectKind};
#[cfg(feature = "serialization")]
pub use observer::GameSnapshot;
pub use player::Player;
pub use precedence::{
    ActionQuery, Directive, EffectClass, GovernedAction, PrecedenceManager, RuleLevel, Verdict,
};
pub use property::{NumericValue, PropertyKind, PropertySet};
pub use replacement::{
    EventMatcher, MatchScope, ReplacementAction, ReplacementEffect, ReplacementEffectId,
    ReplacementManager,
};
pub use reversal::ReversalManager;
pub use snapshot::ObjectSnapshot;
pub use stack::{Layer, LayerKind, SourceHandle, Stack};
pub use target::{ObjectFilter, Target, TargetSpec, Who};
pub use trigger::{PendingTrigger, StateCondition, TriggerCondition, TriggerQueue};
pub use turn::{
    PassResult, PassTracker, Phase, PriorityState, TurnState, begin_action_phase, begin_next_turn,
    execute_end_phase, execute_start_phase, has_priority, pass_priority, reset_priority,
};
pub use types::{CardType, Class, Keyword, Subtype, Talent};
pub use zone::Zone;
