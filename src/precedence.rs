//! Precedence arbitration between conflicting effects.
//!
//! Three effect classes exist: restrictions ("cannot"), requirements ("must
//! if able"), and allowances ("may"), with precedence restriction >
//! requirement > allowance. A directly contradicting effect overrides a
//! game rule, and a tournament-level rule overrides both. Verdicts are
//! computed at the moment an action is attempted; later changes to
//! directives never retroactively undo already-locked choices.

use crate::ids::{ObjectId, PlayerId};
use crate::target::ObjectFilter;
use crate::zone::Zone;

/// The class of a governing directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectClass {
    Restriction,
    Requirement,
    Allowance,
}

/// Where a directive comes from. Higher levels dominate lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RuleLevel {
    GameRule = 0,
    Effect = 1,
    TournamentRule = 2,
}

/// The kind of player action a directive governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GovernedAction {
    PlayCard,
    ActivateAbility,
    DeclareDefender,
    Pitch,
}

/// How long a directive stays active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duration {
    Permanent,
    EndOfTurn,
    /// Active while the source object exists.
    WhileSourceExists,
}

/// One governing directive.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    /// Assigned on registration; zero until then.
    pub id: u64,
    pub class: EffectClass,
    pub level: RuleLevel,
    pub action: GovernedAction,
    /// Player the directive governs; `None` governs everyone.
    pub player: Option<PlayerId>,
    /// Zone the governed action operates from, if constrained.
    pub from_zone: Option<Zone>,
    /// Object filter the acted-on card must match, if constrained.
    pub object: Option<ObjectFilter>,
    /// For defender declarations: the attack this governs and the number of
    /// defending cards beyond which the directive matches.
    pub defender_limit: Option<(ObjectId, u32)>,
    pub source: Option<ObjectId>,
    pub duration: Duration,
}

impl Directive {
    fn new(class: EffectClass, level: RuleLevel, action: GovernedAction) -> Self {
        Self {
            id: 0,
            class,
            level,
            action,
            player: None,
            from_zone: None,
            object: None,
            defender_limit: None,
            source: None,
            duration: Duration::Permanent,
        }
    }

    pub fn restriction(action: GovernedAction) -> Self {
        Self::new(EffectClass::Restriction, RuleLevel::Effect, action)
    }

    pub fn requirement(action: GovernedAction) -> Self {
        Self::new(EffectClass::Requirement, RuleLevel::Effect, action)
    }

    pub fn allowance(action: GovernedAction) -> Self {
        Self::new(EffectClass::Allowance, RuleLevel::Effect, action)
    }

    pub fn game_rule(mut self) -> Self {
        self.level = RuleLevel::GameRule;
        self
    }

    pub fn tournament(mut self) -> Self {
        self.level = RuleLevel::TournamentRule;
        self
    }

    pub fn for_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    pub fn from_zone(mut self, zone: Zone) -> Self {
        self.from_zone = Some(zone);
        self
    }

    pub fn matching(mut self, filter: ObjectFilter) -> Self {
        self.object = Some(filter);
        self
    }

    pub fn defender_limit(mut self, attack: ObjectId, limit: u32) -> Self {
        self.defender_limit = Some((attack, limit));
        self
    }

    pub fn from_source(mut self, source: ObjectId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn until_end_of_turn(mut self) -> Self {
        self.duration = Duration::EndOfTurn;
        self
    }

    pub fn while_source_exists(mut self) -> Self {
        self.duration = Duration::WhileSourceExists;
        self
    }

    /// Model an "only" restriction: playing is allowed *only* from `zone`,
    /// expressed as a restriction on every unnamed alternative.
    pub fn only_play_from(zone: Zone, player: PlayerId) -> Vec<Directive> {
        const PLAYABLE_ZONES: [Zone; 4] = [Zone::Hand, Zone::Arsenal, Zone::Graveyard, Zone::Banished];
        PLAYABLE_ZONES
            .iter()
            .filter(|z| **z != zone)
            .map(|z| {
                Directive::restriction(GovernedAction::PlayCard)
                    .for_player(player)
                    .from_zone(*z)
            })
            .collect()
    }
}

/// The action being judged, described as plain data.
#[derive(Debug, Clone)]
pub struct ActionQuery {
    pub action: GovernedAction,
    pub player: PlayerId,
    pub from_zone: Option<Zone>,
    /// Name and attack context for filter matching.
    pub object_name: Option<String>,
    /// For defender declarations: the attack being defended and how many
    /// defending cards are already declared on its chain link.
    pub defending: Option<(ObjectId, u32)>,
}

impl ActionQuery {
    pub fn play(player: PlayerId, from_zone: Zone) -> Self {
        Self {
            action: GovernedAction::PlayCard,
            player,
            from_zone: Some(from_zone),
            object_name: None,
            defending: None,
        }
    }

    pub fn activate(player: PlayerId) -> Self {
        Self {
            action: GovernedAction::ActivateAbility,
            player,
            from_zone: None,
            object_name: None,
            defending: None,
        }
    }

    pub fn defend(player: PlayerId, attack: ObjectId, already_declared: u32) -> Self {
        Self {
            action: GovernedAction::DeclareDefender,
            player,
            from_zone: None,
            object_name: None,
            defending: Some((attack, already_declared)),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.object_name = Some(name.to_string());
        self
    }
}

/// The outcome of judging an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Permitted,
    Forbidden,
    Required,
}

/// Registry of active directives.
#[derive(Debug, Clone, Default)]
pub struct PrecedenceManager {
    directives: Vec<Directive>,
    next_id: u64,
}

impl PrecedenceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, mut directive: Directive) -> u64 {
        self.next_id += 1;
        directive.id = self.next_id;
        let id = directive.id;
        self.directives.push(directive);
        id
    }

    pub fn unregister(&mut self, id: u64) {
        self.directives.retain(|d| d.id != id);
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Drop end-of-turn directives (called at phase end).
    pub fn expire_end_of_turn(&mut self) {
        self.directives
            .retain(|d| d.duration != Duration::EndOfTurn);
    }

    /// Drop directives whose source object has ceased to exist.
    pub fn expire_from_source(&mut self, source: ObjectId) {
        self.directives.retain(|d| {
            !(d.duration == Duration::WhileSourceExists && d.source == Some(source))
        });
    }

    fn matches(directive: &Directive, query: &ActionQuery) -> bool {
        if directive.action != query.action {
            return false;
        }
        if let Some(player) = directive.player
            && player != query.player
        {
            return false;
        }
        if let Some(zone) = directive.from_zone
            && query.from_zone != Some(zone)
        {
            return false;
        }
        if let Some(filter) = &directive.object
            && let Some(name) = &filter.name
            && query.object_name.as_deref() != Some(name.as_str())
        {
            return false;
        }
        if let Some((attack, limit)) = directive.defender_limit {
            match query.defending {
                Some((declared_attack, already)) => {
                    if declared_attack != attack || already < limit {
                        return false;
                    }
                }
                None => return false,
            }
        }
        true
    }

    /// Judge an action at this moment. Later directive changes never
    /// retroactively undo choices locked under an earlier verdict.
    pub fn judge(&self, query: &ActionQuery) -> Verdict {
        let matching: Vec<&Directive> = self
            .directives
            .iter()
            .filter(|d| Self::matches(d, query))
            .collect();

        let Some(top_level) = matching.iter().map(|d| d.level).max() else {
            return Verdict::Permitted;
        };

        // Only the dominating level is consulted: a contradicting effect
        // overrides a game rule, a tournament rule overrides both.
        let at_level: Vec<&&Directive> =
            matching.iter().filter(|d| d.level == top_level).collect();

        if at_level.iter().any(|d| d.class == EffectClass::Restriction) {
            Verdict::Forbidden
        } else if at_level.iter().any(|d| d.class == EffectClass::Requirement) {
            Verdict::Required
        } else {
            Verdict::Permitted
        }
    }
}
