//! Core entity structs for the Uprising raid-coordination core.
//!
//! Covers corporations and their countermeasure state, rebels, formation
//! presets, raid parties with battle plans, execution outcomes, and loot
//! stashes.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{CountermeasureKind, PartyState, RaidRole, RaidStrategy, RebelClass};
use crate::ids::{CorporationId, CountermeasureId, FormationId, PartyId, UserId};

// ---------------------------------------------------------------------------
// Corporation
// ---------------------------------------------------------------------------

/// A corporate target in the game world.
///
/// Created from seed data at process start. Health only decreases (raids)
/// and is clamped to `[0, max_health]`; there is no automatic regeneration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corporation {
    /// Catalog key.
    pub id: CorporationId,
    /// Display name.
    pub name: String,
    /// Current health, bounded to `[0, max_health]`.
    pub health: u64,
    /// Health ceiling.
    pub max_health: u64,
    /// Weakness tag copied into battle plans targeting this corporation.
    pub weakness: String,
    /// Item names that raids against this corporation can drop.
    pub loot: Vec<String>,
    /// Escalation level, 0 (dormant) to 5 (full lockdown). Incremented by
    /// an external collaborator; stored here for queries.
    pub alert_level: u8,
    /// Active countermeasure state.
    pub countermeasures: CountermeasureState,
    /// What the corporation knows about the resistance.
    pub intelligence: CorporateIntel,
}

impl Corporation {
    /// Create a corporation at full health with no intel and no active
    /// countermeasures.
    pub fn new(
        id: CorporationId,
        name: impl Into<String>,
        max_health: u64,
        weakness: impl Into<String>,
        loot: Vec<String>,
        defense_matrix: u8,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            health: max_health,
            max_health,
            weakness: weakness.into(),
            loot,
            alert_level: 0,
            countermeasures: CountermeasureState {
                active: Vec::new(),
                defense_matrix,
            },
            intelligence: CorporateIntel::default(),
        }
    }
}

/// Countermeasure bookkeeping attached to one corporation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountermeasureState {
    /// Deployed countermeasure instances. Expired entries are pruned by
    /// the tracker's sweep, not merely filtered on read.
    pub active: Vec<Countermeasure>,
    /// Passive defense rating as a percentage (0--100).
    pub defense_matrix: u8,
}

/// Intelligence a corporation has gathered on individual rebels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporateIntel {
    /// Rebels the corporation has identified.
    pub known_rebels: BTreeSet<UserId>,
    /// Cumulative damage attributed to each rebel. Feeds the threat tier
    /// label; never decays.
    pub threat_assessment: BTreeMap<UserId, u64>,
}

/// One deployed countermeasure instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countermeasure {
    /// Instance identifier.
    pub id: CountermeasureId,
    /// What kind of countermeasure this is.
    pub kind: CountermeasureKind,
    /// Intensity, 1 (nuisance) to 5 (crippling).
    pub severity: u8,
    /// Targeted rebel, or `None` for a corp-wide measure.
    pub target: Option<UserId>,
    /// Deployment time.
    pub started_at: DateTime<Utc>,
    /// Expiry time; the instance has no effect from this moment on.
    pub ends_at: DateTime<Utc>,
    /// Set when a defensive action neutralizes the instance early.
    pub blocked: bool,
}

impl Countermeasure {
    /// Whether the instance is in effect at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.blocked && now < self.ends_at
    }
}

// ---------------------------------------------------------------------------
// Rebel
// ---------------------------------------------------------------------------

/// A player character record.
///
/// Created on first interaction and mutated by nearly every operation.
/// Long-idle rebels are evicted by the registry's inactivity prune.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rebel {
    /// External identity from the chat platform.
    pub user_id: UserId,
    /// Display name.
    pub username: String,
    /// Specialization, fixed at creation.
    pub class: RebelClass,
    /// Character level.
    pub level: u32,
    /// Accumulated experience.
    pub experience: u64,
    /// Current energy, bounded to `[0, max_energy]`.
    pub energy: u32,
    /// Energy ceiling.
    pub max_energy: u32,
    /// Cumulative loyalty; boosts damage multiplicatively (1 + score/1000).
    pub loyalty_score: u32,
    /// Lifetime damage dealt to corporations.
    pub corporate_damage: u64,
    /// Zone the rebel currently occupies.
    pub current_zone: String,
    /// Last interaction time; drives inactivity eviction.
    pub last_active: DateTime<Utc>,
}

impl Rebel {
    /// Default energy ceiling for a fresh rebel.
    pub const DEFAULT_MAX_ENERGY: u32 = 100;

    /// Create a level-1 rebel at full energy in the starting zone.
    pub fn new(user_id: UserId, username: impl Into<String>, class: RebelClass) -> Self {
        Self {
            user_id,
            username: username.into(),
            class,
            level: 1,
            experience: 0,
            energy: Self::DEFAULT_MAX_ENERGY,
            max_energy: Self::DEFAULT_MAX_ENERGY,
            loyalty_score: 0,
            corporate_damage: 0,
            current_zone: String::from("the-underline"),
            last_active: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Formation
// ---------------------------------------------------------------------------

/// A named team-composition preset.
///
/// Immutable at runtime; all multipliers are [`Decimal`] so bonus math
/// stays exact until the final floor to integer damage or credits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formation {
    /// Catalog key.
    pub id: FormationId,
    /// Display name.
    pub name: String,
    /// Flavor description for the presentation layer.
    pub description: String,
    /// Multiplier applied to each member's base damage.
    pub damage_bonus: Decimal,
    /// Multiplier applied to the base raid energy cost.
    pub energy_cost: Decimal,
    /// Multiplier applied to team credit loot.
    pub loot_bonus: Decimal,
    /// Multiplier reserved for incoming-damage mitigation.
    pub protection_bonus: Decimal,
    /// Fraction of retaliation avoided; exposure chance is `1 - stealth`.
    pub stealth_bonus: Decimal,
    /// Minimum members required before a battle plan can be drawn up.
    pub min_members: u32,
    /// Hard cap on party size.
    pub max_members: u32,
    /// Optional class allow-list; `None` admits every class.
    pub class_requirements: Option<BTreeSet<RebelClass>>,
}

impl Formation {
    /// Whether the formation admits a rebel of the given class.
    pub fn admits(&self, class: RebelClass) -> bool {
        self.class_requirements
            .as_ref()
            .is_none_or(|allowed| allowed.contains(&class))
    }
}

// ---------------------------------------------------------------------------
// Battle plan
// ---------------------------------------------------------------------------

/// Computed team-wide multipliers attached to a battle plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamBonuses {
    /// Effective damage multiplier (formation bonus, plus synergy).
    pub damage: Decimal,
    /// Energy cost multiplier.
    pub energy: Decimal,
    /// Credit loot multiplier.
    pub loot: Decimal,
    /// Retaliation-avoidance fraction.
    pub stealth: Decimal,
    /// Incoming-damage mitigation multiplier.
    pub protection: Decimal,
    /// Whether the +10% class-diversity synergy applied.
    pub synergy: bool,
}

/// A leader-authored strategy object attached to one raid party.
///
/// Owned exclusively by its party; replaced wholesale when the leader
/// draws up a new plan, destroyed with the party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattlePlan {
    /// Countdown length the leader intends to use, in seconds.
    pub countdown_seconds: u32,
    /// Strategy tag.
    pub strategy: RaidStrategy,
    /// Weakness tag copied from the target corporation at plan creation.
    pub target_weakness: String,
    /// Role assignment per member, derived from class.
    pub member_roles: BTreeMap<UserId, RaidRole>,
    /// Computed team bonuses.
    pub bonuses: TeamBonuses,
}

// ---------------------------------------------------------------------------
// Raid party
// ---------------------------------------------------------------------------

/// A team of rebels jointly attacking one corporate target.
///
/// Invariants maintained by the party board: the leader is always a
/// member while the party exists, the ready set is a subset of members,
/// and membership never exceeds the formation's cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidParty {
    /// Generated identifier.
    pub id: PartyId,
    /// Current leader; transfers on departure, list-order policy.
    pub leader: UserId,
    /// Target corporation.
    pub target: CorporationId,
    /// Formation preset the party was created with.
    pub formation: FormationId,
    /// Members in join order. The leader is always present.
    pub members: Vec<UserId>,
    /// Lifecycle state.
    pub state: PartyState,
    /// Members who have marked themselves ready.
    pub ready_members: BTreeSet<UserId>,
    /// Attached strategy, if the leader has drawn one up.
    pub battle_plan: Option<BattlePlan>,
    /// Scheduled execution time while the countdown runs.
    pub execute_at: Option<DateTime<Utc>>,
    /// Populated once the raid has executed.
    pub results: Option<RaidOutcome>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl RaidParty {
    /// Create a fresh party in the Forming state with the leader as the
    /// sole member.
    pub fn new(leader: UserId, target: CorporationId, formation: FormationId) -> Self {
        Self {
            id: PartyId::new(),
            leader: leader.clone(),
            target,
            formation,
            members: vec![leader],
            state: PartyState::Forming,
            ready_members: BTreeSet::new(),
            battle_plan: None,
            execute_at: None,
            results: None,
            created_at: Utc::now(),
        }
    }

    /// Whether the given user is a member of this party.
    pub fn contains(&self, user: &UserId) -> bool {
        self.members.iter().any(|m| m == user)
    }

    /// Whether the given user is the current leader.
    pub fn is_leader(&self, user: &UserId) -> bool {
        &self.leader == user
    }
}

// ---------------------------------------------------------------------------
// Raid outcome & loot
// ---------------------------------------------------------------------------

/// One item dropped by a raid, already assigned to a recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootItem {
    /// Item name drawn from the corporation's loot table.
    pub name: String,
    /// Market value in credits.
    pub value: u64,
    /// Member the item was assigned to (round-robin by join order).
    pub recipient: UserId,
}

/// The recorded result of an executed raid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidOutcome {
    /// Sum of every member's final damage.
    pub total_damage: u64,
    /// Final damage per member, in join order.
    pub member_damage: BTreeMap<UserId, u64>,
    /// Team credit pool before the per-member split.
    pub team_credits: u64,
    /// Floor share each member received. The remainder of the floor
    /// division is intentionally undistributed.
    pub credits_per_member: u64,
    /// Items dropped and their recipients.
    pub items: Vec<LootItem>,
    /// Members exposed to corporate retaliation.
    pub retaliated: BTreeSet<UserId>,
    /// Whether the raid brought the corporation to zero health.
    pub corporation_destroyed: bool,
    /// When the raid fired.
    pub executed_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Stash
// ---------------------------------------------------------------------------

/// An item resting in a rebel's stash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashItem {
    /// Item name.
    pub name: String,
    /// Market value in credits.
    pub value: u64,
}

/// A rebel's loot stash: items plus a credit balance, with a capacity
/// limit on the item list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stash {
    /// Held items, oldest first.
    pub items: Vec<StashItem>,
    /// Credit balance.
    pub credits: u64,
    /// Maximum number of items the stash can hold.
    pub capacity: usize,
}

impl Stash {
    /// Default stash capacity for a fresh rebel.
    pub const DEFAULT_CAPACITY: usize = 50;

    /// Create an empty stash with the given capacity.
    pub const fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            credits: 0,
            capacity,
        }
    }
}

impl Default for Stash {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
