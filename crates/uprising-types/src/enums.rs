//! Enumeration types for the Uprising raid-coordination core.
//!
//! Covers rebel classes, raid roles, the party lifecycle state machine,
//! battle-plan strategy tags, countermeasure kinds, and threat tiers.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rebel classes
// ---------------------------------------------------------------------------

/// A rebel's specialization, fixed at character creation.
///
/// The class determines the role assigned inside a battle plan and
/// whether a formation's class allow-list admits the rebel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RebelClass {
    /// Breaches corporate network perimeters.
    ProtocolHacker,
    /// Extracts and redistributes hoarded data.
    DataLiberator,
    /// Shields the cell from countermeasures.
    EnclaveGuardian,
    /// Retrains captured corporate models for the cause.
    ModelTrainer,
    /// Recruits and rallies the resistance.
    CommunityOrganizer,
    /// Unspecialized street-level operative.
    Freerunner,
}

// ---------------------------------------------------------------------------
// Raid roles
// ---------------------------------------------------------------------------

/// The role a member plays inside a battle plan.
///
/// Roles are a pure function of class; they carry no mechanical weight of
/// their own but are surfaced to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RaidRole {
    /// Leads the damage output.
    PrimaryStriker,
    /// Maximizes loot extraction.
    LootSpecialist,
    /// Absorbs and deflects retaliation.
    TeamProtector,
    /// Times and sequences the strike.
    Coordinator,
    /// Keeps the team operational.
    Support,
    /// General-purpose muscle.
    Assault,
}

impl RaidRole {
    /// Derive the battle-plan role for a rebel class.
    pub const fn for_class(class: RebelClass) -> Self {
        match class {
            RebelClass::ProtocolHacker => Self::PrimaryStriker,
            RebelClass::DataLiberator => Self::LootSpecialist,
            RebelClass::EnclaveGuardian => Self::TeamProtector,
            RebelClass::ModelTrainer => Self::Coordinator,
            RebelClass::CommunityOrganizer => Self::Support,
            RebelClass::Freerunner => Self::Assault,
        }
    }
}

// ---------------------------------------------------------------------------
// Party lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle state of a raid party.
///
/// Transitions are one-directional (Forming -> Planning -> Executing ->
/// Completed) with a single exception: Executing reverts to Planning when
/// the leader aborts the countdown. A party may be deleted outright when
/// its last member leaves, regardless of state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PartyState {
    /// Recruiting members; joins are only allowed here.
    Forming,
    /// A battle plan exists; members are readying up.
    Planning,
    /// Countdown running; target and formation are frozen.
    Executing,
    /// Terminal; results are populated.
    Completed,
}

// ---------------------------------------------------------------------------
// Battle-plan strategy
// ---------------------------------------------------------------------------

/// Leader-chosen strategy tag attached to a battle plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RaidStrategy {
    /// Hit fast before defenses react.
    Blitz,
    /// Sustained pressure on hardened targets.
    Siege,
    /// Minimal footprint, minimal retaliation surface.
    Ghost,
    /// No particular emphasis.
    Balanced,
}

// ---------------------------------------------------------------------------
// Countermeasures
// ---------------------------------------------------------------------------

/// A kind of corporate countermeasure deployed against rebels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CountermeasureKind {
    /// Network trace attempting to deanonymize a rebel.
    TraceScan,
    /// Freezes a rebel's credit flow.
    AssetFreeze,
    /// Jams coordination channels corp-wide.
    SignalJam,
    /// Physical drone patrol of rebel zones.
    DroneSweep,
    /// Blacklists a rebel from corporate services.
    Blacklist,
}

// ---------------------------------------------------------------------------
// Threat tiers
// ---------------------------------------------------------------------------

/// Five-tier descriptive label derived from a rebel's cumulative damage
/// against one corporation.
///
/// Purely descriptive: no mechanical effect and no automatic decay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ThreatTier {
    /// Below 500 damage.
    Minimal,
    /// 500 to 1,999 damage.
    Low,
    /// 2,000 to 4,999 damage.
    Moderate,
    /// 5,000 to 9,999 damage.
    High,
    /// 10,000 damage and above.
    Extreme,
}

impl ThreatTier {
    /// Classify a cumulative damage scalar into a threat tier.
    pub const fn for_damage(damage: u64) -> Self {
        if damage >= 10_000 {
            Self::Extreme
        } else if damage >= 5_000 {
            Self::High
        } else if damage >= 2_000 {
            Self::Moderate
        } else if damage >= 500 {
            Self::Low
        } else {
            Self::Minimal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_follow_classes() {
        assert_eq!(
            RaidRole::for_class(RebelClass::ProtocolHacker),
            RaidRole::PrimaryStriker
        );
        assert_eq!(
            RaidRole::for_class(RebelClass::DataLiberator),
            RaidRole::LootSpecialist
        );
        assert_eq!(
            RaidRole::for_class(RebelClass::EnclaveGuardian),
            RaidRole::TeamProtector
        );
        assert_eq!(
            RaidRole::for_class(RebelClass::ModelTrainer),
            RaidRole::Coordinator
        );
        assert_eq!(
            RaidRole::for_class(RebelClass::CommunityOrganizer),
            RaidRole::Support
        );
        assert_eq!(RaidRole::for_class(RebelClass::Freerunner), RaidRole::Assault);
    }

    #[test]
    fn threat_tier_thresholds() {
        assert_eq!(ThreatTier::for_damage(0), ThreatTier::Minimal);
        assert_eq!(ThreatTier::for_damage(499), ThreatTier::Minimal);
        assert_eq!(ThreatTier::for_damage(500), ThreatTier::Low);
        assert_eq!(ThreatTier::for_damage(1_999), ThreatTier::Low);
        assert_eq!(ThreatTier::for_damage(2_000), ThreatTier::Moderate);
        assert_eq!(ThreatTier::for_damage(4_999), ThreatTier::Moderate);
        assert_eq!(ThreatTier::for_damage(5_000), ThreatTier::High);
        assert_eq!(ThreatTier::for_damage(9_999), ThreatTier::High);
        assert_eq!(ThreatTier::for_damage(10_000), ThreatTier::Extreme);
    }
}
