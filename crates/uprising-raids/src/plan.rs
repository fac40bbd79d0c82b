//! Battle plans: role assignment, team bonuses, and the countdown
//! transitions of the party state machine.
//!
//! A battle plan is leader-authored and owned exclusively by its party.
//! Drawing up a new plan replaces the old one wholesale; disbanding the
//! party destroys it. The countdown transitions (`begin_countdown`,
//! `abort`) mutate only the party record -- actual timer scheduling is
//! the service layer's job.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uprising_types::{
    BattlePlan, Corporation, Formation, PartyState, RaidParty, RaidRole, RaidStrategy, RebelClass,
    TeamBonuses, UserId,
};

use crate::error::RaidError;
use crate::party::member_count;

/// Distinct classes required for the synergy bonus.
pub const SYNERGY_CLASS_THRESHOLD: usize = 3;

/// Compute team bonuses from the formation's multipliers.
///
/// The damage multiplier gains +10% when the party fields at least
/// [`SYNERGY_CLASS_THRESHOLD`] distinct classes; every other multiplier
/// is carried through unchanged.
///
/// # Errors
///
/// Returns [`RaidError::ArithmeticOverflow`] if the synergized damage
/// multiplier does not fit a [`Decimal`].
pub fn compute_bonuses(
    formation: &Formation,
    distinct_classes: usize,
) -> Result<TeamBonuses, RaidError> {
    let synergy = distinct_classes >= SYNERGY_CLASS_THRESHOLD;
    let damage = if synergy {
        // 1.10 exactly
        formation
            .damage_bonus
            .checked_mul(Decimal::new(110, 2))
            .ok_or_else(|| RaidError::ArithmeticOverflow {
                context: String::from("synergy damage multiplier"),
            })?
    } else {
        formation.damage_bonus
    };

    Ok(TeamBonuses {
        damage,
        energy: formation.energy_cost,
        loot: formation.loot_bonus,
        stealth: formation.stealth_bonus,
        protection: formation.protection_bonus,
        synergy,
    })
}

/// Derive the role map for a party roster.
///
/// Roles are a pure function of class; see [`RaidRole::for_class`].
pub fn assign_roles(roster: &[(UserId, RebelClass)]) -> BTreeMap<UserId, RaidRole> {
    roster
        .iter()
        .map(|(user, class)| (user.clone(), RaidRole::for_class(*class)))
        .collect()
}

/// Attach a battle plan to the party and move it to Planning.
///
/// `roster` carries the resolved class of every current member; the
/// caller (the service layer) assembles it from the rebel registry.
///
/// # Errors
///
/// - [`RaidError::NotLeader`] unless `caller` leads the party
/// - [`RaidError::AlreadyExecuting`] while a countdown is running
/// - [`RaidError::NotRecruiting`] on a completed party
/// - [`RaidError::InsufficientMembers`] below the formation minimum
/// - [`RaidError::ArithmeticOverflow`] if the bonus math overflows
pub fn create_battle_plan(
    party: &mut RaidParty,
    formation: &Formation,
    corporation: &Corporation,
    caller: &UserId,
    countdown_seconds: u32,
    strategy: RaidStrategy,
    roster: &[(UserId, RebelClass)],
) -> Result<(), RaidError> {
    if !party.is_leader(caller) {
        return Err(RaidError::NotLeader);
    }
    match party.state {
        PartyState::Executing => return Err(RaidError::AlreadyExecuting),
        PartyState::Completed => return Err(RaidError::NotRecruiting),
        PartyState::Forming | PartyState::Planning => {}
    }
    if member_count(party) < formation.min_members {
        return Err(RaidError::InsufficientMembers {
            required: formation.min_members,
            current: member_count(party),
        });
    }

    let distinct_classes: BTreeSet<RebelClass> =
        roster.iter().map(|(_, class)| *class).collect();
    let bonuses = compute_bonuses(formation, distinct_classes.len())?;

    info!(
        party = %party.id,
        strategy = ?strategy,
        weakness = %corporation.weakness,
        synergy = bonuses.synergy,
        "Battle plan drawn up"
    );

    party.battle_plan = Some(BattlePlan {
        countdown_seconds,
        strategy,
        target_weakness: corporation.weakness.clone(),
        member_roles: assign_roles(roster),
        bonuses,
    });
    party.state = PartyState::Planning;
    Ok(())
}

/// Start the countdown: freeze the party into Executing.
///
/// Returns the computed `execute_at` instant. The service layer is
/// responsible for scheduling the actual timers against it.
///
/// # Errors
///
/// - [`RaidError::NotLeader`] unless `caller` leads the party
/// - [`RaidError::AlreadyExecuting`] if a countdown is already running
/// - [`RaidError::NoBattlePlan`] if no plan has been drawn up
/// - [`RaidError::NotAllReady`] unless every member is ready
pub fn begin_countdown(
    party: &mut RaidParty,
    caller: &UserId,
    seconds: u32,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, RaidError> {
    if !party.is_leader(caller) {
        return Err(RaidError::NotLeader);
    }
    if party.state == PartyState::Executing {
        return Err(RaidError::AlreadyExecuting);
    }
    if party.battle_plan.is_none() {
        return Err(RaidError::NoBattlePlan);
    }
    let total = member_count(party);
    let ready = u32::try_from(party.ready_members.len()).unwrap_or(u32::MAX);
    if ready < total {
        return Err(RaidError::NotAllReady { ready, total });
    }

    let execute_at = now
        .checked_add_signed(Duration::seconds(i64::from(seconds)))
        .ok_or_else(|| RaidError::ArithmeticOverflow {
            context: String::from("countdown execute_at"),
        })?;
    party.execute_at = Some(execute_at);
    party.state = PartyState::Executing;
    info!(party = %party.id, seconds, %execute_at, "Countdown started");
    Ok(execute_at)
}

/// Abort a running countdown: revert to Planning.
///
/// Clears `execute_at` and the ready set so members must ready up again.
/// The service layer cancels the pending timers alongside this call.
///
/// # Errors
///
/// - [`RaidError::NotLeader`] unless `caller` leads the party
/// - [`RaidError::NotExecuting`] unless a countdown is running
pub fn abort(party: &mut RaidParty, caller: &UserId) -> Result<(), RaidError> {
    if !party.is_leader(caller) {
        return Err(RaidError::NotLeader);
    }
    if party.state != PartyState::Executing {
        return Err(RaidError::NotExecuting);
    }

    party.state = PartyState::Planning;
    party.execute_at = None;
    party.ready_members.clear();
    info!(party = %party.id, "Countdown aborted; party back to planning");
    Ok(())
}
