//! Corporate countermeasure and threat tracking.
//!
//! Each corporation carries a list of deployed [`Countermeasure`] instances
//! and a per-rebel cumulative damage tally. Activity queries filter by the
//! expiry window; expired instances are removed by an explicit sweep rather
//! than left to accumulate behind filter-on-read queries, so the backing
//! list stays bounded. Threat tallies never decay.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use uprising_types::{
    Corporation, Countermeasure, CountermeasureId, CountermeasureKind, ThreatTier, UserId,
};

/// Deploy a countermeasure against a rebel (or corp-wide with `None`).
///
/// Returns the new instance's id.
pub fn activate(
    corporation: &mut Corporation,
    kind: CountermeasureKind,
    severity: u8,
    target: Option<UserId>,
    now: DateTime<Utc>,
    duration: Duration,
) -> CountermeasureId {
    let instance = Countermeasure {
        id: CountermeasureId::new(),
        kind,
        severity,
        target,
        started_at: now,
        ends_at: now
            .checked_add_signed(duration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
        blocked: false,
    };
    let id = instance.id;
    info!(
        corporation = %corporation.id,
        countermeasure = %id,
        kind = ?kind,
        severity,
        target = instance.target.as_ref().map(ToString::to_string),
        "Countermeasure deployed"
    );
    corporation.countermeasures.active.push(instance);
    id
}

/// All countermeasures in effect at `now` (unexpired and not blocked).
pub fn active(corporation: &Corporation, now: DateTime<Utc>) -> Vec<&Countermeasure> {
    corporation
        .countermeasures
        .active
        .iter()
        .filter(|cm| cm.is_active(now))
        .collect()
}

/// Countermeasures in effect at `now` that target a specific rebel,
/// including corp-wide instances.
pub fn active_against<'a>(
    corporation: &'a Corporation,
    user: &UserId,
    now: DateTime<Utc>,
) -> Vec<&'a Countermeasure> {
    corporation
        .countermeasures
        .active
        .iter()
        .filter(|cm| cm.is_active(now))
        .filter(|cm| cm.target.as_ref().is_none_or(|t| t == user))
        .collect()
}

/// Remove expired instances from the backing list.
///
/// Returns how many were pruned. Blocked instances are also dropped once
/// their window has passed; a blocked instance inside its window is kept
/// so the presentation layer can still show the neutralized entry.
pub fn sweep_expired(corporation: &mut Corporation, now: DateTime<Utc>) -> usize {
    let before = corporation.countermeasures.active.len();
    corporation
        .countermeasures
        .active
        .retain(|cm| now < cm.ends_at);
    let pruned = before.saturating_sub(corporation.countermeasures.active.len());
    if pruned > 0 {
        debug!(corporation = %corporation.id, pruned, "Swept expired countermeasures");
    }
    pruned
}

/// Mark an instance as neutralized by a defensive action.
///
/// Returns false if the id is not present.
pub fn block(corporation: &mut Corporation, id: CountermeasureId) -> bool {
    for cm in &mut corporation.countermeasures.active {
        if cm.id == id {
            cm.blocked = true;
            info!(corporation = %corporation.id, countermeasure = %id, "Countermeasure blocked");
            return true;
        }
    }
    false
}

/// Record raid damage against a corporation's intel on one rebel.
///
/// Adds the rebel to the known set and accumulates the damage tally.
/// Returns the new cumulative total.
pub fn record_threat(corporation: &mut Corporation, user: &UserId, damage: u64) -> u64 {
    corporation.intelligence.known_rebels.insert(user.clone());
    let entry = corporation
        .intelligence
        .threat_assessment
        .entry(user.clone())
        .or_insert(0);
    *entry = entry.saturating_add(damage);
    *entry
}

/// The threat tier a corporation assigns to a rebel.
pub fn threat_tier(corporation: &Corporation, user: &UserId) -> ThreatTier {
    let damage = corporation
        .intelligence
        .threat_assessment
        .get(user)
        .copied()
        .unwrap_or(0);
    ThreatTier::for_damage(damage)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use uprising_types::CorporationId;
    use uprising_world::seed_corporations;

    fn corp() -> Corporation {
        seed_corporations()
            .get(&CorporationId::from("nexacore"))
            .unwrap()
            .clone()
    }

    #[test]
    fn activation_and_expiry_window() {
        let mut corporation = corp();
        let now = Utc::now();
        let _ = activate(
            &mut corporation,
            CountermeasureKind::TraceScan,
            2,
            Some(UserId::from("u1")),
            now,
            Duration::seconds(60),
        );

        assert_eq!(active(&corporation, now).len(), 1);
        assert_eq!(active(&corporation, now + Duration::seconds(61)).len(), 0);
        // Expired entries are filtered but still present until swept.
        assert_eq!(corporation.countermeasures.active.len(), 1);
    }

    #[test]
    fn sweep_prunes_only_expired() {
        let mut corporation = corp();
        let now = Utc::now();
        let _ = activate(
            &mut corporation,
            CountermeasureKind::TraceScan,
            1,
            None,
            now,
            Duration::seconds(30),
        );
        let _ = activate(
            &mut corporation,
            CountermeasureKind::DroneSweep,
            3,
            None,
            now,
            Duration::seconds(600),
        );

        let pruned = sweep_expired(&mut corporation, now + Duration::seconds(31));
        assert_eq!(pruned, 1);
        assert_eq!(corporation.countermeasures.active.len(), 1);
        assert_eq!(
            corporation
                .countermeasures
                .active
                .first()
                .map(|cm| cm.kind),
            Some(CountermeasureKind::DroneSweep)
        );
    }

    #[test]
    fn blocked_instance_is_inactive_but_kept_until_expiry() {
        let mut corporation = corp();
        let now = Utc::now();
        let id = activate(
            &mut corporation,
            CountermeasureKind::AssetFreeze,
            4,
            Some(UserId::from("u1")),
            now,
            Duration::seconds(300),
        );

        assert!(block(&mut corporation, id));
        assert_eq!(active(&corporation, now).len(), 0);
        assert_eq!(sweep_expired(&mut corporation, now), 0);
        assert_eq!(corporation.countermeasures.active.len(), 1);
    }

    #[test]
    fn block_unknown_id_is_false() {
        let mut corporation = corp();
        assert!(!block(&mut corporation, CountermeasureId::new()));
    }

    #[test]
    fn targeted_query_includes_corp_wide() {
        let mut corporation = corp();
        let now = Utc::now();
        let user = UserId::from("u1");
        let other = UserId::from("u2");
        let _ = activate(
            &mut corporation,
            CountermeasureKind::SignalJam,
            2,
            None, // corp-wide
            now,
            Duration::seconds(60),
        );
        let _ = activate(
            &mut corporation,
            CountermeasureKind::TraceScan,
            2,
            Some(user.clone()),
            now,
            Duration::seconds(60),
        );
        let _ = activate(
            &mut corporation,
            CountermeasureKind::Blacklist,
            2,
            Some(other),
            now,
            Duration::seconds(60),
        );

        assert_eq!(active_against(&corporation, &user, now).len(), 2);
    }

    #[test]
    fn threat_accumulates_and_tiers() {
        let mut corporation = corp();
        let user = UserId::from("u1");
        assert_eq!(threat_tier(&corporation, &user), ThreatTier::Minimal);

        assert_eq!(record_threat(&mut corporation, &user, 400), 400);
        assert_eq!(threat_tier(&corporation, &user), ThreatTier::Minimal);

        assert_eq!(record_threat(&mut corporation, &user, 1_700), 2_100);
        assert_eq!(threat_tier(&corporation, &user), ThreatTier::Moderate);

        assert!(corporation.intelligence.known_rebels.contains(&user));
    }
}
