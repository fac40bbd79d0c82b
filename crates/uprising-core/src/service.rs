//! The raid service facade.
//!
//! [`RaidService`] is the single entry point the presentation layer talks
//! to. All game state lives in one [`GameState`] behind one
//! `tokio::sync::Mutex`: every public operation locks, mutates, and
//! releases, so two concurrent commands touching the same party can
//! never interleave mid-mutation. Countdown timers are spawned tasks
//! tracked by the [`TimerRegistry`]; abort and disband cancel them
//! outright, and the engine's state guard covers the remaining race
//! between a fire and a concurrent abort.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uprising_raids::{
    LeaveOutcome, PartyBoard, Persistence, RaidError, RaidRng, execute_raid, plan,
};
use uprising_types::{
    CorporationId, FormationId, PartyId, RaidOutcome, RaidParty, RaidStrategy, Rebel, RebelClass,
    UserId,
};
use uprising_world::{
    CorporationRegistry, FormationCatalog, RebelRegistry, StashStore, seed_corporations,
    seed_formations,
};

use crate::config::GameConfig;
use crate::error::CoreError;
use crate::scheduler::{CountdownTimers, TimerRegistry};

/// Loyalty a participant earns from one raid: a flat base plus a
/// damage-proportional bonus.
fn loyalty_award(damage: u64) -> u32 {
    let scaled = u32::try_from(damage.checked_div(100).unwrap_or(0)).unwrap_or(u32::MAX);
    scaled.saturating_add(5)
}

/// All mutable game state, guarded by the service's single lock.
#[derive(Debug)]
pub struct GameState {
    /// Corporate targets.
    pub corporations: CorporationRegistry,
    /// Formation presets.
    pub formations: FormationCatalog,
    /// Player records.
    pub rebels: RebelRegistry,
    /// Loot stashes.
    pub stashes: StashStore,
    /// Live raid parties.
    pub parties: PartyBoard,
    raid_sequence: u64,
}

impl GameState {
    /// Create game state with the seeded corporate roster and formation
    /// catalog.
    pub fn seeded() -> Self {
        Self {
            corporations: seed_corporations(),
            formations: seed_formations(),
            rebels: RebelRegistry::new(),
            stashes: StashStore::new(),
            parties: PartyBoard::new(),
            raid_sequence: 0,
        }
    }

    /// Next raid sequence number, feeding the deterministic RNG.
    fn next_sequence(&mut self) -> u64 {
        self.raid_sequence = self.raid_sequence.wrapping_add(1);
        self.raid_sequence
    }
}

/// The service facade owning game state, timers, and persistence.
#[derive(Debug)]
pub struct RaidService<P: Persistence + 'static> {
    config: GameConfig,
    state: Arc<Mutex<GameState>>,
    timers: Arc<Mutex<TimerRegistry>>,
    persistence: Arc<P>,
}

impl<P: Persistence + 'static> Clone for RaidService<P> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            state: Arc::clone(&self.state),
            timers: Arc::clone(&self.timers),
            persistence: Arc::clone(&self.persistence),
        }
    }
}

impl<P: Persistence + 'static> RaidService<P> {
    /// Create a service over freshly seeded game state.
    pub fn new(config: GameConfig, persistence: P) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(GameState::seeded())),
            timers: Arc::new(Mutex::new(TimerRegistry::new())),
            persistence: Arc::new(persistence),
        }
    }

    /// Register a new rebel.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::World`] if the user id is already taken.
    pub async fn register_rebel(
        &self,
        user: UserId,
        username: impl Into<String>,
        class: RebelClass,
    ) -> Result<(), CoreError> {
        let mut state = self.state.lock().await;
        state.rebels.register(Rebel::new(user, username, class))?;
        Ok(())
    }

    /// Found a new raid party led by `user`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::World`] for unknown targets, formations, or
    /// rebels, and [`CoreError::Raid`] for lifecycle violations.
    pub async fn create_party(
        &self,
        user: &UserId,
        target: CorporationId,
        formation_id: &FormationId,
    ) -> Result<PartyId, CoreError> {
        let state = &mut *self.state.lock().await;
        if state.corporations.get(&target).is_none() {
            return Err(uprising_world::WorldError::CorporationNotFound(target).into());
        }
        let formation = state.formations.require(formation_id)?;
        let rebel = state.rebels.require(user)?;
        let party = state.parties.create(rebel, target, formation)?;
        state.rebels.touch(user, Utc::now());
        Ok(party)
    }

    /// Join an existing party.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Raid`] for lifecycle violations and
    /// [`CoreError::World`] for unknown rebels.
    pub async fn join_party(&self, party_id: PartyId, user: &UserId) -> Result<(), CoreError> {
        let state = &mut *self.state.lock().await;
        let formation_id = state.parties.require(party_id)?.formation.clone();
        let formation = state.formations.require(&formation_id)?;
        let rebel = state.rebels.require(user)?;
        state.parties.join(party_id, rebel, formation)?;
        state.rebels.touch(user, Utc::now());
        Ok(())
    }

    /// Leave the party the user is in. Cancels pending timers when the
    /// departure disbands the party.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Raid`] if the user is in no party.
    pub async fn leave_party(&self, user: &UserId) -> Result<LeaveOutcome, CoreError> {
        let outcome = self.state.lock().await.parties.leave(user)?;
        if let LeaveOutcome::Disbanded { party } = outcome {
            let _ = self.timers.lock().await.cancel(party);
        }
        Ok(outcome)
    }

    /// Flip the caller's ready flag. Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Raid`] if the party is unknown or the user
    /// is not a member.
    pub async fn toggle_ready(&self, party_id: PartyId, user: &UserId) -> Result<bool, CoreError> {
        let ready = self.state.lock().await.parties.toggle_ready(party_id, user)?;
        Ok(ready)
    }

    /// Draw up (or replace) the party's battle plan.
    ///
    /// # Errors
    ///
    /// - [`CoreError::CountdownOutOfRange`] for an out-of-bounds length
    /// - [`CoreError::Raid`] for lifecycle violations
    /// - [`CoreError::World`] for unresolvable members
    pub async fn create_battle_plan(
        &self,
        party_id: PartyId,
        caller: &UserId,
        countdown_seconds: u32,
        strategy: RaidStrategy,
    ) -> Result<(), CoreError> {
        self.check_countdown_bounds(countdown_seconds)?;

        let state = &mut *self.state.lock().await;
        let party = state.parties.require_mut(party_id)?;
        let formation = state.formations.require(&party.formation)?;
        let corporation =
            state
                .corporations
                .get(&party.target)
                .ok_or_else(|| RaidError::DataIntegrity {
                    context: format!("party {party_id} targets missing corporation"),
                })?;

        let mut roster = Vec::with_capacity(party.members.len());
        for member in &party.members {
            let rebel = state.rebels.require(member)?;
            roster.push((member.clone(), rebel.class));
        }

        plan::create_battle_plan(
            party,
            formation,
            corporation,
            caller,
            countdown_seconds,
            strategy,
            &roster,
        )?;
        Ok(())
    }

    /// Start the countdown and schedule the execution and notification
    /// timers. Returns the instant the raid will fire.
    ///
    /// # Errors
    ///
    /// - [`CoreError::CountdownOutOfRange`] for an out-of-bounds length
    /// - [`CoreError::Raid`] for lifecycle violations (not leader, no
    ///   plan, members not ready, already executing)
    pub async fn start_countdown(
        &self,
        party_id: PartyId,
        caller: &UserId,
        seconds: u32,
    ) -> Result<DateTime<Utc>, CoreError> {
        self.check_countdown_bounds(seconds)?;

        // The state lock stays held until the timers are registered, so
        // an abort can never slip between the state transition and the
        // registry write.
        let mut state = self.state.lock().await;
        let party = state.parties.require_mut(party_id)?;
        let execute_at = plan::begin_countdown(party, caller, seconds, Utc::now())?;
        let sequence = state.next_sequence();

        let mut notifications = Vec::new();
        for offset in self.config.countdown.offsets_within(seconds) {
            let delay = Duration::from_secs(u64::from(seconds.saturating_sub(offset)));
            notifications.push(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                info!(party = %party_id, seconds_left = offset, "Raid countdown");
            }));
        }

        let service = self.clone();
        let fire_delay = Duration::from_secs(u64::from(seconds));
        let execute = tokio::spawn(async move {
            tokio::time::sleep(fire_delay).await;
            if let Err(err) = service.fire_execution(party_id, sequence).await {
                warn!(party = %party_id, error = %err, "Raid execution failed");
            }
        });

        self.timers
            .lock()
            .await
            .register(party_id, CountdownTimers::new(execute, notifications));
        drop(state);
        info!(party = %party_id, seconds, %execute_at, "Countdown scheduled");
        Ok(execute_at)
    }

    /// Abort a running countdown and cancel its timers.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Raid`] unless the caller leads the party and
    /// a countdown is running.
    pub async fn abort_countdown(&self, party_id: PartyId, caller: &UserId) -> Result<(), CoreError> {
        {
            let mut state = self.state.lock().await;
            let party = state.parties.require_mut(party_id)?;
            plan::abort(party, caller)?;
        }
        let _ = self.timers.lock().await.cancel(party_id);
        Ok(())
    }

    /// Snapshot of a party's current record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Raid`] if the party is unknown.
    pub async fn party_status(&self, party_id: PartyId) -> Result<RaidParty, CoreError> {
        let state = self.state.lock().await;
        Ok(state.parties.require(party_id)?.clone())
    }

    /// The party a user currently belongs to, if any.
    pub async fn party_of(&self, user: &UserId) -> Option<PartyId> {
        self.state.lock().await.parties.party_of(user)
    }

    /// Evict rebels idle past the configured window, persisting each
    /// record before it leaves memory.
    pub async fn prune_inactive(&self) -> Vec<UserId> {
        let idle = chrono::Duration::days(i64::from(self.config.cleanup.inactivity_days));
        let cutoff = Utc::now()
            .checked_sub_signed(idle)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let state = &mut *self.state.lock().await;
        for rebel in state.rebels.iter() {
            if rebel.last_active < cutoff
                && let Err(err) = self.persistence.persist_rebel(rebel)
            {
                warn!(user = %rebel.user_id, error = %err, "Pre-eviction persist failed");
            }
        }
        state.rebels.prune_inactive(cutoff)
    }

    /// Fire the raid for a party whose countdown reached zero.
    ///
    /// Runs the engine, writes loyalty and credits through persistence,
    /// and schedules the grace-period cleanup of the party record. The
    /// engine's state guard makes a duplicate fire a no-op error.
    async fn fire_execution(
        &self,
        party_id: PartyId,
        sequence: u64,
    ) -> Result<RaidOutcome, CoreError> {
        let outcome = {
            let state = &mut *self.state.lock().await;
            let party = state.parties.require_mut(party_id)?;
            let mut rng = RaidRng::new(self.config.world.seed, sequence);
            let now = Utc::now();
            let outcome = execute_raid(
                party,
                &mut state.corporations,
                &mut state.rebels,
                &mut state.stashes,
                now,
                &mut rng,
            )?;

            for (member, damage) in &outcome.member_damage {
                let award = loyalty_award(*damage);
                let _ = state.rebels.add_loyalty(member, award)?;
                state.rebels.touch(member, now);

                if let Err(err) = self.persistence.add_loyalty(member, award) {
                    warn!(user = %member, error = %err, "Loyalty write-through failed");
                }
                if let Err(err) = self
                    .persistence
                    .add_credits(member, outcome.credits_per_member)
                {
                    warn!(user = %member, error = %err, "Credit write-through failed");
                }
                if let Some(rebel) = state.rebels.get(member)
                    && let Err(err) = self.persistence.persist_rebel(rebel)
                {
                    warn!(user = %member, error = %err, "Rebel persist failed");
                }
            }
            outcome
        };

        // Results stay queryable through the grace window, then the
        // party record is garbage-collected. A restart during the window
        // simply loses the pending cleanup.
        let service = self.clone();
        let grace = Duration::from_secs(self.config.cleanup.grace_seconds);
        let cleanup = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            if service.state.lock().await.parties.remove(party_id).is_some() {
                debug!(party = %party_id, "Completed party cleaned up");
            }
            service.timers.lock().await.discard(party_id);
        });
        self.timers
            .lock()
            .await
            .register(party_id, CountdownTimers::single(cleanup));

        Ok(outcome)
    }

    fn check_countdown_bounds(&self, seconds: u32) -> Result<(), CoreError> {
        if self.config.countdown.permits(seconds) {
            Ok(())
        } else {
            Err(CoreError::CountdownOutOfRange {
                seconds,
                min: self.config.countdown.min_seconds,
                max: self.config.countdown.max_seconds,
            })
        }
    }
}
