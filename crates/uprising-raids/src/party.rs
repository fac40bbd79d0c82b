//! Raid-party board: the lifecycle state machine for party membership.
//!
//! The [`PartyBoard`] owns every live party plus a user-to-party index so
//! "is this user already in a party" is a single lookup. All mutations go
//! through the board, which maintains three invariants:
//!
//! - the leader is a member for as long as the party exists
//! - the ready set is always a subset of the member list
//! - membership never exceeds the formation's cap
//!
//! Energy and class checks take the caller's [`Rebel`] record by reference;
//! the board never reaches into the rebel registry itself.

use std::collections::BTreeMap;

use tracing::{debug, info};
use uprising_types::{CorporationId, Formation, PartyId, PartyState, RaidParty, Rebel, UserId};

use crate::error::RaidError;

/// Minimum energy a rebel needs to found a party.
pub const MIN_LEADER_ENERGY: u32 = 30;

/// Minimum energy a rebel needs to join a party.
pub const MIN_JOIN_ENERGY: u32 = 25;

/// What happened when a user left their party.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// An ordinary member left; the party continues.
    Left {
        /// The party that was left.
        party: PartyId,
    },
    /// The leader left and leadership moved to the first remaining member.
    LeadershipTransferred {
        /// The party that was left.
        party: PartyId,
        /// The member who inherited leadership.
        new_leader: UserId,
    },
    /// The last member left and the party was deleted.
    Disbanded {
        /// The party that was removed.
        party: PartyId,
    },
}

/// All live raid parties plus the membership index.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct PartyBoard {
    parties: BTreeMap<PartyId, RaidParty>,
    membership: BTreeMap<UserId, PartyId>,
}

impl PartyBoard {
    /// Create an empty board.
    pub const fn new() -> Self {
        Self {
            parties: BTreeMap::new(),
            membership: BTreeMap::new(),
        }
    }

    /// Get an immutable reference to a party.
    pub fn get(&self, id: PartyId) -> Option<&RaidParty> {
        self.parties.get(&id)
    }

    /// Get a mutable reference to a party.
    pub fn get_mut(&mut self, id: PartyId) -> Option<&mut RaidParty> {
        self.parties.get_mut(&id)
    }

    /// Look up a party, erroring when absent.
    ///
    /// # Errors
    ///
    /// Returns [`RaidError::NotFound`] if the id is unknown.
    pub fn require(&self, id: PartyId) -> Result<&RaidParty, RaidError> {
        self.parties.get(&id).ok_or(RaidError::NotFound)
    }

    /// Look up a party mutably, erroring when absent.
    ///
    /// # Errors
    ///
    /// Returns [`RaidError::NotFound`] if the id is unknown.
    pub fn require_mut(&mut self, id: PartyId) -> Result<&mut RaidParty, RaidError> {
        self.parties.get_mut(&id).ok_or(RaidError::NotFound)
    }

    /// The party a user currently belongs to, if any.
    pub fn party_of(&self, user: &UserId) -> Option<PartyId> {
        self.membership.get(user).copied()
    }

    /// Number of live parties.
    pub fn len(&self) -> usize {
        self.parties.len()
    }

    /// Whether there are no live parties.
    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }

    /// Found a new party with `leader` as the sole member.
    ///
    /// # Errors
    ///
    /// - [`RaidError::AlreadyInParty`] if the leader is in a party
    /// - [`RaidError::InsufficientEnergy`] below [`MIN_LEADER_ENERGY`]
    pub fn create(
        &mut self,
        leader: &Rebel,
        target: CorporationId,
        formation: &Formation,
    ) -> Result<PartyId, RaidError> {
        if self.membership.contains_key(&leader.user_id) {
            return Err(RaidError::AlreadyInParty {
                user: leader.user_id.clone(),
            });
        }
        if leader.energy < MIN_LEADER_ENERGY {
            return Err(RaidError::InsufficientEnergy {
                required: MIN_LEADER_ENERGY,
                available: leader.energy,
            });
        }

        let party = RaidParty::new(leader.user_id.clone(), target, formation.id.clone());
        let id = party.id;
        self.membership.insert(leader.user_id.clone(), id);
        info!(
            party = %id,
            leader = %leader.user_id,
            target = %party.target,
            formation = %party.formation,
            "Raid party formed"
        );
        self.parties.insert(id, party);
        Ok(id)
    }

    /// Add a user to a recruiting party.
    ///
    /// # Errors
    ///
    /// - [`RaidError::NotFound`] if the party does not exist
    /// - [`RaidError::AlreadyInParty`] if the user is in a party
    /// - [`RaidError::PartyFull`] at the formation's cap
    /// - [`RaidError::NotRecruiting`] unless the party is Forming
    /// - [`RaidError::InsufficientEnergy`] below [`MIN_JOIN_ENERGY`]
    /// - [`RaidError::ClassNotEligible`] when the allow-list excludes them
    pub fn join(
        &mut self,
        party_id: PartyId,
        rebel: &Rebel,
        formation: &Formation,
    ) -> Result<(), RaidError> {
        if !self.parties.contains_key(&party_id) {
            return Err(RaidError::NotFound);
        }
        if self.membership.contains_key(&rebel.user_id) {
            return Err(RaidError::AlreadyInParty {
                user: rebel.user_id.clone(),
            });
        }
        let party = self.parties.get_mut(&party_id).ok_or(RaidError::NotFound)?;
        if member_count(party) >= formation.max_members {
            return Err(RaidError::PartyFull {
                max: formation.max_members,
            });
        }
        if party.state != PartyState::Forming {
            return Err(RaidError::NotRecruiting);
        }
        if rebel.energy < MIN_JOIN_ENERGY {
            return Err(RaidError::InsufficientEnergy {
                required: MIN_JOIN_ENERGY,
                available: rebel.energy,
            });
        }
        if !formation.admits(rebel.class) {
            return Err(RaidError::ClassNotEligible { class: rebel.class });
        }

        party.members.push(rebel.user_id.clone());
        self.membership.insert(rebel.user_id.clone(), party_id);
        debug!(party = %party_id, user = %rebel.user_id, "Member joined raid party");
        Ok(())
    }

    /// Remove a user from their party.
    ///
    /// Removal from the member list and the ready set happens together.
    /// A departing leader hands leadership to the first remaining member
    /// (join order -- deterministic, not merit-based). The last member's
    /// departure deletes the party.
    ///
    /// # Errors
    ///
    /// Returns [`RaidError::NotFound`] if the user is in no party.
    pub fn leave(&mut self, user: &UserId) -> Result<LeaveOutcome, RaidError> {
        let party_id = self.membership.remove(user).ok_or(RaidError::NotFound)?;
        let party = self.parties.get_mut(&party_id).ok_or(RaidError::NotFound)?;

        party.members.retain(|m| m != user);
        party.ready_members.remove(user);

        if party.members.is_empty() {
            self.parties.remove(&party_id);
            info!(party = %party_id, user = %user, "Last member left; party disbanded");
            return Ok(LeaveOutcome::Disbanded { party: party_id });
        }

        if party.is_leader(user) {
            let new_leader = party
                .members
                .first()
                .cloned()
                .ok_or_else(|| RaidError::DataIntegrity {
                    context: String::from("non-empty party has no first member"),
                })?;
            party.leader = new_leader.clone();
            info!(
                party = %party_id,
                departed = %user,
                new_leader = %new_leader,
                "Leadership transferred"
            );
            return Ok(LeaveOutcome::LeadershipTransferred {
                party: party_id,
                new_leader,
            });
        }

        debug!(party = %party_id, user = %user, "Member left raid party");
        Ok(LeaveOutcome::Left { party: party_id })
    }

    /// Flip a member's ready state. Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns [`RaidError::NotFound`] if the party does not exist or the
    /// user is not a member of it.
    pub fn toggle_ready(&mut self, party_id: PartyId, user: &UserId) -> Result<bool, RaidError> {
        let party = self.parties.get_mut(&party_id).ok_or(RaidError::NotFound)?;
        if !party.contains(user) {
            return Err(RaidError::NotFound);
        }

        let now_ready = if party.ready_members.remove(user) {
            false
        } else {
            party.ready_members.insert(user.clone());
            true
        };
        debug!(party = %party_id, user = %user, ready = now_ready, "Ready toggled");
        Ok(now_ready)
    }

    /// Delete a party outright, clearing the membership index.
    ///
    /// Used by the grace-period cleanup after execution and by admin
    /// disbands. Returns the removed party, if it existed.
    pub fn remove(&mut self, party_id: PartyId) -> Option<RaidParty> {
        let party = self.parties.remove(&party_id)?;
        for member in &party.members {
            self.membership.remove(member);
        }
        Some(party)
    }
}

/// Member count as `u32` for comparison against formation bounds.
pub fn member_count(party: &RaidParty) -> u32 {
    u32::try_from(party.members.len()).unwrap_or(u32::MAX)
}
