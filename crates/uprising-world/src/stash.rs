//! Loot stashes: per-rebel item storage and credit balances.
//!
//! Deposits use checked arithmetic and a capacity guard on the item list.
//! Stashes are created lazily on first deposit so the raid loot path never
//! has to special-case a rebel who has not looted before.

use std::collections::BTreeMap;

use uprising_types::{Stash, StashItem, UserId};

use crate::error::WorldError;

/// All stashes, indexed by owner.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct StashStore {
    stashes: BTreeMap<UserId, Stash>,
}

impl StashStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            stashes: BTreeMap::new(),
        }
    }

    /// Get an immutable reference to a rebel's stash, if one exists.
    pub fn get(&self, user: &UserId) -> Option<&Stash> {
        self.stashes.get(user)
    }

    /// Get a mutable reference to a rebel's stash, creating a default
    /// stash on first access.
    pub fn stash_mut(&mut self, user: &UserId) -> &mut Stash {
        self.stashes.entry(user.clone()).or_default()
    }

    /// Credit a rebel's balance.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ArithmeticOverflow`] if the balance would
    /// exceed the `u64` ceiling.
    pub fn deposit_credits(&mut self, user: &UserId, amount: u64) -> Result<u64, WorldError> {
        let stash = self.stash_mut(user);
        stash.credits = stash.credits.checked_add(amount).ok_or_else(|| {
            WorldError::ArithmeticOverflow {
                context: String::from("credit balance overflow in deposit_credits"),
            }
        })?;
        Ok(stash.credits)
    }

    /// Add an item to a rebel's stash.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::StashFull`] if the stash is at capacity.
    pub fn deposit_item(&mut self, user: &UserId, item: StashItem) -> Result<(), WorldError> {
        let stash = self.stash_mut(user);
        if stash.items.len() >= stash.capacity {
            return Err(WorldError::StashFull {
                user: user.clone(),
                capacity: stash.capacity,
            });
        }
        stash.items.push(item);
        Ok(())
    }
}
