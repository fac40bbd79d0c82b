//! Corporation registry and starting roster.
//!
//! Corporations are created once from seed data at process start. Health
//! only moves downward through [`CorporationRegistry::apply_damage`] and
//! clamps at zero; nothing in the core resets it.

use std::collections::BTreeMap;

use tracing::info;
use uprising_types::{Corporation, CorporationId};

use crate::error::WorldError;

/// All corporate targets, indexed by catalog key.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CorporationRegistry {
    corporations: BTreeMap<CorporationId, Corporation>,
}

impl CorporationRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            corporations: BTreeMap::new(),
        }
    }

    /// Add a corporation to the registry.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateCorporation`] if the id is taken.
    pub fn insert(&mut self, corporation: Corporation) -> Result<(), WorldError> {
        let id = corporation.id.clone();
        if self.corporations.contains_key(&id) {
            return Err(WorldError::DuplicateCorporation(id));
        }
        self.corporations.insert(id, corporation);
        Ok(())
    }

    /// Get an immutable reference to a corporation.
    pub fn get(&self, id: &CorporationId) -> Option<&Corporation> {
        self.corporations.get(id)
    }

    /// Get a mutable reference to a corporation.
    pub fn get_mut(&mut self, id: &CorporationId) -> Option<&mut Corporation> {
        self.corporations.get_mut(id)
    }

    /// Iterate over all corporations in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Corporation> {
        self.corporations.values()
    }

    /// Number of corporations in the registry.
    pub fn len(&self) -> usize {
        self.corporations.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.corporations.is_empty()
    }

    /// Apply raid damage to a corporation, clamping health at zero.
    ///
    /// Returns the remaining health and whether the corporation was
    /// brought down to zero by this hit.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CorporationNotFound`] if the id is unknown.
    pub fn apply_damage(
        &mut self,
        id: &CorporationId,
        damage: u64,
    ) -> Result<(u64, bool), WorldError> {
        let corporation = self
            .corporations
            .get_mut(id)
            .ok_or_else(|| WorldError::CorporationNotFound(id.clone()))?;

        let before = corporation.health;
        corporation.health = corporation.health.saturating_sub(damage);
        let destroyed = before > 0 && corporation.health == 0;

        info!(
            corporation = %id,
            damage,
            health = corporation.health,
            destroyed,
            "Corporation took raid damage"
        );

        Ok((corporation.health, destroyed))
    }
}

impl Default for CorporationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the starting corporate roster.
///
/// Five targets spanning the weakness spectrum, so every class-focused
/// formation has a natural mark. Loot tables and defense matrices are
/// tuned per target: harder corporations drop richer loot.
pub fn seed_corporations() -> CorporationRegistry {
    let mut registry = CorporationRegistry::new();

    let seeds = [
        Corporation::new(
            CorporationId::from("nexacore"),
            "NexaCore Systems",
            50_000,
            "legacy-auth",
            vec![
                String::from("Access Token Cache"),
                String::from("Zero-Day Dossier"),
                String::from("Server Rack Blueprints"),
            ],
            35,
        ),
        Corporation::new(
            CorporationId::from("helix-dynamics"),
            "Helix Dynamics",
            75_000,
            "supply-chain",
            vec![
                String::from("Prototype Fabricator"),
                String::from("Logistics Manifest"),
                String::from("Encrypted Cargo Keys"),
            ],
            45,
        ),
        Corporation::new(
            CorporationId::from("veridian-data"),
            "Veridian Data Holdings",
            60_000,
            "data-hoard",
            vec![
                String::from("Citizen Profile Archive"),
                String::from("Ad Model Weights"),
                String::from("Dark Pattern Library"),
            ],
            40,
        ),
        Corporation::new(
            CorporationId::from("aegis-integrated"),
            "Aegis Integrated Defense",
            100_000,
            "contractor-badge",
            vec![
                String::from("Drone Override Module"),
                String::from("Patrol Schedule"),
                String::from("Armory Keycard"),
            ],
            60,
        ),
        Corporation::new(
            CorporationId::from("lumen-grid"),
            "Lumen Grid Utilities",
            40_000,
            "scada-relay",
            vec![
                String::from("Substation Map"),
                String::from("Maintenance Credentials"),
                String::from("Load Balancer Firmware"),
            ],
            25,
        ),
    ];

    for corporation in seeds {
        // Seed keys are distinct by construction.
        let _ = registry.insert(corporation);
    }

    registry
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn seed_roster_has_five_targets() {
        let registry = seed_corporations();
        assert_eq!(registry.len(), 5);
        let nexacore = registry.get(&CorporationId::from("nexacore")).unwrap();
        assert_eq!(nexacore.health, nexacore.max_health);
        assert!(!nexacore.loot.is_empty());
    }

    #[test]
    fn duplicate_insert_rejected() {
        let mut registry = seed_corporations();
        let dup = Corporation::new(
            CorporationId::from("nexacore"),
            "NexaCore Clone",
            1,
            "none",
            Vec::new(),
            0,
        );
        assert!(matches!(
            registry.insert(dup),
            Err(WorldError::DuplicateCorporation(_))
        ));
    }

    #[test]
    fn damage_clamps_at_zero() {
        let mut registry = seed_corporations();
        let id = CorporationId::from("lumen-grid");
        let (health, destroyed) = registry.apply_damage(&id, 39_999).unwrap();
        assert_eq!(health, 1);
        assert!(!destroyed);

        let (health, destroyed) = registry.apply_damage(&id, u64::MAX).unwrap();
        assert_eq!(health, 0);
        assert!(destroyed);

        // Already at zero: not destroyed again.
        let (_, destroyed) = registry.apply_damage(&id, 100).unwrap();
        assert!(!destroyed);
    }

    #[test]
    fn damage_unknown_corporation_fails() {
        let mut registry = CorporationRegistry::new();
        assert!(matches!(
            registry.apply_damage(&CorporationId::from("ghost-corp"), 10),
            Err(WorldError::CorporationNotFound(_))
        ));
    }
}
