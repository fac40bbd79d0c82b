//! Formation catalog and starting presets.
//!
//! Formations are static team-composition templates: each carries a set of
//! [`Decimal`] multipliers (damage, energy, loot, protection, stealth) and
//! membership bounds. The catalog is seeded once at startup and read-only
//! afterwards.
//!
//! [`Decimal`]: rust_decimal::Decimal

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use uprising_types::{Formation, FormationId, RebelClass};

use crate::error::WorldError;

/// All formation presets, indexed by catalog key.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FormationCatalog {
    formations: BTreeMap<FormationId, Formation>,
}

impl FormationCatalog {
    /// Create an empty catalog.
    pub const fn new() -> Self {
        Self {
            formations: BTreeMap::new(),
        }
    }

    /// Add a formation to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateFormation`] if the id is taken.
    pub fn insert(&mut self, formation: Formation) -> Result<(), WorldError> {
        let id = formation.id.clone();
        if self.formations.contains_key(&id) {
            return Err(WorldError::DuplicateFormation(id));
        }
        self.formations.insert(id, formation);
        Ok(())
    }

    /// Look up a formation by key.
    pub fn get(&self, id: &FormationId) -> Option<&Formation> {
        self.formations.get(id)
    }

    /// Look up a formation, erroring when absent.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::FormationNotFound`] if the id is unknown.
    pub fn require(&self, id: &FormationId) -> Result<&Formation, WorldError> {
        self.formations
            .get(id)
            .ok_or_else(|| WorldError::FormationNotFound(id.clone()))
    }

    /// Iterate over all formations in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Formation> {
        self.formations.values()
    }

    /// Number of formations in the catalog.
    pub fn len(&self) -> usize {
        self.formations.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.formations.is_empty()
    }
}

impl Default for FormationCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the starting formation catalog.
///
/// Five presets spanning the damage/stealth/loot/protection trade-offs.
/// Multipliers are constructed with `Decimal::new(mantissa, scale)` so the
/// values are exact (e.g. `new(12, 1)` is 1.2).
pub fn seed_formations() -> FormationCatalog {
    let mut catalog = FormationCatalog::new();

    let mut ghost_classes = BTreeSet::new();
    ghost_classes.insert(RebelClass::ProtocolHacker);
    ghost_classes.insert(RebelClass::DataLiberator);
    ghost_classes.insert(RebelClass::Freerunner);

    let seeds = [
        Formation {
            id: FormationId::from("balanced-front"),
            name: String::from("Balanced Front"),
            description: String::from("Reliable all-rounder for mixed cells."),
            damage_bonus: Decimal::new(12, 1),    // 1.2
            energy_cost: Decimal::ONE,            // 1.0
            loot_bonus: Decimal::ONE,             // 1.0
            protection_bonus: Decimal::ONE,       // 1.0
            stealth_bonus: Decimal::new(5, 1),    // 0.5
            min_members: 2,
            max_members: 5,
            class_requirements: None,
        },
        Formation {
            id: FormationId::from("hammer-protocol"),
            name: String::from("Hammer Protocol"),
            description: String::from("Maximum damage, maximum exposure."),
            damage_bonus: Decimal::new(15, 1),    // 1.5
            energy_cost: Decimal::new(13, 1),     // 1.3
            loot_bonus: Decimal::ONE,             // 1.0
            protection_bonus: Decimal::new(8, 1), // 0.8
            stealth_bonus: Decimal::new(2, 1),    // 0.2
            min_members: 3,
            max_members: 6,
            class_requirements: None,
        },
        Formation {
            id: FormationId::from("ghost-cell"),
            name: String::from("Ghost Cell"),
            description: String::from("Small, quiet, and hard to trace."),
            damage_bonus: Decimal::new(9, 1),     // 0.9
            energy_cost: Decimal::ONE,            // 1.0
            loot_bonus: Decimal::new(11, 1),      // 1.1
            protection_bonus: Decimal::ONE,       // 1.0
            stealth_bonus: Decimal::new(9, 1),    // 0.9
            min_members: 2,
            max_members: 4,
            class_requirements: Some(ghost_classes),
        },
        Formation {
            id: FormationId::from("vault-breakers"),
            name: String::from("Vault Breakers"),
            description: String::from("Built to carry everything out."),
            damage_bonus: Decimal::ONE,           // 1.0
            energy_cost: Decimal::new(11, 1),     // 1.1
            loot_bonus: Decimal::new(16, 1),      // 1.6
            protection_bonus: Decimal::new(9, 1), // 0.9
            stealth_bonus: Decimal::new(4, 1),    // 0.4
            min_members: 3,
            max_members: 5,
            class_requirements: None,
        },
        Formation {
            id: FormationId::from("aegis-wall"),
            name: String::from("Aegis Wall"),
            description: String::from("Turtle up and weather the response."),
            damage_bonus: Decimal::new(8, 1),     // 0.8
            energy_cost: Decimal::new(9, 1),      // 0.9
            loot_bonus: Decimal::new(9, 1),       // 0.9
            protection_bonus: Decimal::new(15, 1),// 1.5
            stealth_bonus: Decimal::new(3, 1),    // 0.3
            min_members: 3,
            max_members: 7,
            class_requirements: None,
        },
    ];

    for formation in seeds {
        // Seed keys are distinct by construction.
        let _ = catalog.insert(formation);
    }

    catalog
}
