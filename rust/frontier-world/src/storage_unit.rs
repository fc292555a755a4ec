//! Storage units: assemblies that hold items.
//!
//! A storage unit has one main inventory and, lazily, one inventory per
//! character that has been handed items through an extension:
//!
//! ```text
//!   StorageUnit
//!   ├── status     Anchored | Online
//!   ├── location   32-byte commitment
//!   ├── inventory  main, owned by the unit
//!   └── owned      character id ──▶ Inventory (created on first deposit)
//! ```
//!
//! The owner may authorize one extension, named by a witness type. Code
//! that can construct the witness may move items in and out without the
//! owner capability.

use std::any::{TypeId, type_name};
use std::collections::BTreeMap;

use frontier_capability::Ownable;
use frontier_common::{Digest, EntityId};

use crate::{AssemblyStatus, Inventory, Location, TenantItemId};

/// Preconditions the owner attaches to request-gated withdrawals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalRule {
    /// The withdrawer must prove they are at the unit.
    Proximity,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Extension {
    type_id: TypeId,
    name: &'static str,
}

impl Extension {
    pub(crate) fn of<W: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<W>(),
            name: type_name::<W>(),
        }
    }

    pub(crate) fn admits<W: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<W>()
    }
}

/// An anchored assembly holding items.
#[derive(Debug)]
pub struct StorageUnit {
    pub(crate) id: EntityId,
    pub(crate) key: TenantItemId,
    pub(crate) status: AssemblyStatus,
    pub(crate) location: Location,
    pub(crate) inventory: Inventory,
    pub(crate) owned: BTreeMap<EntityId, Inventory>,
    pub(crate) extension: Option<Extension>,
    pub(crate) withdrawal_rules: Vec<WithdrawalRule>,
}

impl Ownable for StorageUnit {
    const KIND: &'static str = "storage_unit";
}

impl StorageUnit {
    pub(crate) fn new(id: EntityId, key: TenantItemId, location: Location, inventory: Inventory) -> Self {
        Self {
            id,
            key,
            status: AssemblyStatus::anchor(id),
            location,
            inventory,
            owned: BTreeMap::new(),
            extension: None,
            withdrawal_rules: Vec::new(),
        }
    }

    /// Identity of the unit.
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// The game-side key the id was derived from.
    pub fn key(&self) -> &TenantItemId {
        &self.key
    }

    /// Lifecycle status.
    pub fn status(&self) -> &AssemblyStatus {
        &self.status
    }

    /// Where the unit is.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The main inventory.
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// The inventory held for `owner`, if one has been created.
    pub fn owned_inventory(&self, owner: &EntityId) -> Option<&Inventory> {
        self.owned.get(owner)
    }

    /// Type name of the authorized extension witness.
    pub fn extension(&self) -> Option<&'static str> {
        self.extension.map(|extension| extension.name)
    }

    /// Rules gating request-based withdrawals.
    pub fn withdrawal_rules(&self) -> &[WithdrawalRule] {
        &self.withdrawal_rules
    }

    /// Owner scope of the inventory held for `owner`.
    pub(crate) fn owned_scope(&self, owner: &EntityId) -> EntityId {
        Digest::of_parts([self.id.as_ref(), owner.as_ref()]).into()
    }
}
