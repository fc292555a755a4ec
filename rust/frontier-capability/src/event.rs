use frontier_common::{Address, EntityId};
use serde::Serialize;

/// Records emitted when capabilities are minted or destroyed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CapabilityEvent {
    /// An admin capability was issued to `principal`.
    AdminCapIssued {
        /// World the capability belongs to.
        world: EntityId,
        /// Identity of the new capability.
        capability: EntityId,
        /// Address the capability is bound to.
        principal: Address,
    },

    /// An admin capability was destroyed.
    AdminCapRevoked {
        /// World the capability belonged to.
        world: EntityId,
        /// Identity of the destroyed capability.
        capability: EntityId,
    },

    /// An owner capability was bound to `entity`.
    OwnerCapIssued {
        /// Identity of the new capability.
        capability: EntityId,
        /// Entity the capability governs.
        entity: EntityId,
        /// Kind of entity (`character`, `storage_unit`, ...).
        kind: &'static str,
    },

    /// An owner capability was destroyed.
    OwnerCapRevoked {
        /// Identity of the destroyed capability.
        capability: EntityId,
        /// Entity the capability governed.
        entity: EntityId,
    },
}
