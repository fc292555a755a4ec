//! Records appended to the world journal by every mutation.
//!
//! Events are serialized with the variant name in a `type` field so an
//! off-chain indexer can dispatch on it:
//!
//! ```json
//! { "type": "ItemMinted", "inventory": "0x…", "item_id": 7, "quantity_before": 0, … }
//! ```

use frontier_capability::CapabilityEvent;
use frontier_common::{Address, EntityId};
use serde::Serialize;

use crate::{Status, TenantItemId};

/// Before and after view of one item in one inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemDelta {
    /// Owner scope of the inventory that changed.
    pub inventory: EntityId,
    /// Object identity of the item.
    pub item: EntityId,
    /// Game-side item id.
    pub item_id: u64,
    /// Game-side item type.
    pub type_id: u64,
    /// Units held before the change.
    pub quantity_before: u32,
    /// Units held after the change.
    pub quantity_after: u32,
    /// Used capacity of the inventory before the change.
    pub used_before: u64,
    /// Used capacity of the inventory after the change.
    pub used_after: u64,
}

/// Everything the world reports to its journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum WorldEvent {
    /// The root capability issued an admin capability.
    AdminCapIssued {
        /// World the capability governs.
        world: EntityId,
        /// The new admin capability.
        capability: EntityId,
        /// Address that may exercise it.
        principal: Address,
    },
    /// The root capability destroyed an admin capability.
    AdminCapRevoked {
        /// World the capability governed.
        world: EntityId,
        /// The destroyed admin capability.
        capability: EntityId,
    },
    /// An admin bound an owner capability to an entity.
    OwnerCapIssued {
        /// The new owner capability.
        capability: EntityId,
        /// Entity it authorizes.
        entity: EntityId,
        /// Kind of the entity, for indexers.
        kind: &'static str,
    },
    /// An admin destroyed an owner capability.
    OwnerCapRevoked {
        /// The destroyed owner capability.
        capability: EntityId,
        /// Entity it authorized.
        entity: EntityId,
    },

    /// A server became trusted to sign proximity proofs.
    ServerRegistered {
        /// Address of the server key.
        server: Address,
    },
    /// A server stopped being trusted.
    ServerRemoved {
        /// Address of the server key.
        server: Address,
    },

    /// A character was created.
    CharacterCreated {
        /// Derived identity of the character.
        character: EntityId,
        /// Game-side key the identity was derived from.
        key: TenantItemId,
        /// Player address the character belongs to.
        address: Address,
        /// Tribe the character joined.
        tribe_id: u32,
    },

    /// A storage unit was placed in the world.
    StorageUnitAnchored {
        /// Derived identity of the unit.
        assembly: EntityId,
        /// Game-side key the identity was derived from.
        key: TenantItemId,
        /// Volume the unit can hold.
        max_capacity: u64,
        /// Location commitment of the unit.
        location_hash: [u8; 32],
    },
    /// An assembly moved between lifecycle states.
    StatusChanged {
        /// The assembly.
        assembly: EntityId,
        /// State before the change.
        from: Status,
        /// State after the change.
        to: Status,
    },
    /// An entity's location commitment changed.
    LocationUpdated {
        /// The entity.
        entity: EntityId,
        /// New location commitment.
        location_hash: [u8; 32],
    },
    /// The owner of an assembly authorized an extension on it.
    ExtensionAuthorized {
        /// The assembly.
        assembly: EntityId,
        /// Name of the extension.
        extension: &'static str,
    },

    /// New units were created, either as a new item or merged into one.
    ItemMinted(ItemDelta),
    /// The last units of an item were burned and the item is gone.
    ItemBurned(ItemDelta),
    /// Some units of an item were burned.
    ItemQuantityChanged(ItemDelta),
    /// Units moved into an inventory.
    ItemDeposited(ItemDelta),
    /// Units moved out of an inventory.
    ItemWithdrawn(ItemDelta),
    /// The item was held by an inventory that was destroyed.
    ItemDestroyed(ItemDelta),
}

impl From<CapabilityEvent> for WorldEvent {
    fn from(event: CapabilityEvent) -> Self {
        match event {
            CapabilityEvent::AdminCapIssued {
                world,
                capability,
                principal,
            } => WorldEvent::AdminCapIssued {
                world,
                capability,
                principal,
            },
            CapabilityEvent::AdminCapRevoked { world, capability } => {
                WorldEvent::AdminCapRevoked { world, capability }
            }
            CapabilityEvent::OwnerCapIssued {
                capability,
                entity,
                kind,
            } => WorldEvent::OwnerCapIssued {
                capability,
                entity,
                kind,
            },
            CapabilityEvent::OwnerCapRevoked { capability, entity } => {
                WorldEvent::OwnerCapRevoked { capability, entity }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    #[test]
    fn it_tags_events_with_their_name() -> TestResult {
        let event = WorldEvent::ItemBurned(ItemDelta {
            inventory: EntityId::ZERO,
            item: EntityId::ZERO,
            item_id: 7,
            type_id: 9,
            quantity_before: 3,
            quantity_after: 0,
            used_before: 30,
            used_after: 0,
        });

        let json = serde_json::to_value(&event)?;
        assert_eq!(json["type"], "ItemBurned");
        assert_eq!(json["item_id"], 7);
        assert_eq!(json["used_after"], 0);
        Ok(())
    }

    #[test]
    fn it_lifts_capability_events() -> TestResult {
        let event: WorldEvent = CapabilityEvent::OwnerCapRevoked {
            capability: EntityId::new([1; 32]),
            entity: EntityId::new([2; 32]),
        }
        .into();

        let json = serde_json::to_value(&event)?;
        assert_eq!(json["type"], "OwnerCapRevoked");
        Ok(())
    }
}
