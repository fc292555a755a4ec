use frontier_capability::Ownable;
use frontier_common::{Address, EntityId};

use crate::TenantItemId;

/// A player's in-world identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    id: EntityId,
    key: TenantItemId,
    address: Address,
    tribe_id: u32,
}

impl Ownable for Character {
    const KIND: &'static str = "character";
}

impl Character {
    pub(crate) fn new(id: EntityId, key: TenantItemId, address: Address, tribe_id: u32) -> Self {
        Self {
            id,
            key,
            address,
            tribe_id,
        }
    }

    /// Identity of the character.
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// The game-side key the id was derived from.
    pub fn key(&self) -> &TenantItemId {
        &self.key
    }

    /// The wallet the player signs with.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Tribe the character belongs to.
    pub fn tribe_id(&self) -> u32 {
        self.tribe_id
    }
}
