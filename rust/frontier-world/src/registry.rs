//! Deterministic entity ids.
//!
//! Every entity the world creates on behalf of a game server is named by a
//! natural key the server already knows (its own item id, scoped by tenant).
//! The registry turns that key into an [`EntityId`] without any lookup:
//!
//! ```text
//!   id = blake3(registry_id ‖ canonical(key))
//! ```
//!
//! so a server can compute the id of an entity before (or without) asking
//! the world. Claiming an id is a separate, one-time step.

use std::collections::BTreeSet;

use frontier_common::{Digest, EntityId};
use frontier_encoding::{Encode, FrontierEncodingError, to_bytes};
use serde::Serialize;

use crate::RegistryError;

/// A game-side item id scoped by the tenant (game server cluster) that
/// issued it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TenantItemId {
    item_id: u64,
    tenant: String,
}

impl TenantItemId {
    /// A key for `item_id` issued by `tenant`. Neither may be empty.
    pub fn new(item_id: u64, tenant: impl Into<String>) -> Result<Self, RegistryError> {
        let tenant = tenant.into();
        if item_id == 0 {
            return Err(RegistryError::ItemIdEmpty);
        }
        if tenant.is_empty() {
            return Err(RegistryError::TenantEmpty);
        }
        Ok(Self { item_id, tenant })
    }

    /// Game-side item id.
    pub fn item_id(&self) -> u64 {
        self.item_id
    }

    /// Tenant that issued the id.
    pub fn tenant(&self) -> &str {
        &self.tenant
    }
}

impl Encode for TenantItemId {
    fn encode<W: std::io::Write>(&self, writer: &mut W) -> Result<(), FrontierEncodingError> {
        self.item_id.encode(writer)?;
        self.tenant.encode(writer)
    }
}

/// Derives ids within one scope and remembers which have been claimed.
///
/// Claims are permanent: an entity that is destroyed keeps its key, so the
/// same key can never name a second entity.
#[derive(Debug)]
pub struct Registry {
    id: EntityId,
    claimed: BTreeSet<EntityId>,
}

impl Registry {
    /// An empty registry deriving ids within scope `id`.
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            claimed: BTreeSet::new(),
        }
    }

    /// The scope ids are derived in.
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Compute the id `key` maps to. Pure: claims nothing.
    pub fn derive<K: Encode + ?Sized>(&self, key: &K) -> Result<EntityId, RegistryError> {
        let key = to_bytes(key)?;
        Ok(Digest::of_parts([self.id.as_ref(), key.as_slice()]).into())
    }

    /// Whether `key` has been claimed.
    pub fn is_claimed<K: Encode + ?Sized>(&self, key: &K) -> Result<bool, RegistryError> {
        Ok(self.claimed.contains(&self.derive(key)?))
    }

    /// Claim `key` and return its id.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AlreadyClaimed`] if the key has been claimed before,
    /// even if the entity it named has since been destroyed.
    pub fn claim<K: Encode + ?Sized>(&mut self, key: &K) -> Result<EntityId, RegistryError> {
        let id = self.derive(key)?;
        if !self.claimed.insert(id) {
            return Err(RegistryError::AlreadyClaimed { id });
        }

        tracing::debug!(registry = %self.id, entity = %id, "key claimed");
        Ok(id)
    }

    /// Number of claimed keys.
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    /// Whether nothing has been claimed.
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}
