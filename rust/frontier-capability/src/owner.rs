use std::marker::PhantomData;

use frontier_common::EntityId;

/// Kinds of entity an [`OwnerCap`] can be bound to.
pub trait Ownable {
    /// Short name used in logs and events.
    const KIND: &'static str;
}

/// Authority over exactly one entity of kind `T`.
///
/// The kind parameter keeps a capability for one kind of entity from being
/// presented where another is expected: an `OwnerCap<StorageUnit>` does not
/// typecheck as an `OwnerCap<Character>`.
///
/// Owner capabilities are transferable by moving the value, and are never
/// cloned. Like an [`AdminCap`](crate::AdminCap) they record the root
/// capability they descend from.
pub struct OwnerCap<T> {
    id: EntityId,
    world: EntityId,
    root: EntityId,
    bound_entity: EntityId,
    kind: PhantomData<fn() -> T>,
}

impl<T> OwnerCap<T> {
    pub(crate) fn new(id: EntityId, world: EntityId, root: EntityId, bound_entity: EntityId) -> Self {
        Self {
            id,
            world,
            root,
            bound_entity,
            kind: PhantomData,
        }
    }

    /// Identity of this capability.
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// The world that issued this capability.
    pub fn world(&self) -> &EntityId {
        &self.world
    }

    /// The root capability this one descends from.
    pub fn root(&self) -> &EntityId {
        &self.root
    }

    /// The entity this capability governs.
    pub fn bound_entity(&self) -> &EntityId {
        &self.bound_entity
    }

    /// Whether this capability governs `entity`.
    pub fn is_authorized(&self, entity: &EntityId) -> bool {
        &self.bound_entity == entity
    }
}

impl<T: Ownable> std::fmt::Debug for OwnerCap<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnerCap")
            .field("kind", &T::KIND)
            .field("id", &self.id)
            .field("bound_entity", &self.bound_entity)
            .finish()
    }
}
