use std::sync::atomic::{AtomicU64, Ordering};

use frontier_common::{Address, EntityId, EventSink};

use crate::{CapabilityEvent, Denial, FrontierCapabilityError, OwnerCap, Ownable, child_id};

/// Authority to create entities and bind owner capabilities to them.
///
/// An admin capability is bound to the principal it was issued to. Every
/// use re-checks that the sender of the operation is that principal, so a
/// token that leaks to another holder is inert.
///
/// It also records the [`RootCap`](crate::RootCap) it descends from, which
/// is what a world checks before accepting it.
#[derive(Debug)]
pub struct AdminCap {
    id: EntityId,
    world: EntityId,
    root: EntityId,
    principal: Address,
    issued: AtomicU64,
}

impl AdminCap {
    pub(crate) fn new(id: EntityId, world: EntityId, root: EntityId, principal: Address) -> Self {
        Self {
            id,
            world,
            root,
            principal,
            issued: AtomicU64::new(0),
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

    /// The root capability this one was issued by.
    pub fn root(&self) -> &EntityId {
        &self.root
    }

    /// The address this capability was issued to.
    pub fn principal(&self) -> &Address {
        &self.principal
    }

    /// Confirm that `sender` may exercise this capability.
    ///
    /// # Errors
    ///
    /// [`FrontierCapabilityError::Unauthorized`] unless `sender` is the
    /// principal.
    pub fn verify_sender(&self, sender: &Address) -> Result<(), FrontierCapabilityError> {
        if sender == &self.principal {
            return Ok(());
        }

        tracing::warn!(capability = %self.id, %sender, principal = %self.principal, "admin capability presented by a non-principal");
        Err(FrontierCapabilityError::Unauthorized {
            capability: self.id,
            denial: Denial::NotPrincipal {
                principal: self.principal,
                sender: *sender,
            },
        })
    }

    /// Bind a new owner capability to `entity`.
    ///
    /// # Errors
    ///
    /// [`FrontierCapabilityError::Unauthorized`] if `sender` is not the
    /// principal of this capability.
    pub fn bind<T, E>(
        &self,
        sender: &Address,
        entity: EntityId,
        events: &mut impl EventSink<E>,
    ) -> Result<OwnerCap<T>, FrontierCapabilityError>
    where
        T: Ownable,
        E: From<CapabilityEvent>,
    {
        self.verify_sender(sender)?;

        let nonce = self.issued.fetch_add(1, Ordering::Relaxed);
        let owner = OwnerCap::new(child_id(&self.id, nonce), self.world, self.root, entity);

        tracing::debug!(capability = %owner.id(), %entity, kind = T::KIND, "owner capability issued");
        events.emit(
            CapabilityEvent::OwnerCapIssued {
                capability: *owner.id(),
                entity,
                kind: T::KIND,
            }
            .into(),
        );
        Ok(owner)
    }

    /// Destroy an owner capability.
    ///
    /// # Errors
    ///
    /// [`FrontierCapabilityError::Unauthorized`] if `sender` is not the
    /// principal, or if `owner` descends from another root.
    pub fn revoke<T, E>(
        &self,
        sender: &Address,
        owner: OwnerCap<T>,
        events: &mut impl EventSink<E>,
    ) -> Result<(), FrontierCapabilityError>
    where
        E: From<CapabilityEvent>,
    {
        self.verify_sender(sender)?;

        if owner.root() != &self.root {
            tracing::warn!(capability = %owner.id(), expected = %self.root, actual = %owner.root(), "owner capability from a foreign root");
            return Err(FrontierCapabilityError::foreign_root(self.id, self.root, *owner.root()));
        }

        tracing::debug!(capability = %owner.id(), entity = %owner.bound_entity(), "owner capability revoked");
        events.emit(
            CapabilityEvent::OwnerCapRevoked {
                capability: *owner.id(),
                entity: *owner.bound_entity(),
            }
            .into(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RootCap;
    use testresult::TestResult;

    struct Crate;
    impl Ownable for Crate {
        const KIND: &'static str = "crate";
    }

    const OPERATOR: Address = Address::new([1; 32]);
    const STRANGER: Address = Address::new([2; 32]);

    fn admin(world: u8, events: &mut Vec<CapabilityEvent>) -> Result<AdminCap, FrontierCapabilityError> {
        Ok(RootCap::genesis(EntityId::new([world; 32]))?.issue(OPERATOR, events))
    }

    #[test]
    fn it_accepts_its_principal() -> TestResult {
        let admin = admin(1, &mut Vec::new())?;
        assert!(admin.verify_sender(&OPERATOR).is_ok());
        Ok(())
    }

    #[test_log::test]
    fn it_rejects_anyone_else() -> TestResult {
        let admin = admin(1, &mut Vec::new())?;
        assert!(matches!(
            admin.verify_sender(&STRANGER),
            Err(FrontierCapabilityError::Unauthorized {
                denial: Denial::NotPrincipal { .. },
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn it_binds_owner_caps_for_its_principal_only() -> TestResult {
        let mut events = Vec::new();
        let admin = admin(1, &mut events)?;
        let entity = EntityId::new([7; 32]);

        assert!(admin.bind::<Crate, _>(&STRANGER, entity, &mut events).is_err());
        let owner = admin.bind::<Crate, _>(&OPERATOR, entity, &mut events)?;

        assert_eq!(owner.bound_entity(), &entity);
        assert_eq!(owner.root(), admin.root());
        assert_eq!(
            events.last(),
            Some(&CapabilityEvent::OwnerCapIssued {
                capability: *owner.id(),
                entity,
                kind: "crate"
            })
        );
        Ok(())
    }

    #[test]
    fn it_revokes_owner_caps_of_its_own_root() -> TestResult {
        let mut events = Vec::new();
        let ours = admin(1, &mut events)?;
        let theirs = admin(1, &mut events)?;
        let entity = EntityId::new([7; 32]);

        let foreign = theirs.bind::<Crate, _>(&OPERATOR, entity, &mut events)?;
        assert!(matches!(
            ours.revoke(&OPERATOR, foreign, &mut events),
            Err(FrontierCapabilityError::Unauthorized {
                denial: Denial::ForeignRoot { .. },
                ..
            })
        ));

        let local = ours.bind::<Crate, _>(&OPERATOR, entity, &mut events)?;
        let id = *local.id();
        ours.revoke(&OPERATOR, local, &mut events)?;
        assert_eq!(
            events.last(),
            Some(&CapabilityEvent::OwnerCapRevoked {
                capability: id,
                entity
            })
        );
        Ok(())
    }
}
