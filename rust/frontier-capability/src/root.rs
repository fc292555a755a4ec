use std::sync::atomic::{AtomicU64, Ordering};

use frontier_common::{Address, Digest, EntityId, EventSink};

use crate::{AdminCap, CapabilityEvent, FrontierCapabilityError, child_id};

/// The single top-level authority of a world.
///
/// A `RootCap` is produced by [`RootCap::genesis`] and is the only thing
/// that can issue or revoke [`AdminCap`]s. Its identity mixes in fresh
/// operating system entropy, so it cannot be recomputed from the world id:
/// calling `genesis` again yields an unrelated root that nothing issued by
/// the first one will answer to.
#[derive(Debug)]
pub struct RootCap {
    id: EntityId,
    world: EntityId,
    issued: AtomicU64,
}

impl RootCap {
    /// Mint a root capability for `world`.
    ///
    /// Callers are expected to do this exactly once, when the world itself
    /// is created, and to hand the result to the deployer.
    ///
    /// # Errors
    ///
    /// [`FrontierCapabilityError::Entropy`] if the operating system RNG
    /// fails.
    pub fn genesis(world: EntityId) -> Result<Self, FrontierCapabilityError> {
        let mut entropy = [0u8; 32];
        getrandom::getrandom(&mut entropy)?;

        let id: EntityId =
            Digest::of_parts([b"root".as_slice(), world.as_ref(), entropy.as_slice()]).into();
        tracing::debug!(%world, capability = %id, "root capability minted");
        Ok(Self {
            id,
            world,
            issued: AtomicU64::new(0),
        })
    }

    /// Identity of this capability.
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// The world this capability governs.
    pub fn world(&self) -> &EntityId {
        &self.world
    }

    /// Issue an admin capability bound to `principal`.
    pub fn issue<E>(&self, principal: Address, events: &mut impl EventSink<E>) -> AdminCap
    where
        E: From<CapabilityEvent>,
    {
        let nonce = self.issued.fetch_add(1, Ordering::Relaxed);
        let admin = AdminCap::new(child_id(&self.id, nonce), self.world, self.id, principal);

        tracing::debug!(capability = %admin.id(), %principal, "admin capability issued");
        events.emit(
            CapabilityEvent::AdminCapIssued {
                world: self.world,
                capability: *admin.id(),
                principal,
            }
            .into(),
        );
        admin
    }

    /// Destroy an admin capability.
    ///
    /// # Errors
    ///
    /// [`FrontierCapabilityError::Unauthorized`] if `admin` was issued by
    /// another root. The capability is dropped either way.
    pub fn revoke<E>(
        &self,
        admin: AdminCap,
        events: &mut impl EventSink<E>,
    ) -> Result<(), FrontierCapabilityError>
    where
        E: From<CapabilityEvent>,
    {
        self.check_lineage(admin.root())?;

        tracing::debug!(capability = %admin.id(), "admin capability revoked");
        events.emit(
            CapabilityEvent::AdminCapRevoked {
                world: self.world,
                capability: *admin.id(),
            }
            .into(),
        );
        Ok(())
    }

    /// Confirm that a capability descending from `root` answers to this one.
    pub fn check_lineage(&self, root: &EntityId) -> Result<(), FrontierCapabilityError> {
        if root == &self.id {
            return Ok(());
        }
        tracing::warn!(expected = %self.id, actual = %root, "capability from a foreign root");
        Err(FrontierCapabilityError::foreign_root(self.id, self.id, *root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Denial;
    use testresult::TestResult;

    const WORLD: EntityId = EntityId::new([1; 32]);

    #[test]
    fn it_mints_an_unrelated_root_on_every_genesis() -> TestResult {
        let first = RootCap::genesis(WORLD)?;
        let second = RootCap::genesis(WORLD)?;

        assert_eq!(first.world(), second.world());
        assert_ne!(first.id(), second.id());
        Ok(())
    }

    #[test]
    fn it_issues_distinct_admin_caps() -> TestResult {
        let mut events: Vec<CapabilityEvent> = Vec::new();
        let root = RootCap::genesis(WORLD)?;
        let first = root.issue(Address::new([1; 32]), &mut events);
        let second = root.issue(Address::new([1; 32]), &mut events);

        assert_ne!(first.id(), second.id());
        assert_eq!(first.world(), root.world());
        assert_eq!(first.root(), root.id());
        assert_eq!(events.len(), 2);
        Ok(())
    }

    #[test_log::test]
    fn it_revokes_its_own_admin_caps() -> TestResult {
        let mut events: Vec<CapabilityEvent> = Vec::new();
        let root = RootCap::genesis(WORLD)?;
        let admin = root.issue(Address::new([1; 32]), &mut events);
        let id = *admin.id();

        root.revoke(admin, &mut events)?;
        assert_eq!(
            events.last(),
            Some(&CapabilityEvent::AdminCapRevoked {
                world: WORLD,
                capability: id
            })
        );
        Ok(())
    }

    #[test_log::test]
    fn it_refuses_to_revoke_an_admin_cap_of_a_second_genesis() -> TestResult {
        let mut events: Vec<CapabilityEvent> = Vec::new();
        let ours = RootCap::genesis(WORLD)?;
        let forged = RootCap::genesis(WORLD)?;
        let admin = forged.issue(Address::new([1; 32]), &mut events);

        assert_eq!(
            ours.revoke(admin, &mut events),
            Err(FrontierCapabilityError::Unauthorized {
                capability: *ours.id(),
                denial: Denial::ForeignRoot {
                    expected: *ours.id(),
                    actual: *forged.id()
                }
            })
        );
        assert_eq!(events.len(), 1);
        Ok(())
    }
}
