use std::fmt;

use frontier_capability::OwnerCap;
use frontier_common::{EntityId, EventSink};
use serde::Serialize;

use crate::{StatusError, WorldEvent};

/// Lifecycle state of an assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    /// Placed in the world but not operating.
    Anchored,
    /// Operating: items may be minted into it.
    Online,
    /// Removed from the world. Terminal.
    Destroyed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Anchored => "anchored",
            Status::Online => "online",
            Status::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// The lifecycle of one assembly.
///
/// ```text
///              online            unanchor
///   Anchored ─────────▶ Online ───────────▶ Destroyed
///       ▲                  │
///       └──────────────────┘
///            offline
///   Anchored ────────────────────────────▶ Destroyed
///                      unanchor
/// ```
#[derive(Debug)]
pub struct AssemblyStatus {
    assembly: EntityId,
    state: Status,
}

impl AssemblyStatus {
    /// A freshly anchored assembly.
    pub fn anchor(assembly: EntityId) -> Self {
        Self {
            assembly,
            state: Status::Anchored,
        }
    }

    /// The assembly this status belongs to.
    pub fn assembly(&self) -> &EntityId {
        &self.assembly
    }

    /// Current state.
    pub fn state(&self) -> Status {
        self.state
    }

    /// Whether the assembly is online.
    pub fn is_online(&self) -> bool {
        self.state == Status::Online
    }

    /// Fail with [`StatusError::NotOnline`] unless the assembly is online.
    pub fn require_online(&self) -> Result<(), StatusError> {
        if self.is_online() {
            Ok(())
        } else {
            Err(StatusError::NotOnline {
                assembly: self.assembly,
            })
        }
    }

    /// Bring an anchored assembly online.
    ///
    /// Only the binding of `owner` is checked here; the world confirms the
    /// capability descends from its root before calling this.
    pub fn online<T>(
        &mut self,
        owner: &OwnerCap<T>,
        events: &mut impl EventSink<WorldEvent>,
    ) -> Result<(), StatusError> {
        self.transition(owner, Status::Anchored, Status::Online, events)
    }

    /// Take an online assembly back to anchored.
    pub fn offline<T>(
        &mut self,
        owner: &OwnerCap<T>,
        events: &mut impl EventSink<WorldEvent>,
    ) -> Result<(), StatusError> {
        self.transition(owner, Status::Online, Status::Anchored, events)
    }

    /// Destroy the assembly. The status is consumed, so nothing can move it
    /// out of `Destroyed`.
    pub fn unanchor(self, events: &mut impl EventSink<WorldEvent>) {
        tracing::debug!(assembly = %self.assembly, from = %self.state, "assembly unanchored");
        events.emit(WorldEvent::StatusChanged {
            assembly: self.assembly,
            from: self.state,
            to: Status::Destroyed,
        });
    }

    fn transition<T>(
        &mut self,
        owner: &OwnerCap<T>,
        expected: Status,
        next: Status,
        events: &mut impl EventSink<WorldEvent>,
    ) -> Result<(), StatusError> {
        if !owner.is_authorized(&self.assembly) {
            return Err(StatusError::NotAuthorized {
                assembly: self.assembly,
            });
        }
        if self.state != expected {
            return Err(StatusError::InvalidStatus {
                assembly: self.assembly,
                expected,
                actual: self.state,
            });
        }

        tracing::debug!(assembly = %self.assembly, from = %self.state, to = %next, "status changed");
        events.emit(WorldEvent::StatusChanged {
            assembly: self.assembly,
            from: self.state,
            to: next,
        });
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontier_capability::{CapabilityEvent, Ownable, RootCap};
    use frontier_common::Address;
    use testresult::TestResult;

    struct Turret;
    impl Ownable for Turret {
        const KIND: &'static str = "turret";
    }

    const OPERATOR: Address = Address::new([1; 32]);
    const TURRET: EntityId = EntityId::new([5; 32]);

    fn owner_cap(entity: EntityId) -> anyhow::Result<OwnerCap<Turret>> {
        let mut events: Vec<CapabilityEvent> = Vec::new();
        let root = RootCap::genesis(EntityId::new([9; 32]))?;
        let admin = root.issue(OPERATOR, &mut events);
        Ok(admin.bind::<Turret, _>(&OPERATOR, entity, &mut events)?)
    }

    #[test_log::test]
    fn it_cycles_between_anchored_and_online() -> TestResult {
        let mut events = Vec::new();
        let cap = owner_cap(TURRET)?;
        let mut status = AssemblyStatus::anchor(TURRET);

        status.online(&cap, &mut events)?;
        assert!(status.is_online());
        status.offline(&cap, &mut events)?;
        assert_eq!(status.state(), Status::Anchored);
        assert_eq!(events.len(), 2);
        Ok(())
    }

    #[test]
    fn it_refuses_offline_before_online() -> TestResult {
        let cap = owner_cap(TURRET)?;
        let mut status = AssemblyStatus::anchor(TURRET);

        assert_eq!(
            status.offline(&cap, &mut Vec::new()),
            Err(StatusError::InvalidStatus {
                assembly: TURRET,
                expected: Status::Online,
                actual: Status::Anchored
            })
        );
        Ok(())
    }

    #[test]
    fn it_refuses_online_twice() -> TestResult {
        let mut events = Vec::new();
        let cap = owner_cap(TURRET)?;
        let mut status = AssemblyStatus::anchor(TURRET);

        status.online(&cap, &mut events)?;
        assert!(matches!(
            status.online(&cap, &mut events),
            Err(StatusError::InvalidStatus {
                actual: Status::Online,
                ..
            })
        ));
        assert_eq!(events.len(), 1);
        Ok(())
    }

    #[test]
    fn it_refuses_a_cap_for_another_assembly() -> TestResult {
        let cap = owner_cap(EntityId::new([6; 32]))?;
        let mut status = AssemblyStatus::anchor(TURRET);

        assert_eq!(
            status.online(&cap, &mut Vec::new()),
            Err(StatusError::NotAuthorized { assembly: TURRET })
        );
        assert!(matches!(
            status.require_online(),
            Err(StatusError::NotOnline { .. })
        ));
        Ok(())
    }

    #[test]
    fn it_reports_the_terminal_transition() {
        let mut events = Vec::new();
        AssemblyStatus::anchor(TURRET).unanchor(&mut events);
        assert_eq!(
            events,
            vec![WorldEvent::StatusChanged {
                assembly: TURRET,
                from: Status::Anchored,
                to: Status::Destroyed
            }]
        );
    }
}
