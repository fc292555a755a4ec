#![warn(missing_docs)]

//! The authorization and ledger core of a persistent game world.
//!
//! A [`World`] is created once, together with the single [`RootCap`] that
//! governs it. From there every privileged action is gated by possession of
//! a capability token, a proximity proof signed by a trusted server, or
//! both:
//!
//! ```text
//!                        RootCap
//!                           │ issue_admin
//!                           ▼
//!   game server ──────▶ AdminCap ──anchor_storage_unit──▶ OwnerCap<StorageUnit>
//!        │                  │                                  │
//!        │ signs            │ game_item_to_chain               │ online / offline
//!        ▼                  ▼                                  ▼
//!   LocationProof ──▶ StorageUnit { status, location, inventory, owned }
//!                           │
//!                           └──▶ Journal<WorldEvent> ──▶ off-chain mirrors
//! ```
//!
//! ```rust
//! use frontier_common::{Address, FixedClock};
//! use frontier_world::{Context, TenantItemId, World, WorldConfig};
//!
//! # fn main() -> Result<(), frontier_world::WorldError> {
//! let (mut world, root) = World::genesis_with_clock(WorldConfig::default(), FixedClock::new(0))?;
//! let operator = Context::new(Address::new([1; 32]));
//! let admin = world.issue_admin(&root, operator.sender)?;
//!
//! let key = TenantItemId::new(1000004145107, "stillness")?;
//! let owner = world.anchor_storage_unit(&operator, &admin, key, 1_000, &[7; 32])?;
//! let unit = *owner.bound_entity();
//!
//! world.online(&unit, &owner)?;
//! world.game_item_to_chain(&operator, &admin, &unit, 88, 88069, 100, 10)?;
//! assert_eq!(world.storage_unit(&unit)?.inventory().remaining_capacity(), 0);
//! # Ok(())
//! # }
//! ```

mod config;
pub use config::*;

mod error;
pub use error::*;

mod events;
pub use events::*;

mod registry;
pub use registry::*;

mod status;
pub use status::*;

mod location;
pub use location::*;

mod inventory;
pub use inventory::*;

mod character;
pub use character::*;

mod storage_unit;
pub use storage_unit::*;

mod world;
pub use world::*;

pub use frontier_capability::{AdminCap, OwnerCap, RootCap};
pub use frontier_request::{ApplicationRequest, Refused};
