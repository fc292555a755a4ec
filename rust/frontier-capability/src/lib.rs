#![warn(missing_docs)]

//! Capability tokens that gate every privileged operation in a world.
//!
//! Authority flows down a strict hierarchy, and each tier is minted only by
//! the tier above it:
//!
//! ```text
//!   RootCap ──issue(principal)──▶ AdminCap ──bind::<T>(entity)──▶ OwnerCap<T>
//!   (one per world,                (bound to one                  (bound to one
//!    minted at genesis)             principal address)             entity of kind T)
//! ```
//!
//! None of the tokens implement [`Clone`]: holding one *is* the authority,
//! so duplicating it would duplicate authority. Revocation takes a token by
//! value and destroys it.
//!
//! Every admin and owner capability records the root it descends from. A
//! root's identity is drawn from operating system entropy, so a second
//! [`RootCap::genesis`] for the same world cannot stand in for the first.
//!
//! ```rust
//! use frontier_capability::{CapabilityEvent, Ownable, RootCap};
//! use frontier_common::{Address, EntityId};
//!
//! struct Gate;
//! impl Ownable for Gate {
//!     const KIND: &'static str = "gate";
//! }
//!
//! let mut events: Vec<CapabilityEvent> = Vec::new();
//! let operator = Address::new([1; 32]);
//! let gate = EntityId::new([9; 32]);
//!
//! let root = RootCap::genesis(EntityId::new([0xAA; 32])).unwrap();
//! let admin = root.issue(operator, &mut events);
//! let owner = admin.bind::<Gate, _>(&operator, gate, &mut events).unwrap();
//!
//! assert!(owner.is_authorized(&gate));
//! assert!(!owner.is_authorized(&EntityId::ZERO));
//! ```

mod error;
pub use error::*;

mod event;
pub use event::*;

mod root;
pub use root::*;

mod admin;
pub use admin::*;

mod owner;
pub use owner::*;

use frontier_common::{Digest, EntityId};

/// Derive the identity of the `nonce`-th capability issued by `parent`.
fn child_id(parent: &EntityId, nonce: u64) -> EntityId {
    Digest::of_parts([
        b"capability".as_slice(),
        parent.as_ref(),
        nonce.to_le_bytes().as_slice(),
    ])
    .into()
}
