#![warn(missing_docs)]

//! This crate constitutes a library of light weight helpers that are shared
//! across the other frontier crates: identifiers, hashing, the clock the core
//! reads deadlines against, and the event sink it appends to.

mod hash;
pub use hash::*;

mod id;
pub use id::*;

mod clock;
pub use clock::*;

mod event;
pub use event::*;
