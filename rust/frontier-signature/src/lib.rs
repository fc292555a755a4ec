#![warn(missing_docs)]

//! Self-describing signatures for off-chain attestations.
//!
//! A signature travels as a single blob:
//!
//! ```text
//! ┌──────┬─────────────────────┬──────────────────────┐
//! │ flag │      signature      │      public key      │
//! │ (1B) │ (scheme dependent)  │  (scheme dependent)  │
//! └──────┴─────────────────────┴──────────────────────┘
//! ```
//!
//! The flag selects a [`SignatureScheme`], which fixes both lengths. The
//! signer's [`Address`] is re-derived from the embedded public key, so a
//! verifier needs nothing but the message, the blob and the address it
//! expects:
//!
//! ```rust
//! use frontier_signature::{SignatureScheme, Signer, verify_signature};
//!
//! let server = Signer::from_seed(SignatureScheme::Ed25519, [7u8; 32]).unwrap();
//! let blob = server.sign_message(b"player is at the gate").unwrap();
//!
//! assert!(verify_signature(b"player is at the gate", &blob, &server.address()).unwrap());
//! assert!(!verify_signature(b"player is elsewhere", &blob, &server.address()).unwrap());
//! ```
//!
//! Verification is two-phase: the address comparison runs first and a
//! mismatch returns `false` before any curve arithmetic is attempted.
//!
//! [`Address`]: frontier_common::Address

mod error;
pub use error::*;

mod scheme;
pub use scheme::*;

mod verifier;
pub use verifier::*;

mod signer;
pub use signer::*;
