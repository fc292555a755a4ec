#![warn(missing_docs)]

//! A request is a promise that an action may run once a set of typed
//! preconditions has been satisfied. Each precondition is a [`Requirement`]
//! and may be discharged by a different party: a proximity check, a payment,
//! an extension's own rule. Nothing in this crate knows what a requirement
//! means. It only tracks which ones are still outstanding.
//!
//! ```text
//!  RequestBuilder ──build──▶ ApplicationRequest ──complete_requirement::<A>()──▶ ...
//!                              [A, B, C]                 [B, C]
//!
//!  ... ──complete_requirement::<C>()──▶ [] ──RequestEngine::complete──▶ Completed
//! ```
//!
//! A request is moved into [`RequestEngine::complete`], so it cannot be
//! completed twice. A caller that needs the request back when completion
//! fails goes through [`RequestEngine::prepare`], which returns it inside a
//! [`Refused`].
//!
//! ```rust
//! use frontier_request::RequestEngine;
//!
//! struct Toll(u64);
//!
//! let engine = RequestEngine::new(1);
//! let mut request = engine
//!     .request("open_gate")
//!     .requirement(Toll(5))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(request.pending(), 1);
//! assert!(request.has_requirement::<Toll>());
//!
//! let Toll(amount) = request.complete_requirement::<Toll>().unwrap();
//! assert_eq!(amount, 5);
//! assert_eq!(engine.complete(request).unwrap().action(), "open_gate");
//! ```

mod error;
pub use error::*;

mod requirement;
pub use requirement::*;

mod request;
pub use request::*;

mod engine;
pub use engine::*;
