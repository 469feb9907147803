//! # delsync Testkit
//!
//! Test utilities for delete-for-me sync.
//!
//! This crate provides:
//! - Deterministic identifiers and a `Device` fixture over `InMemoryStore`
//! - Randomized `Scenario`s: a device history plus an intent set aimed at it
//! - Property-based test generators using proptest
//! - Durable and wire encoding test vectors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use delsync_testkit::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn roundtrip(contents in contents_strategy()) {
//!         // ...
//!     }
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use vectors::*;
