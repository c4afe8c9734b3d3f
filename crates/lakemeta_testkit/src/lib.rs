//! # lakemeta testkit
//!
//! Test utilities for lakemeta.
//!
//! This crate provides:
//! - Manager fixtures over in-memory and temporary-directory stores
//! - Rowset builders and tablet history scenarios
//! - Property-based test generators using proptest
//! - A fault-injecting blob store for publish failure tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lakemeta_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_tablet() {
//!     let fixture = TestManager::memory();
//!     let tablet = fixture.create_tablet(7);
//!     // ... test operations
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faults;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faults::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use faults::*;
pub use fixtures::*;
pub use generators::*;
