//! # Content Proxy Testkit
//!
//! Test utilities for content object proxy synchronization.
//!
//! This crate provides:
//! - Fixtures that assemble in-memory backends and engines
//! - Ready-made catalog scenarios
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use contentproxy_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_catalog() {
//!     let backends = scenarios::product_catalog(3);
//!     let engine = test_engine(&backends);
//!     // ... run passes
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
