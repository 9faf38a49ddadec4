//! # Security Log Store Test Suite
//!
//! Test crate exercising the store through its public surface only.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs          # Shared host and record builders
//! └── integration/
//!     ├── lifecycle.rs         # Host invocations end to end
//!     ├── index_consistency.rs # Randomized mutation sequences vs. a model
//!     └── scans.rs             # Pagination, purge and cursor release
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p seclog-tests
//!
//! # By category
//! cargo test -p seclog-tests integration::lifecycle::
//!
//! # Benchmarks
//! cargo bench -p seclog-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
