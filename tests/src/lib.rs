//! # Bridge Test Suite
//!
//! Unified test crate for behaviour that spans more than one subsystem.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Network harness shared by every test module
//! │
//! └── integration/
//!     ├── scenarios.rs  # Mimir, discovery and requeue walkthroughs
//!     ├── flows.rs      # Inbound → schedule → outbound choreography
//!     ├── properties.rs # Randomised invariants (quorum, discovery, voters)
//!     └── runtime.rs    # Block sources driving the node runtime
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p qb-tests
//!
//! # By category
//! cargo test -p qb-tests integration::scenarios::
//! cargo test -p qb-tests integration::properties::
//!
//! # Benchmarks
//! cargo bench -p qb-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
