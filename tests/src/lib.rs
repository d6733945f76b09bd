//! # Post-Tree Test Suite
//!
//! Unified test crate for flows that need more than one node.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Node fixtures, tracing setup
//! └── integration/
//!     ├── two_node.rs   # Mining on one node, merging on another
//!     └── adversarial.rs# Tampered, foreign and degenerate chains
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p pt-tests
//!
//! # With logs
//! RUST_LOG=pt_tree_consensus=debug cargo test -p pt-tests -- --nocapture
//!
//! # Benchmarks
//! cargo bench -p pt-tests
//! ```

pub mod integration;
pub mod support;
