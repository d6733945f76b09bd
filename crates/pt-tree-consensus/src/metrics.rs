//! # Tree Metrics
//!
//! Prometheus metrics for the tree-consensus engine.
//!
//! Enable with the `metrics` feature:
//! ```toml
//! pt-tree-consensus = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `tree_blocks_attached_total` - Counter of blocks attached (local or merged)
//! - `tree_chains_merged_total` - Counter of peer chains merged
//! - `tree_chains_rejected_total` - Counter of rejected chains (by kind)
//! - `tree_mining_iterations` - Histogram of nonces tried per successful search

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total blocks attached to the tree
    pub static ref BLOCKS_ATTACHED: IntCounter = register_int_counter!(
        "tree_blocks_attached_total",
        "Total number of blocks attached to the tree"
    )
    .expect("Failed to create BLOCKS_ATTACHED metric");

    /// Total peer chains merged
    pub static ref CHAINS_MERGED: IntCounter = register_int_counter!(
        "tree_chains_merged_total",
        "Total number of peer chains merged"
    )
    .expect("Failed to create CHAINS_MERGED metric");

    /// Total chains rejected, labeled by rejection kind
    pub static ref CHAINS_REJECTED: IntCounterVec = register_int_counter_vec!(
        "tree_chains_rejected_total",
        "Total number of candidate chains rejected",
        &["kind"]
    )
    .expect("Failed to create CHAINS_REJECTED metric");

    /// Nonces tried per successful proof-of-work search
    pub static ref MINING_ITERATIONS: Histogram = register_histogram!(
        "tree_mining_iterations",
        "Nonces tried per successful proof-of-work search",
        vec![1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7]
    )
    .expect("Failed to create MINING_ITERATIONS metric");
}

/// Record attached blocks
#[cfg(feature = "metrics")]
pub fn record_blocks_attached(count: usize) {
    BLOCKS_ATTACHED.inc_by(count as u64);
}

/// Record a merged chain
#[cfg(feature = "metrics")]
pub fn record_chain_merged() {
    CHAINS_MERGED.inc();
}

/// Record a rejected chain with its kind
#[cfg(feature = "metrics")]
pub fn record_chain_rejected(kind: &str) {
    CHAINS_REJECTED.with_label_values(&[kind]).inc();
}

/// Record a successful search
#[cfg(feature = "metrics")]
pub fn record_mining_iterations(iterations: u64) {
    MINING_ITERATIONS.observe(iterations as f64);
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_blocks_attached(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_chain_merged() {}

#[cfg(not(feature = "metrics"))]
pub fn record_chain_rejected(_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_mining_iterations(_iterations: u64) {}
