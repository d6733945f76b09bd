//! # Integration Tests
//!
//! Multi-node flows over the public service API. Each node owns its own
//! tree; chains travel between nodes as untrusted snapshots.

pub mod adversarial;
