//! Outbound ports (driven side - collaborators)

use crate::domain::{unix_millis, PeerId};
use crate::events::TreeEvent;
use async_trait::async_trait;

/// Sink for tree events
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one event
    async fn publish(&self, event: TreeEvent) -> Result<(), String>;
}

/// Registry of known peer nodes.
///
/// Discovery and transport are outside this crate; the engine only needs
/// somewhere to keep the set of nodes it knows.
pub trait PeerRegistry: Send + Sync {
    /// Insert a peer; false if it was already known
    fn add(&self, peer: PeerId) -> bool;

    /// Known peers, in a stable order
    fn list(&self) -> Vec<PeerId>;

    /// Remove a peer; false if it was unknown
    fn remove(&self, peer: &PeerId) -> bool;

    /// Whether `peer` is known
    fn contains(&self, peer: &PeerId) -> bool;
}

/// Time source for block timestamps
pub trait TimeSource: Send + Sync {
    /// Current unix time in milliseconds
    fn now_millis(&self) -> u64;
}

/// Default time source using system time
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_millis(&self) -> u64 {
        unix_millis()
    }
}
