//! In-memory peer registry

use crate::domain::PeerId;
use crate::ports::PeerRegistry;
use parking_lot::RwLock;
use std::collections::BTreeSet;

/// Set of known peers behind a lock
#[derive(Debug, Default)]
pub struct InMemoryPeerRegistry {
    peers: RwLock<BTreeSet<PeerId>>,
}

impl InMemoryPeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with `peers`
    pub fn with_peers(peers: impl IntoIterator<Item = PeerId>) -> Self {
        Self {
            peers: RwLock::new(peers.into_iter().collect()),
        }
    }
}

impl PeerRegistry for InMemoryPeerRegistry {
    fn add(&self, peer: PeerId) -> bool {
        self.peers.write().insert(peer)
    }

    fn list(&self) -> Vec<PeerId> {
        self.peers.read().iter().cloned().collect()
    }

    fn remove(&self, peer: &PeerId) -> bool {
        self.peers.write().remove(peer)
    }

    fn contains(&self, peer: &PeerId) -> bool {
        self.peers.read().contains(peer)
    }
}
