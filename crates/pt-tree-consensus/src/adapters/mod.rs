//! In-memory adapters for the outbound ports

pub mod event_publisher;
pub mod peer_registry;

pub use event_publisher::InMemoryEventPublisher;
pub use peer_registry::InMemoryPeerRegistry;
