//! Hexagonal ports
//!
//! - [`inbound`]: the API this engine offers to the content and peer layers
//! - [`outbound`]: collaborators the engine is wired to

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
