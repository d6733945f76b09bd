//! Events layer
//!
//! Events describe what happened at the serialization point. Rejections
//! carry the offending peer so an embedding network layer can act on them.

mod published;

pub use published::*;
