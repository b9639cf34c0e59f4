//! Domain layer: the markup tree model
//!
//! This layer is independent of external concerns (no I/O, no config loading).

pub mod arena;
pub mod audit;
pub mod builder;
pub mod error;
pub mod render;

pub use arena::{Attributes, Descendants, Document, Element, NodeId, DEFAULT_MAX_DEPTH};
pub use audit::TagDict;
pub use builder::{el, Content, ElementSpec};
pub use error::{TreeError, TreeResult};
