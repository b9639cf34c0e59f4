//! Application layer: text-preserving editing operations
//!
//! Every operation is an inherent method on [`Document`](crate::domain::Document)
//! taking explicit node handles and mutating the tree in place.

pub mod nesting;
pub mod range;
pub mod removal;
pub mod selector;
pub mod transformer;
pub mod words;
pub mod wrap;

pub use selector::{Axis, NameTest, Selector};
pub use transformer::{Matcher, Piece, Transformer};
pub use words::WordTagger;
