//! Text-preserving restructuring of mixed-content markup trees.
//!
//! Elements carry a `text` (content before the first child) and a `tail`
//! (content after the element, before its next sibling). Every editing
//! operation here changes nesting while keeping the document-order
//! concatenation of those strings intact, except where an operation is
//! defined to delete text (range deletion).
//!
//! ```
//! use marknest::domain::{el, Document};
//!
//! let mut doc = Document::new();
//! let root = doc
//!     .build_root(&el("body").child(el("p").text("a").child(el("br")).text("b")))
//!     .unwrap();
//! let p = doc.first_child(root).unwrap();
//! doc.fragment_nesting(p, "br").unwrap();
//! assert_eq!(doc.to_markup(root).unwrap(), "<body><p>a</p><br/><p>b</p></body>");
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod tree_traits;
pub mod util;

pub use application::{Piece, Selector, Transformer, WordTagger};
pub use config::Settings;
pub use domain::{el, Document, ElementSpec, NodeId, TreeError, TreeResult};
