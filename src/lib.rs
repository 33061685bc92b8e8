//! RustyQuery - Selection chains over an arena document tree
//!
//! Layers:
//! - dom: arena tree addressed by `NodeId`, built with `DocumentBuilder`
//! - selector: CSS selector compiler plus an LRU cache of compiled selectors
//! - query: `Selection` and its chainable traversals (find, parents,
//!   siblings, closest, ...), each remembering where it came from
//!
//! ```
//! use std::sync::Arc;
//! use rustyquery::{DocumentBuilder, Selection};
//!
//! let mut b = DocumentBuilder::new();
//! b.open("ul", &[("id", "menu")]);
//! b.leaf("li", &[("class", "a")]);
//! b.leaf("li", &[("class", "b")]);
//! let doc = Arc::new(b.finish());
//!
//! let root = Selection::from_document(doc);
//! let items = root.find("#menu > li").unwrap();
//! assert_eq!(items.len(), 2);
//! assert_eq!(items.next_all().len(), 1);
//! assert!(items.parent().end().ptr_eq(&items));
//! ```

pub mod dom;
pub mod error;
pub mod query;
pub mod selector;

pub use dom::{Document, DocumentAccess, DocumentBuilder, NodeId, NodeKind, DOCUMENT_NODE};
pub use error::{CompileError, Result};
pub use query::{Matcher, Selection};
pub use selector::{PredicateCache, Selector, DEFAULT_CACHE_CAPACITY};

/// Resize the process-wide selector cache, evicting least recently used
/// entries as needed. Negative values are ignored.
pub fn set_predicate_cache_capacity(capacity: isize) {
    PredicateCache::global().set_capacity(capacity);
}
