#![forbid(unsafe_code)]

//! Leaf pages of the B+ tree index.
//!
//! A [`LeafPage`] packs `key_size`-byte keys and [`RowId`](crate::types::RowId)
//! values into one page buffer and offers the operations a tree driver needs:
//! search, insert, delete, split, merge and single-pair redistribution. The
//! driver owns policy (when to split or merge, separator maintenance, page
//! allocation); the page only keeps itself sorted and linked.

/// Key ordering capability.
pub mod comparator;

/// Leaf page byte layout.
pub mod layout;
mod checked;
mod leaf;
mod options;

pub use comparator::{Bytewise, I64Key, KeyComparator, U64Key};
pub use layout::{LeafLayout, LEAF_HEADER_LEN};
pub use leaf::{LeafIter, LeafPage};
pub use options::{ConfigError, LeafOptions};
