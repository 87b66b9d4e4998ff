//! Leaf page layer of an on-disk B+ tree index.
//!
//! Pages are plain byte buffers supplied by the caller; this crate owns their
//! layout and keeps each page sorted, within capacity and linked to its right
//! sibling across insert, delete, split, merge and redistribution.

#![warn(missing_docs)]

pub mod logging;
pub mod primitives;
pub mod storage;
pub mod types;
