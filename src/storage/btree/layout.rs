//! Byte layout of a leaf page.
//!
//! ```text
//! 0        1       2      4          6          8         16          24        32
//! +--------+-------+------+----------+----------+---------+-----------+---------+----------
//! | kind   | flags | size | key_size | max_size | page_id | parent_id | next_id | pairs...
//! +--------+-------+------+----------+----------+---------+-----------+---------+----------
//! ```
//!
//! All integers are big-endian. Pairs follow the header back to back, each
//! `key_size` key bytes followed by an encoded [`RowId`].

use std::ops::Range;

use crate::types::RowId;

/// Number of bytes used by the leaf page header.
pub const LEAF_HEADER_LEN: usize = 32;

pub(crate) const KIND_OFFSET: usize = 0;
pub(crate) const FLAGS_OFFSET: usize = 1;
pub(crate) const SIZE_OFFSET: usize = 2;
pub(crate) const KEY_SIZE_OFFSET: usize = 4;
pub(crate) const MAX_SIZE_OFFSET: usize = 6;
pub(crate) const PAGE_ID_OFFSET: usize = 8;
pub(crate) const PARENT_OFFSET: usize = 16;
pub(crate) const NEXT_OFFSET: usize = 24;

/// Offset of the first pair.
pub const PAIRS_OFFSET: usize = LEAF_HEADER_LEN;

/// Width of the value half of a pair.
pub const VALUE_LEN: usize = RowId::ENCODED_LEN;

/// Offset arithmetic for one key size.
///
/// Every reader and writer of pair bytes goes through this type so the
/// formula lives in one place.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LeafLayout {
    key_size: usize,
}

impl LeafLayout {
    /// Layout for keys of `key_size` bytes.
    pub const fn new(key_size: usize) -> Self {
        Self { key_size }
    }

    /// Key width in bytes.
    #[inline]
    pub const fn key_size(&self) -> usize {
        self.key_size
    }

    /// Width of one `(key, value)` pair.
    #[inline]
    pub const fn pair_size(&self) -> usize {
        self.key_size + VALUE_LEN
    }

    /// Byte offset of pair `index`.
    #[inline]
    pub const fn pair_offset(&self, index: usize) -> usize {
        PAIRS_OFFSET + index * self.pair_size()
    }

    /// Bytes covered by pairs `[start, end)`.
    #[inline]
    pub const fn pairs_range(&self, start: usize, end: usize) -> Range<usize> {
        self.pair_offset(start)..self.pair_offset(end)
    }

    /// Bytes holding the key of pair `index`.
    #[inline]
    pub const fn key_range(&self, index: usize) -> Range<usize> {
        let start = self.pair_offset(index);
        start..start + self.key_size
    }

    /// Bytes holding the value of pair `index`.
    #[inline]
    pub const fn value_range(&self, index: usize) -> Range<usize> {
        let start = self.pair_offset(index) + self.key_size;
        start..start + VALUE_LEN
    }

    /// Bytes needed for a page holding `pairs` pairs.
    #[inline]
    pub const fn page_bytes_for(&self, pairs: usize) -> usize {
        self.pair_offset(pairs)
    }

    /// Maximum number of pairs a `page_size`-byte buffer can hold.
    pub const fn capacity(&self, page_size: usize) -> usize {
        if page_size <= LEAF_HEADER_LEN {
            return 0;
        }
        (page_size - LEAF_HEADER_LEN) / self.pair_size()
    }
}
