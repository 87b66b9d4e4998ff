#![forbid(unsafe_code)]
//! Identifiers, row locators and the error type shared by the leaf page layer.

use std::fmt;

/// Identifier of a page in the index file.
///
/// `PageId(0)` is reserved as the "no page" sentinel in on-page link fields,
/// so a real page never carries id zero.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct PageId(pub u64);

impl PageId {
    /// Sentinel stored on-page for "no page".
    pub const NONE: u64 = 0;

    /// Returns true if this id may name a real page.
    pub const fn is_valid(self) -> bool {
        self.0 != Self::NONE
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical location of a table row, stored as the value half of a leaf pair.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct RowId {
    /// Heap page holding the row.
    pub page: PageId,
    /// Slot within the heap page.
    pub slot: u32,
}

impl RowId {
    /// Encoded width of a row locator (`page:u64 | slot:u32`, big-endian).
    pub const ENCODED_LEN: usize = 12;

    /// Creates a row locator.
    pub const fn new(page: PageId, slot: u32) -> Self {
        Self { page, slot }
    }

    /// Writes the locator into the first [`RowId::ENCODED_LEN`] bytes of `dst`.
    pub fn encode(&self, dst: &mut [u8]) {
        dst[0..8].copy_from_slice(&self.page.0.to_be_bytes());
        dst[8..12].copy_from_slice(&self.slot.to_be_bytes());
    }

    /// Reads a locator from the first [`RowId::ENCODED_LEN`] bytes of `src`.
    pub fn decode(src: &[u8]) -> Self {
        let page = u64::from_be_bytes(src[0..8].try_into().unwrap());
        let slot = u32::from_be_bytes(src[8..12].try_into().unwrap());
        Self {
            page: PageId(page),
            slot,
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.page.0, self.slot)
    }
}

/// Errors surfaced by the leaf page layer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// Page bytes failed header validation.
    #[error("corruption: {0}")]
    Corruption(&'static str),
    /// Caller supplied an argument the page cannot accept.
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
    /// The operation would push a page past its capacity.
    #[error("page overflow: {size} pairs + {incoming} incoming exceeds max {max_size}")]
    Overflow {
        /// Pairs currently on the receiving page.
        size: usize,
        /// Pairs the operation would add.
        incoming: usize,
        /// Capacity of the receiving page.
        max_size: usize,
    },
    /// The operation needs a pair the source page does not have.
    #[error("page underflow: {0}")]
    Underflow(&'static str),
    /// Insert of a key that is already stored on the page.
    #[error("duplicate key")]
    DuplicateKey,
    /// Sibling pages are not adjacent in key order.
    #[error("key order violated: {0}")]
    OutOfOrder(&'static str),
    /// Two pages with different key sizes were combined.
    #[error("key size mismatch: expected {expected}, found {actual}")]
    LayoutMismatch {
        /// Key size of the page performing the operation.
        expected: usize,
        /// Key size of the other page.
        actual: usize,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PageError>;

pub mod page {
    //! Page-level tags and sizing constants.

    use super::{PageError, Result};

    /// Default page size used when no configuration overrides it.
    pub const DEFAULT_PAGE_SIZE: usize = 8192;

    /// Smallest page size accepted by the configuration layer.
    pub const MIN_PAGE_SIZE: usize = 512;

    /// Kind tag stored in the first byte of every B+ tree page.
    #[repr(u8)]
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub enum PageKind {
        /// Leaf page holding key/row-locator pairs.
        Leaf = 1,
        /// Internal page holding separators and child pointers.
        Internal = 2,
    }

    impl PageKind {
        /// Raw tag value.
        pub const fn as_u8(self) -> u8 {
            self as u8
        }
    }

    impl TryFrom<u8> for PageKind {
        type Error = PageError;

        fn try_from(value: u8) -> Result<Self> {
            match value {
                1 => Ok(PageKind::Leaf),
                2 => Ok(PageKind::Internal),
                _ => Err(PageError::Corruption("unknown btree page kind")),
            }
        }
    }
}
