//! On-page index structures.
//!
//! Currently the leaf level of the B+ tree index: the fixed-capacity page
//! that stores sorted key to row-locator pairs and the structural operations
//! a tree driver needs to grow, shrink and rebalance it.

/// B+ tree leaf pages.
///
/// Byte layout, search and structural mutation of leaf pages.
pub mod btree;
