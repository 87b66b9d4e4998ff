//! Low-level primitives for building the leaf page layer.

/// Byte-level utilities and encoding/decoding.
///
/// Fixed-width header fields and order-preserving key encoders.
pub mod bytes;
