use std::cmp::Ordering;

use crate::primitives::bytes::ord;

/// Total order over encoded keys of one index.
///
/// The leaf page never interprets key bytes itself; every ordering decision
/// goes through the comparator supplied by the caller. The same comparator
/// must be used for every call against pages of one index.
pub trait KeyComparator {
    /// Compare two encoded keys of equal length.
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering;
}

/// Any `Fn(&[u8], &[u8]) -> Ordering` closure is a comparator.
impl<F> KeyComparator for F
where
    F: Fn(&[u8], &[u8]) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        self(a, b)
    }
}

/// Lexicographic byte order.
///
/// Correct for keys built with the encoders in
/// [`crate::primitives::bytes::ord`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Bytewise;

impl KeyComparator for Bytewise {
    #[inline]
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}

/// Unsigned 8-byte big-endian keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct U64Key;

impl KeyComparator for U64Key {
    #[inline]
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        ord::get_u64_be(a).cmp(&ord::get_u64_be(b))
    }
}

/// Signed 8-byte keys written with [`ord::put_i64_be`].
#[derive(Clone, Copy, Debug, Default)]
pub struct I64Key;

impl KeyComparator for I64Key {
    #[inline]
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        ord::get_i64_be(a).cmp(&ord::get_i64_be(b))
    }
}
