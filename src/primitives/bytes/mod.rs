#![forbid(unsafe_code)]
//! Fixed-width field access and order-preserving key encoders.

pub mod be {
    //! Big-endian integer fields at fixed offsets inside a page buffer.

    use core::convert::TryInto;

    /// Reads a big-endian `u16` at `offset`.
    #[inline]
    pub fn read_u16(buf: &[u8], offset: usize) -> u16 {
        u16::from_be_bytes(buf[offset..offset + 2].try_into().unwrap())
    }

    /// Writes `value` as a big-endian `u16` at `offset`.
    #[inline]
    pub fn write_u16(buf: &mut [u8], offset: usize, value: u16) {
        buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
    }

    /// Reads a big-endian `u64` at `offset`.
    #[inline]
    pub fn read_u64(buf: &[u8], offset: usize) -> u64 {
        u64::from_be_bytes(buf[offset..offset + 8].try_into().unwrap())
    }

    /// Writes `value` as a big-endian `u64` at `offset`.
    #[inline]
    pub fn write_u64(buf: &mut [u8], offset: usize, value: u64) {
        buf[offset..offset + 8].copy_from_slice(&value.to_be_bytes());
    }
}

pub mod ord {
    //! Order-preserving encoders for fixed-width numeric keys.
    //!
    //! Keys produced here compare correctly with a plain bytewise comparison.

    use core::convert::TryInto;

    const U32_LEN: usize = core::mem::size_of::<u32>();
    const U64_LEN: usize = core::mem::size_of::<u64>();
    const SIGN_BIT: u64 = 1 << 63;

    /// Big-endian encoding for lexicographic order preservation.
    pub fn put_u32_be(dst: &mut [u8], v: u32) {
        assert!(dst.len() >= U32_LEN, "destination too small");
        dst[..U32_LEN].copy_from_slice(&v.to_be_bytes());
    }

    /// Decodes a u32 from big-endian byte order.
    pub fn get_u32_be(src: &[u8]) -> u32 {
        let head = src
            .get(..U32_LEN)
            .unwrap_or_else(|| panic!("u32 source shorter than 4 bytes (have {})", src.len()));
        u32::from_be_bytes(head.try_into().unwrap())
    }

    /// Big-endian encoding for lexicographic order preservation.
    pub fn put_u64_be(dst: &mut [u8], v: u64) {
        assert!(dst.len() >= U64_LEN, "destination too small");
        dst[..U64_LEN].copy_from_slice(&v.to_be_bytes());
    }

    /// Decodes a u64 from big-endian byte order.
    pub fn get_u64_be(src: &[u8]) -> u64 {
        let head = src
            .get(..U64_LEN)
            .unwrap_or_else(|| panic!("u64 source shorter than 8 bytes (have {})", src.len()));
        u64::from_be_bytes(head.try_into().unwrap())
    }

    /// Encodes a signed i64 with order preservation (flip sign bit for sorting).
    pub fn put_i64_be(dst: &mut [u8], v: i64) {
        let flipped = (v as u64) ^ SIGN_BIT;
        put_u64_be(dst, flipped);
    }

    /// Decodes a signed i64 with order preservation.
    pub fn get_i64_be(src: &[u8]) -> i64 {
        let flipped = get_u64_be(src);
        (flipped ^ SIGN_BIT) as i64
    }

    /// Returns the 4-byte order-preserving key for `v`.
    pub fn u32_key(v: u32) -> [u8; U32_LEN] {
        v.to_be_bytes()
    }

    /// Returns the 8-byte order-preserving key for `v`.
    pub fn u64_key(v: u64) -> [u8; U64_LEN] {
        v.to_be_bytes()
    }

    /// Returns the 8-byte order-preserving key for `v`.
    pub fn i64_key(v: i64) -> [u8; U64_LEN] {
        let mut out = [0u8; U64_LEN];
        put_i64_be(&mut out, v);
        out
    }
}
