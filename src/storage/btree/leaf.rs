use std::cmp::Ordering;
use std::fmt;

use crate::primitives::bytes::be;
use crate::storage::btree::comparator::KeyComparator;
use crate::storage::btree::layout::{
    LeafLayout, FLAGS_OFFSET, KEY_SIZE_OFFSET, KIND_OFFSET, LEAF_HEADER_LEN, MAX_SIZE_OFFSET,
    NEXT_OFFSET, PAGE_ID_OFFSET, PARENT_OFFSET, SIZE_OFFSET,
};
use crate::types::page::PageKind;
use crate::types::{PageError, PageId, Result, RowId};

/// Sorted `(key, row locator)` pairs serialized into one page buffer.
///
/// The buffer may be owned (`Vec<u8>`, `Box<[u8]>`) or borrowed from a
/// buffer pool frame (`&[u8]` for readers, `&mut [u8]` for writers). The
/// header in the buffer is the source of truth; `key_size` and `max_size` are
/// also cached here because they never change after [`LeafPage::init`].
///
/// The structural operations in this impl trust their caller: they do not
/// check capacity, duplicate keys or sibling order. Slice indexing still
/// bounds-checks every access, so a violated precondition panics or leaves a
/// logically inconsistent page, never touches memory outside the buffer. Use
/// the `try_*` operations for validated variants.
pub struct LeafPage<B> {
    buf: B,
    layout: LeafLayout,
    max_size: usize,
}

impl<B: AsRef<[u8]>> LeafPage<B> {
    /// Reattaches to a buffer previously written by [`LeafPage::init`].
    pub fn open(buf: B) -> Result<Self> {
        let data = buf.as_ref();
        if data.len() < LEAF_HEADER_LEN {
            return Err(PageError::Corruption("page shorter than leaf header"));
        }
        match PageKind::try_from(data[KIND_OFFSET])? {
            PageKind::Leaf => {}
            PageKind::Internal => {
                return Err(PageError::Corruption("expected leaf page, found internal"))
            }
        }
        let key_size = be::read_u16(data, KEY_SIZE_OFFSET) as usize;
        let max_size = be::read_u16(data, MAX_SIZE_OFFSET) as usize;
        let size = be::read_u16(data, SIZE_OFFSET) as usize;
        if key_size == 0 {
            return Err(PageError::Corruption("leaf key size zero"));
        }
        if max_size == 0 {
            return Err(PageError::Corruption("leaf max size zero"));
        }
        if size > max_size {
            return Err(PageError::Corruption("leaf size exceeds max size"));
        }
        if be::read_u64(data, PAGE_ID_OFFSET) == PageId::NONE {
            return Err(PageError::Corruption("leaf page id is the reserved sentinel"));
        }
        let layout = LeafLayout::new(key_size);
        if layout.page_bytes_for(max_size) > data.len() {
            return Err(PageError::Corruption("leaf capacity exceeds page buffer"));
        }
        Ok(Self {
            buf,
            layout,
            max_size,
        })
    }

    #[inline]
    fn data(&self) -> &[u8] {
        self.buf.as_ref()
    }

    /// Kind tag from the header; always [`PageKind::Leaf`] once opened.
    pub fn page_kind(&self) -> PageKind {
        debug_assert_eq!(self.data()[KIND_OFFSET], PageKind::Leaf.as_u8());
        PageKind::Leaf
    }

    /// Identifier of this page.
    pub fn page_id(&self) -> PageId {
        PageId(be::read_u64(self.data(), PAGE_ID_OFFSET))
    }

    /// Owning internal page, or `None` for a root leaf.
    pub fn parent_page_id(&self) -> Option<PageId> {
        decode_link(be::read_u64(self.data(), PARENT_OFFSET))
    }

    /// Next leaf in key order, or `None` for the rightmost leaf.
    pub fn next_page_id(&self) -> Option<PageId> {
        decode_link(be::read_u64(self.data(), NEXT_OFFSET))
    }

    /// Number of live pairs.
    #[inline]
    pub fn size(&self) -> usize {
        be::read_u16(self.data(), SIZE_OFFSET) as usize
    }

    /// Maximum number of pairs before the page must split.
    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Width of one key in bytes.
    #[inline]
    pub fn key_size(&self) -> usize {
        self.layout.key_size()
    }

    /// Offset arithmetic for this page.
    pub fn layout(&self) -> LeafLayout {
        self.layout
    }

    /// Returns true if the page holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns true if another insert would exceed `max_size`.
    pub fn is_full(&self) -> bool {
        self.size() >= self.max_size
    }

    /// Key stored at `index`, if `index < size`.
    pub fn key_at(&self, index: usize) -> Option<&[u8]> {
        (index < self.size()).then(|| self.raw_key(index))
    }

    /// Row locator stored at `index`, if `index < size`.
    pub fn value_at(&self, index: usize) -> Option<RowId> {
        (index < self.size()).then(|| self.raw_value(index))
    }

    /// Pair stored at `index`, if `index < size`.
    pub fn item(&self, index: usize) -> Option<(&[u8], RowId)> {
        (index < self.size()).then(|| (self.raw_key(index), self.raw_value(index)))
    }

    /// Iterates the live pairs in key order.
    pub fn iter(&self) -> LeafIter<'_, B> {
        LeafIter {
            page: self,
            front: 0,
            back: self.size(),
        }
    }

    /// Smallest index `i` in `[0, size]` whose key is `>= key`.
    ///
    /// Binary search with `O(log size)` comparator calls. Among equal keys
    /// the leftmost position wins.
    pub fn key_index<C: KeyComparator + ?Sized>(&self, key: &[u8], cmp: &C) -> usize {
        let mut lo = 0usize;
        let mut hi = self.size();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if cmp.compare(self.raw_key(mid), key) == Ordering::Less {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Row locator stored under `key`, if present.
    pub fn lookup<C: KeyComparator + ?Sized>(&self, key: &[u8], cmp: &C) -> Option<RowId> {
        self.position_of(key, cmp).map(|index| self.raw_value(index))
    }

    /// Raw page bytes, header included.
    pub fn as_bytes(&self) -> &[u8] {
        self.data()
    }

    /// Releases the page buffer.
    pub fn into_inner(self) -> B {
        self.buf
    }

    pub(super) fn position_of<C: KeyComparator + ?Sized>(
        &self,
        key: &[u8],
        cmp: &C,
    ) -> Option<usize> {
        let index = self.key_index(key, cmp);
        (index < self.size() && cmp.compare(key, self.raw_key(index)) == Ordering::Equal)
            .then_some(index)
    }

    #[inline]
    pub(super) fn raw_key(&self, index: usize) -> &[u8] {
        &self.data()[self.layout.key_range(index)]
    }

    #[inline]
    pub(super) fn raw_value(&self, index: usize) -> RowId {
        RowId::decode(&self.data()[self.layout.value_range(index)])
    }

    #[inline]
    fn raw_pairs(&self, start: usize, end: usize) -> &[u8] {
        &self.data()[self.layout.pairs_range(start, end)]
    }
}

impl LeafPage<Vec<u8>> {
    /// Allocates a buffer sized exactly for `max_size` pairs and initializes it.
    pub fn alloc(
        page_id: PageId,
        parent: Option<PageId>,
        key_size: usize,
        max_size: usize,
    ) -> Result<Self> {
        let len = LeafLayout::new(key_size).page_bytes_for(max_size);
        Self::init(vec![0u8; len], page_id, parent, key_size, max_size)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> LeafPage<B> {
    /// Formats `buf` as an empty leaf page.
    ///
    /// Sets the leaf tag, `size = 0`, the identifiers, `key_size`, `max_size`
    /// and an empty next link. The whole buffer is zeroed first.
    pub fn init(
        mut buf: B,
        page_id: PageId,
        parent: Option<PageId>,
        key_size: usize,
        max_size: usize,
    ) -> Result<Self> {
        if !page_id.is_valid() {
            return Err(PageError::Invalid("page id zero is reserved"));
        }
        if parent.is_some_and(|p| !p.is_valid()) {
            return Err(PageError::Invalid("parent page id zero is reserved"));
        }
        if key_size == 0 || key_size > u16::MAX as usize {
            return Err(PageError::Invalid("key size must be in 1..=65535"));
        }
        if max_size == 0 || max_size > u16::MAX as usize {
            return Err(PageError::Invalid("max size must be in 1..=65535"));
        }
        let layout = LeafLayout::new(key_size);
        let data = buf.as_mut();
        if layout.page_bytes_for(max_size) > data.len() {
            return Err(PageError::Invalid("page buffer too small for max size"));
        }
        data.fill(0);
        data[KIND_OFFSET] = PageKind::Leaf.as_u8();
        data[FLAGS_OFFSET] = 0;
        be::write_u16(data, SIZE_OFFSET, 0);
        be::write_u16(data, KEY_SIZE_OFFSET, key_size as u16);
        be::write_u16(data, MAX_SIZE_OFFSET, max_size as u16);
        be::write_u64(data, PAGE_ID_OFFSET, page_id.0);
        be::write_u64(data, PARENT_OFFSET, encode_link(parent));
        be::write_u64(data, NEXT_OFFSET, PageId::NONE);
        Ok(Self {
            buf,
            layout,
            max_size,
        })
    }

    #[inline]
    fn data_mut(&mut self) -> &mut [u8] {
        self.buf.as_mut()
    }

    /// Re-parents the page after the driver moves it under another internal page.
    pub fn set_parent_page_id(&mut self, parent: Option<PageId>) {
        be::write_u64(self.data_mut(), PARENT_OFFSET, encode_link(parent));
    }

    /// Links this leaf to the next one in key order.
    pub fn set_next_page_id(&mut self, next: Option<PageId>) {
        be::write_u64(self.data_mut(), NEXT_OFFSET, encode_link(next));
    }

    fn set_size(&mut self, size: usize) {
        debug_assert!(size <= u16::MAX as usize, "leaf size overflows header field");
        be::write_u16(self.data_mut(), SIZE_OFFSET, size as u16);
    }

    fn write_pair(&mut self, index: usize, key: &[u8], value: RowId) {
        let layout = self.layout;
        let data = self.data_mut();
        data[layout.key_range(index)].copy_from_slice(key);
        value.encode(&mut data[layout.value_range(index)]);
    }

    /// Inserts `key -> value` at its ordered position and returns the new size.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not `key_size` bytes long or the buffer has no room
    /// for another pair. Capacity against `max_size` and duplicate keys are not
    /// checked; see [`LeafPage::try_insert`].
    pub fn insert<C: KeyComparator + ?Sized>(&mut self, key: &[u8], value: RowId, cmp: &C) -> usize {
        let index = self.key_index(key, cmp);
        let size = self.size();
        let layout = self.layout;
        self.data_mut()
            .copy_within(layout.pairs_range(index, size), layout.pair_offset(index + 1));
        self.write_pair(index, key, value);
        self.set_size(size + 1);
        size + 1
    }

    /// Removes the pair stored under `key` and returns the resulting size.
    ///
    /// An absent key leaves the page untouched, so repeated calls are harmless.
    pub fn remove_and_delete_record<C: KeyComparator + ?Sized>(
        &mut self,
        key: &[u8],
        cmp: &C,
    ) -> usize {
        let size = self.size();
        match self.position_of(key, cmp) {
            Some(index) => {
                self.remove_at(index);
                size - 1
            }
            None => size,
        }
    }

    fn remove_at(&mut self, index: usize) {
        let size = self.size();
        let layout = self.layout;
        self.data_mut()
            .copy_within(layout.pairs_range(index + 1, size), layout.pair_offset(index));
        self.set_size(size - 1);
    }

    /// Moves the upper `size / 2` pairs to the end of `recipient` and returns
    /// how many moved.
    ///
    /// This page keeps the lower half, including the middle pair when `size`
    /// is odd. The caller links `recipient` after this page and inserts the
    /// separator into the parent.
    pub fn move_half_to<R>(&mut self, recipient: &mut LeafPage<R>) -> usize
    where
        R: AsRef<[u8]> + AsMut<[u8]>,
    {
        let total = self.size();
        let move_count = total / 2;
        let keep = total - move_count;
        recipient.copy_n_from(self.raw_pairs(keep, total), move_count);
        self.set_size(keep);
        tracing::trace!(
            target: "leafpage::split",
            left = self.page_id().0,
            right = recipient.page_id().0,
            kept = keep,
            moved = move_count,
            "split leaf page"
        );
        move_count
    }

    /// Appends every pair to `recipient`, hands over the next link and empties
    /// this page. Returns the recipient's new size.
    ///
    /// `recipient` must be the left sibling. The caller detaches and frees
    /// this page afterwards.
    pub fn move_all_to<R>(&mut self, recipient: &mut LeafPage<R>) -> usize
    where
        R: AsRef<[u8]> + AsMut<[u8]>,
    {
        let size = self.size();
        recipient.copy_n_from(self.raw_pairs(0, size), size);
        recipient.set_next_page_id(self.next_page_id());
        self.set_size(0);
        tracing::trace!(
            target: "leafpage::merge",
            from = self.page_id().0,
            into = recipient.page_id().0,
            moved = size,
            "merged leaf page into left sibling"
        );
        recipient.size()
    }

    /// Moves this page's lowest pair to the end of `recipient` (the left
    /// sibling) and returns the moved row locator.
    ///
    /// # Panics
    ///
    /// Panics if this page is empty.
    pub fn move_first_to_end_of<R>(&mut self, recipient: &mut LeafPage<R>) -> RowId
    where
        R: AsRef<[u8]> + AsMut<[u8]>,
    {
        assert!(!self.is_empty(), "cannot redistribute from an empty leaf");
        let value = self.raw_value(0);
        recipient.copy_last_from(self.raw_key(0), value);
        self.remove_at(0);
        tracing::trace!(
            target: "leafpage::redistribute",
            from = self.page_id().0,
            to = recipient.page_id().0,
            direction = "left",
            "moved first pair to left sibling"
        );
        value
    }

    /// Moves this page's highest pair to the front of `recipient` (the right
    /// sibling) and returns the moved row locator.
    ///
    /// # Panics
    ///
    /// Panics if this page is empty.
    pub fn move_last_to_front_of<R>(&mut self, recipient: &mut LeafPage<R>) -> RowId
    where
        R: AsRef<[u8]> + AsMut<[u8]>,
    {
        assert!(!self.is_empty(), "cannot redistribute from an empty leaf");
        let last = self.size() - 1;
        let value = self.raw_value(last);
        recipient.copy_first_from(self.raw_key(last), value);
        self.set_size(last);
        tracing::trace!(
            target: "leafpage::redistribute",
            from = self.page_id().0,
            to = recipient.page_id().0,
            direction = "right",
            "moved last pair to right sibling"
        );
        value
    }

    /// Appends `count` encoded pairs from `src` after the current tail.
    fn copy_n_from(&mut self, src: &[u8], count: usize) {
        let size = self.size();
        let layout = self.layout;
        debug_assert_eq!(src.len(), count * layout.pair_size());
        self.data_mut()[layout.pairs_range(size, size + count)].copy_from_slice(src);
        self.set_size(size + count);
    }

    fn copy_last_from(&mut self, key: &[u8], value: RowId) {
        let size = self.size();
        self.write_pair(size, key, value);
        self.set_size(size + 1);
    }

    fn copy_first_from(&mut self, key: &[u8], value: RowId) {
        let size = self.size();
        let layout = self.layout;
        self.data_mut()
            .copy_within(layout.pairs_range(0, size), layout.pair_offset(1));
        self.write_pair(0, key, value);
        self.set_size(size + 1);
    }
}

impl<B: AsRef<[u8]>> fmt::Debug for LeafPage<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafPage")
            .field("page_id", &self.page_id())
            .field("parent", &self.parent_page_id())
            .field("next", &self.next_page_id())
            .field("size", &self.size())
            .field("max_size", &self.max_size)
            .field("key_size", &self.key_size())
            .finish()
    }
}

/// Iterator over the pairs of a [`LeafPage`] in key order.
pub struct LeafIter<'a, B> {
    page: &'a LeafPage<B>,
    front: usize,
    back: usize,
}

impl<'a, B: AsRef<[u8]>> Iterator for LeafIter<'a, B> {
    type Item = (&'a [u8], RowId);

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let index = self.front;
        self.front += 1;
        Some((self.page.raw_key(index), self.page.raw_value(index)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a, B: AsRef<[u8]>> DoubleEndedIterator for LeafIter<'a, B> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some((self.page.raw_key(self.back), self.page.raw_value(self.back)))
    }
}

impl<'a, B: AsRef<[u8]>> ExactSizeIterator for LeafIter<'a, B> {}

fn decode_link(raw: u64) -> Option<PageId> {
    if raw == PageId::NONE {
        None
    } else {
        Some(PageId(raw))
    }
}

fn encode_link(page: Option<PageId>) -> u64 {
    page.map(|p| p.0).unwrap_or(PageId::NONE)
}
