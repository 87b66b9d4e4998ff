//! Validated variants of the leaf page operations.
//!
//! Every `try_*` method checks its precondition first and returns a
//! [`PageError`] without touching either page when the check fails.

use std::cmp::Ordering;

use crate::storage::btree::comparator::KeyComparator;
use crate::storage::btree::leaf::LeafPage;
use crate::types::{PageError, Result, RowId};

impl<B: AsRef<[u8]>> LeafPage<B> {
    /// [`LeafPage::lookup`] that rejects keys of the wrong width.
    pub fn try_lookup<C: KeyComparator + ?Sized>(
        &self,
        key: &[u8],
        cmp: &C,
    ) -> Result<Option<RowId>> {
        self.check_key_len(key)?;
        Ok(self.lookup(key, cmp))
    }

    fn check_key_len(&self, key: &[u8]) -> Result<()> {
        if key.len() != self.key_size() {
            return reject(PageError::Invalid("key length does not match page key size"));
        }
        Ok(())
    }

    fn check_same_layout<R: AsRef<[u8]>>(&self, other: &LeafPage<R>) -> Result<()> {
        if self.layout() != other.layout() {
            return reject(PageError::LayoutMismatch {
                expected: self.key_size(),
                actual: other.key_size(),
            });
        }
        Ok(())
    }

    /// `right` must be the page `left` links to.
    fn check_adjacent<L, R>(left: &LeafPage<L>, right: &LeafPage<R>) -> Result<()>
    where
        L: AsRef<[u8]>,
        R: AsRef<[u8]>,
    {
        if left.next_page_id() != Some(right.page_id()) {
            return reject(PageError::OutOfOrder("pages are not adjacent siblings"));
        }
        Ok(())
    }

    fn check_room<R: AsRef<[u8]>>(recipient: &LeafPage<R>, incoming: usize) -> Result<()> {
        let size = recipient.size();
        if size + incoming > recipient.max_size() {
            return reject(PageError::Overflow {
                size,
                incoming,
                max_size: recipient.max_size(),
            });
        }
        Ok(())
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> LeafPage<B> {
    /// [`LeafPage::insert`] that refuses to overflow the page or store a
    /// duplicate key.
    pub fn try_insert<C: KeyComparator + ?Sized>(
        &mut self,
        key: &[u8],
        value: RowId,
        cmp: &C,
    ) -> Result<usize> {
        self.check_key_len(key)?;
        Self::check_room(&*self, 1)?;
        if self.position_of(key, cmp).is_some() {
            return reject(PageError::DuplicateKey);
        }
        Ok(self.insert(key, value, cmp))
    }

    /// [`LeafPage::remove_and_delete_record`] that rejects keys of the wrong
    /// width. An absent key is still a no-op.
    pub fn try_remove<C: KeyComparator + ?Sized>(&mut self, key: &[u8], cmp: &C) -> Result<usize> {
        self.check_key_len(key)?;
        Ok(self.remove_and_delete_record(key, cmp))
    }

    /// [`LeafPage::move_half_to`] into a fresh, empty sibling of the same key size.
    pub fn try_move_half_to<R>(&mut self, recipient: &mut LeafPage<R>) -> Result<usize>
    where
        R: AsRef<[u8]> + AsMut<[u8]>,
    {
        self.check_same_layout(recipient)?;
        if !recipient.is_empty() {
            return reject(PageError::Invalid("split recipient must be empty"));
        }
        Self::check_room(recipient, self.size() / 2)?;
        Ok(self.move_half_to(recipient))
    }

    /// [`LeafPage::move_all_to`] into the left sibling.
    ///
    /// Requires `recipient` to link to this page, the combined pairs to fit
    /// and every recipient key to sort before every key on this page.
    pub fn try_move_all_to<R, C>(&mut self, recipient: &mut LeafPage<R>, cmp: &C) -> Result<usize>
    where
        R: AsRef<[u8]> + AsMut<[u8]>,
        C: KeyComparator + ?Sized,
    {
        self.check_same_layout(recipient)?;
        Self::check_adjacent(recipient, &*self)?;
        Self::check_room(recipient, self.size())?;
        if let (Some(last), Some(first)) = (recipient.last_key(), self.key_at(0)) {
            if cmp.compare(last, first) != Ordering::Less {
                return reject(PageError::OutOfOrder(
                    "merge recipient keys must precede source keys",
                ));
            }
        }
        Ok(self.move_all_to(recipient))
    }

    /// [`LeafPage::move_first_to_end_of`] into the left sibling, which must
    /// link to this page.
    pub fn try_move_first_to_end_of<R, C>(
        &mut self,
        recipient: &mut LeafPage<R>,
        cmp: &C,
    ) -> Result<RowId>
    where
        R: AsRef<[u8]> + AsMut<[u8]>,
        C: KeyComparator + ?Sized,
    {
        self.check_same_layout(recipient)?;
        Self::check_adjacent(recipient, &*self)?;
        let first = match self.key_at(0) {
            Some(key) => key,
            None => return reject(PageError::Underflow("source leaf is empty")),
        };
        Self::check_room(recipient, 1)?;
        if let Some(last) = recipient.last_key() {
            if cmp.compare(last, first) != Ordering::Less {
                return reject(PageError::OutOfOrder(
                    "left sibling keys must precede the moved key",
                ));
            }
        }
        Ok(self.move_first_to_end_of(recipient))
    }

    /// [`LeafPage::move_last_to_front_of`] into the right sibling this page
    /// links to.
    pub fn try_move_last_to_front_of<R, C>(
        &mut self,
        recipient: &mut LeafPage<R>,
        cmp: &C,
    ) -> Result<RowId>
    where
        R: AsRef<[u8]> + AsMut<[u8]>,
        C: KeyComparator + ?Sized,
    {
        self.check_same_layout(recipient)?;
        Self::check_adjacent(&*self, recipient)?;
        let last = match self.last_key() {
            Some(key) => key,
            None => return reject(PageError::Underflow("source leaf is empty")),
        };
        Self::check_room(recipient, 1)?;
        if let Some(first) = recipient.key_at(0) {
            if cmp.compare(last, first) != Ordering::Less {
                return reject(PageError::OutOfOrder(
                    "moved key must precede right sibling keys",
                ));
            }
        }
        Ok(self.move_last_to_front_of(recipient))
    }
}

impl<B: AsRef<[u8]>> LeafPage<B> {
    fn last_key(&self) -> Option<&[u8]> {
        self.size().checked_sub(1).and_then(|idx| self.key_at(idx))
    }
}

fn reject<T>(err: PageError) -> Result<T> {
    tracing::debug!(target: "leafpage::checked", error = %err, "rejected leaf operation");
    Err(err)
}
