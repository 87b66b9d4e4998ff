#![allow(missing_docs)]

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use leafpage::primitives::bytes::ord;
use leafpage::storage::btree::{KeyComparator, LeafOptions, LeafPage, U64Key};
use leafpage::types::{PageError, PageId, Result, RowId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Minimal single-level driver: one linked chain of leaves, no internal pages.
struct LeafChain {
    opts: LeafOptions,
    frames: HashMap<PageId, Vec<u8>>,
    head: PageId,
    next_id: u64,
}

impl LeafChain {
    fn new(opts: LeafOptions) -> Result<Self> {
        let head = PageId(1);
        let page = opts.new_page(head, None)?;
        let mut frames = HashMap::new();
        frames.insert(head, page.into_inner());
        Ok(Self {
            opts,
            frames,
            head,
            next_id: 2,
        })
    }

    fn min_size(&self) -> usize {
        self.opts.effective_max_size() / 2
    }

    fn page(&self, id: PageId) -> Result<LeafPage<&[u8]>> {
        let frame = self
            .frames
            .get(&id)
            .ok_or(PageError::Corruption("dangling next link"))?;
        LeafPage::open(frame.as_slice())
    }

    fn take(&mut self, id: PageId) -> Result<LeafPage<Vec<u8>>> {
        let frame = self
            .frames
            .remove(&id)
            .ok_or(PageError::Corruption("missing frame"))?;
        LeafPage::open(frame)
    }

    fn put(&mut self, page: LeafPage<Vec<u8>>) {
        self.frames.insert(page.page_id(), page.into_inner());
    }

    fn page_ids(&self) -> Result<Vec<PageId>> {
        let mut ids = vec![self.head];
        let mut cursor = self.page(self.head)?.next_page_id();
        while let Some(id) = cursor {
            ids.push(id);
            cursor = self.page(id)?.next_page_id();
        }
        Ok(ids)
    }

    /// Last leaf whose first key is `<= key`, or the head.
    fn find(&self, key: &[u8]) -> Result<PageId> {
        let mut target = self.head;
        let mut cursor = self.page(self.head)?.next_page_id();
        while let Some(id) = cursor {
            let page = self.page(id)?;
            match page.key_at(0) {
                Some(first) if U64Key.compare(first, key) != Ordering::Greater => target = id,
                _ => break,
            }
            cursor = page.next_page_id();
        }
        Ok(target)
    }

    fn get(&self, key: u64) -> Result<Option<RowId>> {
        let k = ord::u64_key(key);
        self.page(self.find(&k)?)?.try_lookup(&k, &U64Key)
    }

    fn upsert(&mut self, key: u64, value: RowId) -> Result<()> {
        let k = ord::u64_key(key);
        let id = self.find(&k)?;
        let mut page = self.take(id)?;
        page.try_remove(&k, &U64Key)?;
        if page.is_full() {
            let right_id = PageId(self.next_id);
            self.next_id += 1;
            let mut right = self.opts.new_page(right_id, page.parent_page_id())?;
            page.try_move_half_to(&mut right)?;
            right.set_next_page_id(page.next_page_id());
            page.set_next_page_id(Some(right_id));
            let goes_right = right
                .key_at(0)
                .is_some_and(|first| U64Key.compare(&k, first) != Ordering::Less);
            if goes_right {
                right.try_insert(&k, value, &U64Key)?;
            } else {
                page.try_insert(&k, value, &U64Key)?;
            }
            self.put(right);
        } else {
            page.try_insert(&k, value, &U64Key)?;
        }
        self.put(page);
        Ok(())
    }

    fn delete(&mut self, key: u64) -> Result<bool> {
        let k = ord::u64_key(key);
        let id = self.find(&k)?;
        let mut page = self.take(id)?;
        let before = page.size();
        let after = page.try_remove(&k, &U64Key)?;
        self.put(page);
        if after < self.min_size() {
            self.rebalance(id)?;
        }
        Ok(after < before)
    }

    fn rebalance(&mut self, id: PageId) -> Result<()> {
        let ids = self.page_ids()?;
        if ids.len() == 1 {
            return Ok(());
        }
        let pos = ids
            .iter()
            .position(|p| *p == id)
            .ok_or(PageError::Corruption("page not in chain"))?;
        let (left_id, right_id) = if pos > 0 {
            (ids[pos - 1], id)
        } else {
            (id, ids[1])
        };
        let mut left = self.take(left_id)?;
        let mut right = self.take(right_id)?;
        if left.size() + right.size() <= left.max_size() {
            right.try_move_all_to(&mut left, &U64Key)?;
            self.put(left);
        } else {
            if id == left_id {
                right.try_move_first_to_end_of(&mut left, &U64Key)?;
            } else {
                left.try_move_last_to_front_of(&mut right, &U64Key)?;
            }
            self.put(left);
            self.put(right);
        }
        Ok(())
    }

    fn check(&self, reference: &BTreeMap<u64, RowId>) -> Result<()> {
        let ids = self.page_ids()?;
        assert_eq!(ids.len(), self.frames.len(), "every frame is on the chain");
        let mut seen = Vec::with_capacity(reference.len());
        for id in &ids {
            let page = self.page(*id)?;
            assert!(page.size() <= page.max_size(), "page {id} over capacity");
            if ids.len() > 1 {
                assert!(!page.is_empty(), "page {id} left empty on a multi-page chain");
            }
            seen.extend(page.iter().map(|(k, v)| (ord::get_u64_be(k), v)));
        }
        let expected: Vec<(u64, RowId)> = reference.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(seen, expected, "chain traversal matches reference order");
        Ok(())
    }
}

fn small_pages() -> LeafOptions {
    LeafOptions::from_toml_str(
        r#"
        [leaf]
        page_size = 512
        key_size = 8
        max_size = 4
        "#,
    )
    .expect("valid options")
}

fn row(key: u64, version: u32) -> RowId {
    RowId::new(PageId(key + 1), version)
}

#[test]
fn sequential_inserts_grow_a_linked_chain() -> Result<()> {
    let mut chain = LeafChain::new(small_pages())?;
    let mut reference = BTreeMap::new();
    for key in 0..64u64 {
        chain.upsert(key, row(key, 0))?;
        reference.insert(key, row(key, 0));
    }
    chain.check(&reference)?;
    assert!(chain.page_ids()?.len() >= 16);
    for key in 0..64u64 {
        assert_eq!(chain.get(key)?, Some(row(key, 0)));
    }
    assert_eq!(chain.get(1_000)?, None);
    Ok(())
}

#[test]
fn reverse_inserts_then_full_delete_collapse_to_head() -> Result<()> {
    let mut chain = LeafChain::new(small_pages())?;
    let mut reference = BTreeMap::new();
    for key in (0..40u64).rev() {
        chain.upsert(key, row(key, 1))?;
        reference.insert(key, row(key, 1));
    }
    chain.check(&reference)?;
    for key in 0..40u64 {
        assert!(chain.delete(key)?);
        reference.remove(&key);
        chain.check(&reference)?;
    }
    assert_eq!(chain.page_ids()?, vec![PageId(1)]);
    assert!(chain.page(PageId(1))?.is_empty());
    assert!(!chain.delete(7)?);
    Ok(())
}

#[test]
fn upsert_replaces_existing_value() -> Result<()> {
    let mut chain = LeafChain::new(small_pages())?;
    for key in 0..10u64 {
        chain.upsert(key, row(key, 0))?;
    }
    chain.upsert(4, row(4, 9))?;
    assert_eq!(chain.get(4)?, Some(row(4, 9)));
    let total: usize = chain
        .page_ids()?
        .iter()
        .map(|id| chain.page(*id).map(|p| p.size()))
        .sum::<Result<usize>>()?;
    assert_eq!(total, 10);
    Ok(())
}

#[test]
fn random_workload_matches_reference() -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(0x00C0_FFEE);
    let mut chain = LeafChain::new(small_pages())?;
    let mut reference = BTreeMap::new();
    for step in 0..3_000u32 {
        let key = rng.gen_range(0..256u64);
        if rng.gen_bool(0.55) {
            chain.upsert(key, row(key, step))?;
            reference.insert(key, row(key, step));
        } else {
            let removed = chain.delete(key)?;
            assert_eq!(removed, reference.remove(&key).is_some(), "delete of {key}");
        }
        if step % 100 == 0 {
            chain.check(&reference)?;
        }
    }
    chain.check(&reference)?;
    for key in 0..256u64 {
        assert_eq!(chain.get(key)?, reference.get(&key).copied());
    }
    Ok(())
}

#[test]
fn default_sized_pages_hold_many_keys_before_splitting() -> Result<()> {
    let opts = LeafOptions::default();
    let capacity = opts.effective_max_size();
    let mut chain = LeafChain::new(opts)?;
    let mut reference = BTreeMap::new();
    for key in 0..capacity as u64 {
        chain.upsert(key, row(key, 0))?;
        reference.insert(key, row(key, 0));
    }
    assert_eq!(chain.page_ids()?.len(), 1);
    chain.upsert(capacity as u64, row(capacity as u64, 0))?;
    reference.insert(capacity as u64, row(capacity as u64, 0));
    assert_eq!(chain.page_ids()?.len(), 2);
    chain.check(&reference)
}
