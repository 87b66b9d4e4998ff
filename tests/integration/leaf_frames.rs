#![allow(missing_docs)]

use std::fs;

use leafpage::primitives::bytes::ord;
use leafpage::storage::btree::{Bytewise, LeafOptions, LeafPage};
use leafpage::types::{PageError, PageId, Result, RowId};
use tempfile::tempdir;

const PAGE_SIZE: usize = 1024;
const FRAMES: usize = 4;

fn options() -> LeafOptions {
    LeafOptions {
        page_size: PAGE_SIZE,
        key_size: 16,
        max_size: None,
    }
}

fn key(n: u64) -> [u8; 16] {
    let mut out = [0u8; 16];
    ord::put_u64_be(&mut out[..8], n / 1_000);
    ord::put_u64_be(&mut out[8..], n % 1_000);
    out
}

#[test]
fn frames_in_a_shared_arena_split_and_reload() -> Result<()> {
    let opts = options();
    opts.validate().expect("valid options");
    let capacity = opts.effective_max_size();
    let mut arena = vec![0u8; PAGE_SIZE * FRAMES];

    {
        let mut frames = arena.chunks_mut(PAGE_SIZE);
        let first = frames.next().expect("frame 0");
        let second = frames.next().expect("frame 1");

        let mut left = opts.init_page(first, PageId(1), Some(PageId(10)))?;
        for n in 0..capacity as u64 {
            left.try_insert(&key(n * 7 % 1_999), RowId::new(PageId(100), n as u32), &Bytewise)?;
        }
        assert!(left.is_full());
        let err = left
            .try_insert(&key(5_000), RowId::new(PageId(100), 0), &Bytewise)
            .unwrap_err();
        assert!(matches!(err, PageError::Overflow { .. }));

        let mut right = opts.init_page(second, PageId(2), Some(PageId(10)))?;
        let moved = left.try_move_half_to(&mut right)?;
        assert_eq!(moved, capacity / 2);
        right.set_next_page_id(left.next_page_id());
        left.set_next_page_id(Some(right.page_id()));
    }

    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("leaves.bin");
    fs::write(&path, &arena).expect("write arena");
    let reloaded = fs::read(&path).expect("read arena");
    assert_eq!(reloaded.len(), PAGE_SIZE * FRAMES);

    let left = LeafPage::open(&reloaded[..PAGE_SIZE])?;
    let right = LeafPage::open(&reloaded[PAGE_SIZE..2 * PAGE_SIZE])?;
    assert_eq!(left.parent_page_id(), Some(PageId(10)));
    assert_eq!(left.next_page_id(), Some(PageId(2)));
    assert_eq!(right.next_page_id(), None);
    assert_eq!(left.size() + right.size(), capacity);

    let mut all: Vec<Vec<u8>> = left.iter().map(|(k, _)| k.to_vec()).collect();
    all.extend(right.iter().map(|(k, _)| k.to_vec()));
    assert!(all.windows(2).all(|w| w[0] < w[1]), "keys ascend across the link");

    let untouched = LeafPage::open(&reloaded[2 * PAGE_SIZE..3 * PAGE_SIZE]);
    assert!(matches!(untouched, Err(PageError::Corruption(_))));
    Ok(())
}

#[test]
fn reopened_frame_accepts_further_mutation() -> Result<()> {
    let opts = options();
    let mut frame = vec![0u8; PAGE_SIZE];
    {
        let mut page = opts.init_page(frame.as_mut_slice(), PageId(3), None)?;
        for n in [30u64, 10, 20] {
            page.try_insert(&key(n), RowId::new(PageId(n), 0), &Bytewise)?;
        }
    }
    let mut page = LeafPage::open(frame.as_mut_slice())?;
    page.try_remove(&key(20), &Bytewise)?;
    page.try_insert(&key(15), RowId::new(PageId(15), 1), &Bytewise)?;
    drop(page);

    let page = LeafPage::open(frame.as_slice())?;
    let values: Vec<RowId> = page.iter().map(|(_, v)| v).collect();
    assert_eq!(
        values,
        vec![
            RowId::new(PageId(10), 0),
            RowId::new(PageId(15), 1),
            RowId::new(PageId(30), 0),
        ]
    );
    assert_eq!(page.try_lookup(&key(20), &Bytewise)?, None);
    Ok(())
}
