//! # Page Implementation
//!
//! A page is a fixed-capacity, ordered run of key records, tagged as either
//! a leaf or an interior page, plus a sibling link to the next page at the
//! same level.
//!
//! ## Record Layout
//!
//! ```text
//! Leaf page:      [ (k0, slot0), (k1, slot1), ... ]     real records 0..len
//! Interior page:  [ (-, first), (k1, c1), (k2, c2) ]    position 0 is the
//!                                                       first child, no key
//! ```
//!
//! In an interior page, child `c_i` holds keys greater than or equal to
//! `k_i` and below `k_{i+1}`; the first child holds keys below `k_1`. Real
//! keys ascend strictly within any page.
//!
//! ## Search
//!
//! Binary search over the real positions, comparing full keys
//! lexicographically. A miss reports the insertion point, which is also how
//! the tree descends: position `insertion_point - 1` is the greatest record
//! whose key is smaller than the query, falling back to the first-child
//! record when the query is below every separator.
//!
//! ## Split
//!
//! The median split keeps the lower `PAGE_SPLIT_POINT` records and moves the
//! rest into a fresh sibling. A leaf split copies the first moved key as the
//! separator for the parent. An interior split consumes the first moved
//! record instead: its key is promoted as the separator and its target
//! becomes the new page's first child.

use crate::config::{PAGE_CAPACITY, PAGE_SPLIT_POINT};

use super::pager::OpCounters;

/// Immutable key bytes plus one `u32` target.
///
/// The target is a child page ref in interior pages and a value-arena slot
/// in leaves.
#[derive(Debug, Clone)]
pub struct KeyRecord {
    key: Box<[u8]>,
    target: u32,
}

impl KeyRecord {
    fn new(key: &[u8], target: u32) -> Self {
        Self {
            key: key.into(),
            target,
        }
    }

    /// The synthetic position-0 record of an interior page.
    fn first_child(target: u32) -> Self {
        Self {
            key: Box::default(),
            target,
        }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn target(&self) -> u32 {
        self.target
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Leaf,
    Interior,
}

/// Outcome of an intra-page search.
///
/// `NotFound` carries the insertion point: the index of the first real
/// record whose key is greater than the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchResult {
    Found(usize),
    NotFound(usize),
}

#[derive(Debug)]
pub struct Page {
    kind: PageKind,
    next_page: Option<u32>,
    records: Vec<KeyRecord>,
}

impl Page {
    pub(crate) fn new(kind: PageKind) -> Self {
        Self {
            kind,
            next_page: None,
            records: Vec::with_capacity(PAGE_CAPACITY),
        }
    }

    pub fn kind(&self) -> PageKind {
        self.kind
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == PageKind::Leaf
    }

    /// Sibling page at the same level, `None` at the right edge.
    pub fn next_page(&self) -> Option<u32> {
        self.next_page
    }

    pub(crate) fn set_next_page(&mut self, next: Option<u32>) {
        self.next_page = next;
    }

    /// Target of the first-child record of an interior page.
    pub fn first(&self) -> Option<u32> {
        debug_assert_eq!(self.kind, PageKind::Interior);
        self.records.first().map(KeyRecord::target)
    }

    pub(crate) fn set_first(&mut self, target: u32) {
        debug_assert_eq!(self.kind, PageKind::Interior);
        match self.records.first_mut() {
            Some(record) => record.target = target,
            None => self.records.push(KeyRecord::first_child(target)),
        }
    }

    /// Number of occupied positions, counting the first-child record of
    /// interior pages.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, index: usize) -> &KeyRecord {
        &self.records[index]
    }

    /// Index of the first real record position for this page kind.
    fn real_start(&self) -> usize {
        match self.kind {
            PageKind::Leaf => 0,
            PageKind::Interior => 1,
        }
    }

    /// Binary search over the real positions. Returns the outcome and the
    /// number of key comparisons performed.
    fn probe(&self, key: &[u8]) -> (SearchResult, u64) {
        let mut left = self.real_start();
        let mut right = self.records.len();
        let mut comparisons = 0u64;

        while left < right {
            let mid = left + (right - left) / 2;
            comparisons += 1;
            match key.cmp(&self.records[mid].key) {
                std::cmp::Ordering::Equal => return (SearchResult::Found(mid), comparisons),
                std::cmp::Ordering::Less => right = mid,
                std::cmp::Ordering::Greater => left = mid + 1,
            }
        }

        (SearchResult::NotFound(left), comparisons)
    }

    /// Looks up `key` among the real records.
    ///
    /// On a miss the insertion point is reported; the caller descends
    /// through the record just before it, which on an interior page is the
    /// first-child record whenever the key is below every separator.
    pub fn search(&self, key: &[u8], counters: &OpCounters) -> SearchResult {
        let (result, comparisons) = self.probe(key);
        counters.add_comparisons(comparisons);
        result
    }

    /// Places a record so that ordering is preserved, copying the key bytes.
    ///
    /// Returns false iff the page is at capacity. A duplicate key (which the
    /// tree never produces, since it searches first) replaces the record in
    /// place.
    pub(crate) fn insert(&mut self, key: &[u8], target: u32) -> bool {
        if self.records.len() >= PAGE_CAPACITY {
            return false;
        }

        match self.probe(key).0 {
            SearchResult::Found(pos) => self.records[pos] = KeyRecord::new(key, target),
            SearchResult::NotFound(pos) => self.records.insert(pos, KeyRecord::new(key, target)),
        }
        true
    }

    /// First real position whose key is greater than or equal to `key`.
    pub(crate) fn lower_bound(&self, key: &[u8]) -> usize {
        match self.probe(key).0 {
            SearchResult::Found(pos) => pos,
            SearchResult::NotFound(pos) => pos,
        }
    }

    /// Median split: the upper half of this full page moves into `other`,
    /// a fresh page of the same kind. Returns the separator key the parent
    /// must insert for `other`.
    pub(crate) fn split(&mut self, other: &mut Page) -> Box<[u8]> {
        debug_assert_eq!(self.kind, other.kind);
        debug_assert_eq!(self.records.len(), PAGE_CAPACITY);
        debug_assert!(other.records.is_empty());

        let mut upper = self.records.split_off(PAGE_SPLIT_POINT);
        match self.kind {
            PageKind::Leaf => {
                let split_key = upper[0].key.clone();
                other.records.extend(upper);
                split_key
            }
            PageKind::Interior => {
                // The promoted record is consumed: its key goes to the
                // parent, its target becomes the upper page's first child.
                let promoted = upper.remove(0);
                other.records.push(KeyRecord::first_child(promoted.target));
                other.records.extend(upper);
                promoted.key
            }
        }
    }

    /// Forward cursor positioned at the first real record with key greater
    /// than or equal to `start`. Yields until the page is exhausted; never
    /// crosses pages.
    pub fn scan_from(&self, start: &[u8]) -> PageCursor<'_> {
        PageCursor {
            page: self,
            pos: self.lower_bound(start),
        }
    }

    #[cfg(test)]
    pub(crate) fn records_mut(&mut self) -> &mut Vec<KeyRecord> {
        &mut self.records
    }
}

/// In-page iterator over `(key, target)` pairs.
pub struct PageCursor<'a> {
    page: &'a Page,
    pos: usize,
}

impl<'a> Iterator for PageCursor<'a> {
    type Item = (&'a [u8], u32);

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.page.records.get(self.pos)?;
        self.pos += 1;
        Some((record.key(), record.target()))
    }
}
