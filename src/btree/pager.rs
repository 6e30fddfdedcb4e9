//! # Pager Implementation
//!
//! The pager is a grow-only arena of pages. It hands out stable `u32` refs
//! at allocation time and resolves them back to page handles; nothing else
//! in the crate ever holds a page by anything but its ref. Keeping the
//! surface this narrow is what lets an on-disk pager be substituted later
//! without touching the tree.
//!
//! The pager also owns the operation counters. They sit behind `Cell`s so
//! that read paths (get, scan) stay `&self`; the core is single-threaded,
//! so no atomics are involved.

use eyre::{ensure, Result};
use std::cell::Cell;

use crate::config::PAGE_CAPACITY;

use super::page::{Page, PageKind};

/// Search-path counters, accumulated across the tree's lifetime.
#[derive(Debug, Default)]
pub struct OpCounters {
    finds: Cell<u64>,
    comparisons: Cell<u64>,
}

impl OpCounters {
    pub(crate) fn record_find(&self) {
        self.finds.set(self.finds.get() + 1);
    }

    pub(crate) fn add_comparisons(&self, n: u64) {
        self.comparisons.set(self.comparisons.get() + n);
    }

    pub fn finds(&self) -> u64 {
        self.finds.get()
    }

    pub fn comparisons(&self) -> u64 {
        self.comparisons.get()
    }
}

/// Point-in-time snapshot of tree statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeStats {
    /// Top-down searches run so far.
    pub finds: u64,
    /// Key comparisons spent in intra-page binary searches.
    pub comparisons: u64,
    /// Occupied record positions over total positions, across all pages.
    pub fill_rate: f64,
    pub num_leaf_pages: usize,
    pub num_internal_pages: usize,
}

#[derive(Debug, Default)]
pub struct Pager {
    pages: Vec<Page>,
    counters: OpCounters,
}

impl Pager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh empty page and returns its stable ref.
    pub fn allocate(&mut self, kind: PageKind) -> (u32, &mut Page) {
        let page_ref = self.pages.len() as u32;
        self.pages.push(Page::new(kind));
        (page_ref, &mut self.pages[page_ref as usize])
    }

    /// Resolves a previously allocated ref. Unknown refs are a caller bug
    /// and panic via the index.
    pub fn page(&self, page_ref: u32) -> &Page {
        &self.pages[page_ref as usize]
    }

    pub fn page_mut(&mut self, page_ref: u32) -> &mut Page {
        &mut self.pages[page_ref as usize]
    }

    /// Mutable handles to two distinct pages at once, as a split needs the
    /// source and its fresh sibling together.
    pub(crate) fn page_pair_mut(&mut self, a: u32, b: u32) -> Result<(&mut Page, &mut Page)> {
        ensure!(
            a < b,
            "page pair must be ordered and distinct: got {a} and {b}"
        );
        ensure!(
            (b as usize) < self.pages.len(),
            "page ref {b} out of bounds (page_count={})",
            self.pages.len()
        );
        let (lower, upper) = self.pages.split_at_mut(b as usize);
        Ok((&mut lower[a as usize], &mut upper[0]))
    }

    /// Advisory. The in-memory pager never reclaims pages; a persistent
    /// pager may use this to drop a page from its cache.
    pub fn release(&mut self, _page_ref: u32) {}

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    pub(crate) fn counters(&self) -> &OpCounters {
        &self.counters
    }

    pub fn stats(&self) -> TreeStats {
        let mut num_leaf_pages = 0;
        let mut num_internal_pages = 0;
        let mut occupied = 0;
        for page in &self.pages {
            if page.is_leaf() {
                num_leaf_pages += 1;
            } else {
                num_internal_pages += 1;
            }
            occupied += page.len();
        }

        let positions = self.pages.len() * PAGE_CAPACITY;
        TreeStats {
            finds: self.counters.finds(),
            comparisons: self.counters.comparisons(),
            fill_rate: if positions == 0 {
                0.0
            } else {
                occupied as f64 / positions as f64
            },
            num_leaf_pages,
            num_internal_pages,
        }
    }
}
