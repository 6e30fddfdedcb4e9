//! # Tree Iterators
//!
//! Two forward-only, single-pass cursors over leaf records:
//!
//! - [`Scan`] seeks to a start key and yields every record from there to the
//!   end of the leaf list, crossing sibling leaves transparently. An empty
//!   start key yields the full scan.
//! - [`ScanPrefix`] is the same walk with a stop condition: it ends at the
//!   first key that does not start with the prefix, so it yields exactly the
//!   keys carrying the prefix.
//!
//! Both ride on the page-level cursor: each leaf is walked through
//! `Page::scan_from`, which never crosses pages. Crossing is the tree
//! iterator's job: pull from the current leaf's cursor; when it is
//! exhausted, follow the sibling link (done if there is none), start a
//! fresh cursor on the sibling, and pull once, reporting done if that pull
//! comes up empty.
//!
//! Both iterators borrow the tree shared, so the compiler rejects mutation
//! while one is alive.

use super::page::PageCursor;
use super::tree::BTree;

impl BTree {
    /// Forward cursor over `(key, value)` pairs with key greater than or
    /// equal to `start`, in ascending key order.
    pub fn scan(&self, start: &[u8]) -> Scan<'_> {
        let (_, path) = self.search_path(start);
        let page_ref = *path.last().unwrap();
        let page = self.pager.page(page_ref);

        Scan {
            tree: self,
            start: start.into(),
            page_ref,
            cursor: page.scan_from(start),
            done: false,
        }
    }

    /// Forward cursor over exactly the `(key, value)` pairs whose key
    /// starts with `prefix`, in ascending key order. An empty prefix yields
    /// every pair.
    pub fn scan_prefix(&self, prefix: &[u8]) -> ScanPrefix<'_> {
        ScanPrefix {
            inner: self.scan(prefix),
            prefix: prefix.into(),
        }
    }
}

/// Seek iterator: everything from the start key onward.
pub struct Scan<'t> {
    tree: &'t BTree,
    start: Box<[u8]>,
    page_ref: u32,
    cursor: PageCursor<'t>,
    done: bool,
}

impl<'t> Scan<'t> {
    /// Pulls the next record from the current leaf's cursor, resolving its
    /// value slot through the arena.
    fn pull(&mut self) -> Option<(&'t [u8], &'t [u8])> {
        let (key, slot) = self.cursor.next()?;
        Some((key, self.tree.values.get(slot)))
    }
}

impl<'t> Iterator for Scan<'t> {
    type Item = (&'t [u8], &'t [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Some(item) = self.pull() {
            return Some(item);
        }

        let Some(sibling) = self.tree.pager.page(self.page_ref).next_page() else {
            self.done = true;
            return None;
        };

        self.page_ref = sibling;
        self.cursor = self.tree.pager.page(sibling).scan_from(&self.start);
        let item = self.pull();
        if item.is_none() {
            self.done = true;
        }
        item
    }
}

/// Prefix iterator: stops at the first key that no longer matches.
pub struct ScanPrefix<'t> {
    inner: Scan<'t>,
    prefix: Box<[u8]>,
}

impl<'t> Iterator for ScanPrefix<'t> {
    type Item = (&'t [u8], &'t [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.inner.done {
            return None;
        }
        match self.inner.next() {
            Some((key, value)) if key.starts_with(&self.prefix) => Some((key, value)),
            _ => {
                self.inner.done = true;
                None
            }
        }
    }
}
