//! # B+-Tree Core
//!
//! The tree proper: it owns the pager and the value arena, keeps the root
//! ref and the total key count, and implements the search, insert, append
//! and bulk-load protocols over them.
//!
//! ## Search
//!
//! ```text
//! 1. Start at the root, path = [root]
//! 2. While at an interior page:
//!    - binary-search the page; a hit or the record before the insertion
//!      point names the child to follow
//!    - push the child onto the path
//! 3. Return the leaf-level search result plus the recorded path
//! ```
//!
//! Collapsing descent and lookup into one operation is why a miss returns
//! the record one smaller: on an interior page that record carries exactly
//! the child ref to follow.
//!
//! ## Split Propagation
//!
//! Overflowing pages split bottom-up along the recorded path:
//!
//! ```text
//! 1. Allocate a sibling of the same kind, split at the median
//! 2. Sibling inherits the next link; the source links to the sibling
//! 3. Route the record that failed to insert by comparing against the
//!    separator; after a split both halves have room
//! 4. Insert the separator into the parent; if the parent is full, recurse
//!    with the path minus its tail, promoting a fresh root first when the
//!    full parent is the root
//! ```
//!
//! ## Bulk-Sorted Loading
//!
//! `put_next` requires each key to be strictly greater than every key
//! already present. It descends the rightmost spine without searching and,
//! when the rightmost leaf is full, attaches a fresh empty page on the right
//! edge instead of splitting. No record ever moves, so a pure sorted load
//! leaves every page completely full.

use std::io;

use eyre::{ensure, Result};
use smallvec::{smallvec, SmallVec};
use tracing::debug;

use crate::config::PATH_DEPTH_HINT;

use super::arena::ValueArena;
use super::page::{PageKind, SearchResult};
use super::pager::{Pager, TreeStats};

/// Root-to-leaf sequence of page refs recorded during descent.
pub(crate) type SearchPath = SmallVec<[u32; PATH_DEPTH_HINT]>;

/// In-memory B+-tree mapping byte keys to byte values.
#[derive(Debug)]
pub struct BTree {
    pub(crate) pager: Pager,
    pub(crate) values: ValueArena,
    pub(crate) root: u32,
    pub(crate) size: u64,
}

impl BTree {
    /// Creates an empty tree: an interior root whose first child is a
    /// single empty leaf.
    pub fn new() -> Self {
        let mut pager = Pager::new();
        let (root, _) = pager.allocate(PageKind::Interior);
        let (leaf, _) = pager.allocate(PageKind::Leaf);
        pager.page_mut(root).set_first(leaf);

        Self {
            pager,
            values: ValueArena::new(),
            root,
            size: 0,
        }
    }

    /// Number of distinct keys in the tree.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn stats(&self) -> TreeStats {
        self.pager.stats()
    }

    /// Top-down descent for `key`, recording every visited page ref, root
    /// and leaf inclusive. Returns the leaf-level search result; the leaf
    /// is the path's last element.
    pub(crate) fn search_path(&self, key: &[u8]) -> (SearchResult, SearchPath) {
        self.pager.counters().record_find();
        let mut path: SearchPath = smallvec![self.root];

        loop {
            let page = self.pager.page(*path.last().unwrap());
            let result = page.search(key, self.pager.counters());
            if page.is_leaf() {
                return (result, path);
            }

            let child = match result {
                SearchResult::Found(pos) => page.record(pos).target(),
                // One before the insertion point: the greatest record whose
                // key is smaller, falling back to the first child.
                SearchResult::NotFound(pos) => page.record(pos - 1).target(),
            };
            path.push(child);
        }
    }

    /// Looks up the value most recently written for `key`.
    pub fn get(&self, key: &[u8]) -> Result<Option<&[u8]>> {
        ensure!(!key.is_empty(), "key must not be empty");

        let (result, path) = self.search_path(key);
        match result {
            SearchResult::Found(pos) => {
                let leaf = self.pager.page(*path.last().unwrap());
                Ok(Some(self.values.get(leaf.record(pos).target())))
            }
            SearchResult::NotFound(_) => Ok(None),
        }
    }

    /// Inserts or overwrites `key`. Returns true iff the key was already
    /// present. The key and value bytes are copied; empty values are
    /// allowed.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<bool> {
        ensure!(!key.is_empty(), "key must not be empty");

        let (result, path) = self.search_path(key);
        if let SearchResult::Found(pos) = result {
            let slot = self.pager.page(*path.last().unwrap()).record(pos).target();
            self.values.overwrite(slot, value);
            return Ok(true);
        }

        let slot = self.values.push(value);
        let leaf = *path.last().unwrap();
        if !self.pager.page_mut(leaf).insert(key, slot) {
            self.split(key, slot, &path)?;
        }

        self.size += 1;
        Ok(false)
    }

    /// Extends the value stored for `key`, creating the key when absent.
    pub fn append(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        ensure!(!key.is_empty(), "key must not be empty");
        ensure!(!value.is_empty(), "appended value must not be empty");

        let (result, path) = self.search_path(key);
        match result {
            SearchResult::Found(pos) => {
                let slot = self.pager.page(*path.last().unwrap()).record(pos).target();
                self.values.append(slot, value);
                Ok(())
            }
            SearchResult::NotFound(_) => {
                let replaced = self.put(key, value)?;
                ensure!(
                    !replaced,
                    "append found no key {:?} yet put replaced one; the tree is corrupt",
                    key.escape_ascii().to_string()
                );
                Ok(())
            }
        }
    }

    /// Splits the full page at the path's tail and inserts `(key, target)`
    /// into whichever half it belongs to, propagating the separator upward.
    fn split(&mut self, key: &[u8], target: u32, path: &[u32]) -> Result<()> {
        ensure!(
            path.len() >= 2,
            "split requires a parent on the path, got {} element(s)",
            path.len()
        );
        let page_ref = path[path.len() - 1];
        let parent_ref = path[path.len() - 2];

        let kind = self.pager.page(page_ref).kind();
        let (new_ref, _) = self.pager.allocate(kind);
        let (page, new_page) = self.pager.page_pair_mut(page_ref, new_ref)?;

        let split_key = page.split(new_page);
        new_page.set_next_page(page.next_page());
        page.set_next_page(Some(new_ref));

        // After a split both halves have room for one more record.
        let inserted = if key < &split_key[..] {
            page.insert(key, target)
        } else {
            new_page.insert(key, target)
        };
        debug_assert!(inserted, "freshly split page rejected an insert");

        debug!(page = page_ref, sibling = new_ref, "split page");

        if !self.pager.page_mut(parent_ref).insert(&split_key, new_ref) {
            if parent_ref == self.root {
                ensure!(
                    path.len() == 2,
                    "root split must see a two-element path, got {}",
                    path.len()
                );
                let old_root = self.promote_root();
                self.split(&split_key, new_ref, &[self.root, old_root])?;
            } else {
                self.split(&split_key, new_ref, &path[..path.len() - 1])?;
            }
        }

        Ok(())
    }

    /// Installs a fresh interior root whose first child is the old root.
    /// Returns the old root's ref.
    fn promote_root(&mut self) -> u32 {
        let old_root = self.root;
        let (new_root, page) = self.pager.allocate(PageKind::Interior);
        page.set_first(old_root);
        self.root = new_root;
        debug!(old_root, new_root, "promoted new root");
        old_root
    }

    /// Inserts a key strictly greater than every key already present.
    ///
    /// The caller promises to keep calling with ascending keys; the tree
    /// exploits that to skip searching and to grow the rightmost spine with
    /// fresh pages instead of splitting. A key out of order is an error.
    pub fn put_next(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        ensure!(!key.is_empty(), "key must not be empty");

        let mut path: SearchPath = smallvec![self.root];
        loop {
            let page = self.pager.page(*path.last().unwrap());
            if page.is_leaf() {
                break;
            }
            let rightmost = page.record(page.len() - 1);
            ensure!(
                rightmost.key() < key,
                "out of order put: key {:?} is not greater than {:?}",
                key.escape_ascii().to_string(),
                rightmost.key().escape_ascii().to_string()
            );
            path.push(rightmost.target());
        }

        // The rightmost leaf holds the largest key in the tree, so this
        // catches every contract violation the spine checks above cannot
        // see (a tree still shallow enough to have no separators).
        let leaf = *path.last().unwrap();
        let leaf_page = self.pager.page(leaf);
        if !leaf_page.is_empty() {
            let largest = leaf_page.record(leaf_page.len() - 1);
            ensure!(
                largest.key() < key,
                "out of order put: key {:?} is not greater than {:?}",
                key.escape_ascii().to_string(),
                largest.key().escape_ascii().to_string()
            );
        }

        let slot = self.values.push(value);
        if !self.pager.page_mut(leaf).insert(key, slot) {
            self.append_page(key, slot, &path)?;
        }

        self.size += 1;
        Ok(())
    }

    /// Append-only variant of split: attaches a fresh empty page on the
    /// right edge instead of moving records. `target` is a value slot when
    /// the right edge is a leaf and the hoisted child ref otherwise; `key`
    /// itself is the separator inserted into the parent.
    fn append_page(&mut self, key: &[u8], target: u32, path: &[u32]) -> Result<()> {
        ensure!(
            path.len() >= 2,
            "page append requires a parent on the path, got {} element(s)",
            path.len()
        );
        let page_ref = path[path.len() - 1];
        let parent_ref = path[path.len() - 2];

        let kind = self.pager.page(page_ref).kind();
        let (new_ref, _) = self.pager.allocate(kind);
        let (page, new_page) = self.pager.page_pair_mut(page_ref, new_ref)?;

        page.set_next_page(Some(new_ref));
        if page.is_leaf() {
            let inserted = new_page.insert(key, target);
            debug_assert!(inserted, "fresh page rejected an insert");
        } else {
            new_page.set_first(target);
        }

        debug!(page = page_ref, appended = new_ref, "appended right-edge page");

        if !self.pager.page_mut(parent_ref).insert(key, new_ref) {
            if parent_ref == self.root {
                let old_root = self.promote_root();
                self.append_page(key, new_ref, &[self.root, old_root])?;
            } else {
                self.append_page(key, new_ref, &path[..path.len() - 1])?;
            }
        }

        Ok(())
    }

    /// Writes a structured text rendition of the tree, one line per page
    /// and per record, children indented beneath their parents.
    pub fn dump<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        self.dump_page(out, self.root, 0)
    }

    fn dump_page<W: io::Write>(&self, out: &mut W, page_ref: u32, depth: usize) -> io::Result<()> {
        let page = self.pager.page(page_ref);
        let indent = "\t".repeat(depth);
        writeln!(
            out,
            "{indent}Page {page_ref}, leaf:{}, {} keys:",
            page.is_leaf(),
            page.len()
        )?;
        for pos in 0..page.len() {
            let record = page.record(pos);
            writeln!(
                out,
                "{indent}\t{pos}: {} -> {}",
                record.key().escape_ascii(),
                record.target()
            )?;
            if !page.is_leaf() {
                self.dump_page(out, record.target(), depth + 1)?;
            }
        }
        Ok(())
    }
}

impl Default for BTree {
    fn default() -> Self {
        Self::new()
    }
}
