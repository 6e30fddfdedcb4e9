//! # Consistency Checker
//!
//! Two passes over the whole tree, reporting the first violation found as a
//! descriptive error and never panicking.
//!
//! Pass 1 iterates every record through the leaf list, verifying non-empty
//! keys, strict ascending order, and that the record count matches the
//! tree's size. Pass 2 walks the page graph from the root, verifying the
//! structural invariants of every page: separator ordering, the parent's
//! separator bounding the child's keys, refs resolving through the pager,
//! and leaf slots resolving through the value arena.

use eyre::{ensure, Result};

use super::tree::BTree;

impl BTree {
    /// Verifies every tree invariant, returning the first violation.
    pub fn check_consistency(&self) -> Result<()> {
        let mut count = 0u64;
        let mut prev: Vec<u8> = Vec::new();
        for (key, _) in self.scan(b"") {
            ensure!(!key.is_empty(), "scan produced an empty key");
            ensure!(
                prev.as_slice() < key,
                "expected strict key ordering, got {:?} >= {:?}",
                prev.escape_ascii().to_string(),
                key.escape_ascii().to_string()
            );
            prev.clear();
            prev.extend_from_slice(key);
            count += 1;
        }
        ensure!(
            count == self.size,
            "expected scan to cover {} keys, got {}",
            self.size,
            count
        );

        self.check_page(self.root, None)
    }

    /// Recursive structural pass. `min_key` is the parent separator that
    /// routed descent here; every real key below it must be greater.
    fn check_page(&self, page_ref: u32, min_key: Option<&[u8]>) -> Result<()> {
        let page = self.pager.page(page_ref);

        if page.is_leaf() {
            let mut prev: Option<&[u8]> = None;
            for pos in 0..page.len() {
                let record = page.record(pos);
                if let Some(prev) = prev {
                    ensure!(
                        prev < record.key(),
                        "leaf {} violates strict ordering at position {}: {:?} >= {:?}",
                        page_ref,
                        pos,
                        prev.escape_ascii().to_string(),
                        record.key().escape_ascii().to_string()
                    );
                }
                ensure!(
                    record.target() < self.values.len(),
                    "leaf {} position {} references value slot {} beyond arena length {}",
                    page_ref,
                    pos,
                    record.target(),
                    self.values.len()
                );
                if let Some(min_key) = min_key {
                    // The separator equals the first key moved on a leaf
                    // split, so equality is legal here.
                    ensure!(
                        min_key <= record.key(),
                        "expected leaf {} keys to be at or above parent separator {:?}, got {:?}",
                        page_ref,
                        min_key.escape_ascii().to_string(),
                        record.key().escape_ascii().to_string()
                    );
                }
                prev = Some(record.key());
            }
            return Ok(());
        }

        ensure!(
            page.first().is_some(),
            "internal page {} has no first child",
            page_ref
        );
        self.check_child(page_ref, page.first().unwrap())?;
        self.check_page(page.first().unwrap(), None)?;

        let mut prev = page.record(0).key();
        for pos in 1..page.len() {
            let record = page.record(pos);
            ensure!(
                prev < record.key(),
                "internal page {} violates strict ordering at position {}: {:?} >= {:?}",
                page_ref,
                pos,
                prev.escape_ascii().to_string(),
                record.key().escape_ascii().to_string()
            );
            if let Some(min_key) = min_key {
                ensure!(
                    min_key < record.key(),
                    "expected parent separator {:?} to be below all keys of page {}, got {:?}",
                    min_key.escape_ascii().to_string(),
                    page_ref,
                    record.key().escape_ascii().to_string()
                );
            }
            self.check_child(page_ref, record.target())?;
            self.check_page(record.target(), Some(record.key()))?;
            prev = record.key();
        }

        Ok(())
    }

    fn check_child(&self, page_ref: u32, child: u32) -> Result<()> {
        ensure!(
            child < self.pager.page_count(),
            "internal page {} references child {} beyond page count {}",
            page_ref,
            child,
            self.pager.page_count()
        );
        Ok(())
    }
}
