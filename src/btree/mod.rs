//! # B+-Tree Index Implementation
//!
//! This module implements the crate's core: an in-memory B+-tree keyed by
//! arbitrary byte strings, with values held outside the tree in a
//! log-structured arena.
//!
//! ## Architecture Overview
//!
//! ```text
//!                  [Interior page 0]           <- root, always interior
//!                  /       |        \
//!         [Leaf 1]    [Leaf 2]    [Leaf 3]     <- records point into the
//!            |----------->|---------->|           value arena
//!                 (sibling linked list)
//! ```
//!
//! Every page is an ordered, fixed-capacity array of key records. A record
//! pairs immutable key bytes with one `u32` target: in an interior page the
//! child page holding keys greater than or equal to the record's key, in a
//! leaf the value-arena slot. Pages never hold pointers to each other; all
//! references are `u32` refs resolved through the [`Pager`], which owns
//! every page.
//!
//! ## Interior Page Convention
//!
//! Position 0 of an interior page carries no user key: its target is the
//! "first" child, covering keys below the page's smallest separator.
//! Positions `1..len` hold real separators in strictly ascending order.
//! Leaf pages hold real records at every position `0..len`.
//!
//! ## Write Paths
//!
//! Random inserts go through [`BTree::put`]: top-down descent records the
//! root-to-leaf path, the leaf insert either fits or triggers a bottom-up
//! median split along the recorded path, promoting a new root when the split
//! reaches it. Sorted bulk loads go through [`BTree::put_next`], which
//! descends the rightmost spine and attaches fresh pages on the right edge
//! instead of splitting, so no existing record ever moves.
//!
//! ## Reading
//!
//! [`BTree::get`] returns a slice borrowed from the value arena.
//! [`BTree::scan`] seeks to a start key and yields everything from there;
//! [`BTree::scan_prefix`] additionally stops at the first key that no longer
//! carries the prefix. [`BTree::check_consistency`] verifies the ordering
//! and structural invariants and reports the first violation.
//!
//! ## Thread Safety
//!
//! The tree is single-threaded by design. Reads take `&self`, writes take
//! `&mut self`, and iterators borrow the tree, so the borrow checker rules
//! out mutation while a scan is alive.

mod arena;
mod check;
mod iter;
mod page;
mod pager;
mod tree;

pub use arena::ValueArena;
pub use iter::{Scan, ScanPrefix};
pub use page::{KeyRecord, Page, PageCursor, PageKind, SearchResult};
pub use pager::{OpCounters, Pager, TreeStats};
pub use tree::BTree;
