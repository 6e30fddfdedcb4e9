//! # Arbor - In-Memory Ordered Index
//!
//! Arbor is an embedded, in-memory ordered key-value index built as a
//! B+-tree over byte keys, with values kept in a log-structured arena so
//! that appending to an existing key never disturbs the tree structure.
//!
//! ## Quick Start
//!
//! ```ignore
//! use arbor::BTree;
//!
//! let mut tree = BTree::new();
//! tree.put(b"apple", b"x")?;
//! tree.put(b"banana", b"y")?;
//! tree.append(b"apple", b"yz")?;
//!
//! assert_eq!(tree.get(b"apple")?, Some(&b"xyz"[..]));
//!
//! for (key, value) in tree.scan_prefix(b"a") {
//!     println!("{} -> {}", key.escape_ascii(), value.escape_ascii());
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +-------------------------------------------+
//! |           Public API (BTree)              |
//! |  put / get / append / put_next / scan     |
//! +-------------------------------------------+
//! |  Split propagation | Bulk-append fast path|
//! +-------------------------------------------+
//! |  Page (ordered records, binary search)    |
//! +---------------------+---------------------+
//! |  Pager (page arena, | ValueArena (slots,  |
//! |  u32 refs, stats)   | overwrite/append)   |
//! +---------------------+---------------------+
//! ```
//!
//! Pages refer to each other only through `u32` refs resolved by the pager,
//! and leaf records refer to values through `u32` arena slots. Both kinds of
//! ref are stable for the tree's lifetime.
//!
//! ## Write Paths
//!
//! - [`BTree::put`] searches top-down recording the root-to-leaf path, then
//!   inserts into the leaf, splitting bottom-up along the recorded path when
//!   pages overflow.
//! - [`BTree::put_next`] is the bulk-sorted fast path: given strictly
//!   ascending keys it descends the rightmost spine and grows the tree by
//!   attaching fresh pages on the right edge, never moving existing records.
//!
//! ## Scope
//!
//! The core is RAM-only and single-threaded. The 16 KiB page-size constant
//! anticipates a future on-disk pager behind the same narrow indirection,
//! but nothing is persisted. Keys cannot be deleted; value slots are never
//! reclaimed.
//!
//! ## Module Overview
//!
//! - [`btree`]: pages, pager, value arena, the tree, iterators, checker
//! - [`config`]: centralized constants with compile-time invariant checks

pub mod btree;
pub mod config;

pub use btree::{BTree, TreeStats};
