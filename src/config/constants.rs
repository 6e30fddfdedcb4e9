//! # Configuration Constants
//!
//! All tunables in one place. Constants that depend on each other are
//! grouped together and the invariants between them are enforced with
//! compile-time assertions.
//!
//! ```text
//! PAGE_CAPACITY (100 records)
//!       |
//!       +-> must be even: the median split leaves PAGE_SPLIT_POINT records
//!       |   in the lower page and moves the rest, and both halves must
//!       |   end up the same size
//!       |
//!       +-> PAGE_SPLIT_POINT (derived: PAGE_CAPACITY / 2)
//!
//! PAGE_SIZE (16384 bytes)
//!       The fixed page size a future on-disk pager would use. The
//!       in-memory pager counts records, not bytes, so this constant is
//!       not consulted by the core today.
//! ```

// ============================================================================
// PAGE GEOMETRY
// ============================================================================

/// Size of an on-disk page in bytes (16 KiB).
///
/// Reserved for a persistent pager substituted behind the same indirection;
/// the in-memory pager bounds pages by record count instead.
pub const PAGE_SIZE: usize = 16384;

/// Maximum number of key records held by one in-memory page.
///
/// Counts every position, including the synthetic first-child record of
/// interior pages. Must be even so the median split is clean.
pub const PAGE_CAPACITY: usize = 100;

/// Number of records the lower page keeps in a median split.
pub const PAGE_SPLIT_POINT: usize = PAGE_CAPACITY / 2;

const _: () = assert!(
    PAGE_CAPACITY % 2 == 0,
    "PAGE_CAPACITY must be even for clean median splits"
);

const _: () = assert!(
    PAGE_CAPACITY >= 4,
    "PAGE_CAPACITY below 4 cannot hold a first child plus separators on both split halves"
);

const _: () = assert!(
    PAGE_SPLIT_POINT * 2 == PAGE_CAPACITY,
    "PAGE_SPLIT_POINT derivation mismatch"
);

// ============================================================================
// SEARCH PATH
// ============================================================================

/// Inline capacity of the root-to-leaf path recorded during descent.
///
/// Eight levels cover 100^7 keys before the path spills to the heap.
pub const PATH_DEPTH_HINT: usize = 8;
