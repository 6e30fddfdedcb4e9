//! End-to-end coverage of the tree's operation surface: point reads and
//! overwrites, append-to-value, bulk-sorted loading, seek and prefix scans,
//! the split machinery at page boundaries, and the consistency checker,
//! including workloads large enough to force multi-level trees.

use arbor::config::PAGE_CAPACITY;
use arbor::BTree;

use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};

fn keyed(i: usize) -> String {
    format!("k_{i:04}")
}

mod basics {
    use super::*;

    #[test]
    fn put_get_and_full_scan() {
        let mut tree = BTree::new();
        tree.put(b"a", b"1").unwrap();
        tree.put(b"b", b"2").unwrap();
        tree.put(b"c", b"3").unwrap();

        assert_eq!(tree.get(b"b").unwrap(), Some(&b"2"[..]));
        assert_eq!(tree.get(b"d").unwrap(), None);

        let pairs: Vec<(&[u8], &[u8])> = tree.scan(b"").collect();
        assert_eq!(
            pairs,
            vec![(&b"a"[..], &b"1"[..]), (b"b", b"2"), (b"c", b"3")]
        );
    }

    #[test]
    fn append_concatenates_across_calls() {
        let mut tree = BTree::new();
        tree.append(b"x", b"abc").unwrap();
        tree.append(b"x", b"de").unwrap();

        assert_eq!(tree.get(b"x").unwrap(), Some(&b"abcde"[..]));
        assert_eq!(tree.size(), 1);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let mut tree = BTree::new();
        assert!(tree.put(b"", b"v").is_err());
        assert!(tree.get(b"").is_err());
        assert!(tree.append(b"k", b"").is_err());
        assert!(tree.put_next(b"", b"v").is_err());
    }
}

mod scans {
    use super::*;

    #[test]
    fn scan_from_key_continues_to_the_end() {
        let mut tree = BTree::new();
        tree.put(b"banana", b"y").unwrap();
        tree.put(b"apple", b"x").unwrap();
        tree.put(b"cherry", b"z").unwrap();

        let pairs: Vec<(&[u8], &[u8])> = tree.scan(b"b").collect();
        assert_eq!(pairs, vec![(&b"banana"[..], &b"y"[..]), (b"cherry", b"z")]);
    }

    #[test]
    fn scan_prefix_yields_exactly_the_matching_keys() {
        let mut tree = BTree::new();
        tree.put(b"banana", b"y").unwrap();
        tree.put(b"apple", b"x").unwrap();
        tree.put(b"cherry", b"z").unwrap();
        tree.put(b"blueberry", b"w").unwrap();

        let keys: Vec<&[u8]> = tree.scan_prefix(b"b").map(|(k, _)| k).collect();
        assert_eq!(keys, vec![&b"banana"[..], b"blueberry"]);
    }
}

mod bulk_workloads {
    use super::*;

    const COUNT: usize = 10_000;

    #[test]
    fn ten_thousand_puts_stay_ordered_and_consistent() {
        let mut tree = BTree::new();
        for i in 0..COUNT {
            tree.put(keyed(i).as_bytes(), keyed(i).as_bytes()).unwrap();
        }

        assert_eq!(tree.size(), COUNT as u64);
        tree.check_consistency().unwrap();

        let keys: Vec<Vec<u8>> = tree.scan(b"").map(|(k, _)| k.to_vec()).collect();
        assert_eq!(keys.len(), COUNT);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(keys[0], keyed(0).into_bytes());
        assert_eq!(keys[COUNT - 1], keyed(COUNT - 1).into_bytes());

        assert!(tree.put(keyed(5000).as_bytes(), b"X").unwrap());
        assert_eq!(tree.get(keyed(5000).as_bytes()).unwrap(), Some(&b"X"[..]));
        assert_eq!(tree.size(), COUNT as u64);
    }

    #[test]
    fn bulk_sorted_load_never_moves_records() {
        let mut tree = BTree::new();
        for i in 0..COUNT {
            tree.put_next(keyed(i).as_bytes(), keyed(i).as_bytes())
                .unwrap();
        }

        assert_eq!(tree.size(), COUNT as u64);
        tree.check_consistency().unwrap();

        let keys: Vec<Vec<u8>> = tree.scan(b"").map(|(k, _)| k.to_vec()).collect();
        assert_eq!(keys.len(), COUNT);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));

        // 10 000 keys at 100 per page land on an exact page boundary: with
        // right-edge growth every leaf and the root end up completely full,
        // which a split-based load can never produce.
        let stats = tree.stats();
        assert_eq!(stats.num_leaf_pages, COUNT / PAGE_CAPACITY);
        assert_eq!(stats.num_internal_pages, 1);
        assert!((stats.fill_rate - 1.0).abs() < 1e-9);
    }

    #[test]
    fn bulk_load_and_random_puts_agree_on_the_key_set() {
        let mut bulk = BTree::new();
        let mut shuffled = BTree::new();

        let mut order: Vec<usize> = (0..COUNT).collect();
        order.shuffle(&mut StdRng::seed_from_u64(0x5eed));

        for i in 0..COUNT {
            bulk.put_next(keyed(i).as_bytes(), keyed(i).as_bytes())
                .unwrap();
        }
        for &i in &order {
            shuffled
                .put(keyed(i).as_bytes(), keyed(i).as_bytes())
                .unwrap();
        }

        shuffled.check_consistency().unwrap();
        let bulk_pairs: Vec<(Vec<u8>, Vec<u8>)> = bulk
            .scan(b"")
            .map(|(k, v)| (k.to_vec(), v.to_vec()))
            .collect();
        let shuffled_pairs: Vec<(Vec<u8>, Vec<u8>)> = shuffled
            .scan(b"")
            .map(|(k, v)| (k.to_vec(), v.to_vec()))
            .collect();
        assert_eq!(bulk_pairs, shuffled_pairs);
    }

    #[test]
    fn out_of_order_bulk_put_fails_without_corrupting() {
        let mut tree = BTree::new();
        tree.put_next(b"m", b"v").unwrap();

        assert!(tree.put_next(b"a", b"v").is_err());
        tree.check_consistency().unwrap();
        assert_eq!(tree.size(), 1);
    }
}

mod split_boundaries {
    use super::*;

    #[test]
    fn capacity_plus_one_inserts_split_into_two_linked_leaves() {
        let mut tree = BTree::new();
        for i in 0..PAGE_CAPACITY + 1 {
            tree.put(keyed(i).as_bytes(), b"v").unwrap();
        }

        let stats = tree.stats();
        assert_eq!(stats.num_leaf_pages, 2);
        assert_eq!(stats.num_internal_pages, 1);
        tree.check_consistency().unwrap();

        // The separator in the root is the first key of the upper half,
        // the (N/2 + 1)-th inserted key.
        let mut out = Vec::new();
        tree.dump(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let separator = keyed(PAGE_CAPACITY / 2);
        assert!(
            text.lines()
                .any(|line| line.starts_with(&format!("\t1: {separator} -> "))),
            "separator {separator} missing from root dump:\n{text}"
        );
    }

    #[test]
    fn root_promotion_keeps_all_keys_reachable() {
        let mut tree = BTree::new();
        // Enough keys that the root itself splits at least once.
        let count = PAGE_CAPACITY * PAGE_CAPACITY;
        for i in 0..count {
            tree.put(format!("k_{i:06}").as_bytes(), b"v").unwrap();
        }

        assert_eq!(tree.size(), count as u64);
        assert!(tree.stats().num_internal_pages >= 2);
        tree.check_consistency().unwrap();
        assert_eq!(tree.scan(b"").count(), count);
    }
}

mod randomized {
    use super::*;

    #[test]
    fn shuffled_inserts_with_overwrites_hold_every_invariant() {
        let mut tree = BTree::new();
        let mut order: Vec<usize> = (0..5_000).collect();
        order.shuffle(&mut StdRng::seed_from_u64(42));

        for &i in &order {
            tree.put(keyed(i).as_bytes(), format!("v{i}").as_bytes())
                .unwrap();
        }
        // Overwrite a slice of them and append to another.
        for i in (0..5_000).step_by(17) {
            tree.put(keyed(i).as_bytes(), b"overwritten").unwrap();
        }
        for i in (0..5_000).step_by(29) {
            tree.append(keyed(i).as_bytes(), b"+tail").unwrap();
        }

        assert_eq!(tree.size(), 5_000);
        tree.check_consistency().unwrap();

        assert_eq!(
            tree.get(keyed(17 * 100).as_bytes()).unwrap(),
            Some(&b"overwritten"[..])
        );
        let v2958 = tree.get(keyed(29 * 102).as_bytes()).unwrap().unwrap();
        assert!(v2958.ends_with(b"+tail"));

        let keys: Vec<Vec<u8>> = tree.scan(b"").map(|(k, _)| k.to_vec()).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(keys.len(), 5_000);
    }
}
