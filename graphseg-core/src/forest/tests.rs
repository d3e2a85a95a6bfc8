//! Unit and property tests for the disjoint-set forest.

use proptest::prelude::*;
use rstest::rstest;

use crate::test_utils::suite_proptest_config;

use super::DisjointSetForest;

#[test]
fn new_forest_holds_singletons() {
    let forest = DisjointSetForest::new(4, 2.5);
    assert_eq!(forest.len(), 4);
    assert_eq!(forest.component_count(), 4);
    for node in 0..4 {
        assert_eq!(forest.representative(node), node);
        assert_eq!(forest.size_of(node), 1);
        assert_eq!(forest.threshold_of(node), 2.5);
    }
    assert_eq!(forest.roots(), vec![0, 1, 2, 3]);
}

#[test]
fn union_attaches_smaller_under_larger() {
    let mut forest = DisjointSetForest::new(5, 0.0);
    let big = forest.union(3, 4, 0.0, 0.0).expect("distinct");
    let big = forest.union(big, 2, 0.0, 0.0).expect("distinct");
    assert_eq!(big, 3);

    let root = forest.union(0, 2, 0.0, 0.0).expect("distinct");
    assert_eq!(root, 3, "singleton must hang under the size-3 component");
    assert_eq!(forest.size_of(root), 4);
    assert_eq!(forest.component_count(), 2);
}

#[rstest]
#[case(0, 1, 0)]
#[case(1, 0, 0)]
#[case(4, 2, 2)]
fn equal_sizes_keep_lower_root(#[case] left: usize, #[case] right: usize, #[case] expected: usize) {
    let mut forest = DisjointSetForest::new(5, 0.0);
    assert_eq!(forest.union(left, right, 0.0, 0.0), Some(expected));
}

#[test]
fn union_of_same_component_is_noop() {
    let mut forest = DisjointSetForest::new(3, 1.0);
    forest.union(0, 1, 0.0, 1.0).expect("distinct");
    let before = forest.clone();
    assert_eq!(forest.union(1, 0, 0.0, 1.0), None);
    assert_eq!(forest, before);
}

#[test]
fn union_updates_threshold_from_merge_weight() {
    let mut forest = DisjointSetForest::new(4, 10.0);
    let root = forest.union(0, 1, 3.0, 10.0).expect("distinct");
    assert_eq!(forest.threshold_of(root), 3.0 + 10.0 / 2.0);

    let root = forest.union(root, 2, 4.0, 10.0).expect("distinct");
    assert!((forest.threshold_of(root) - (4.0 + 10.0 / 3.0)).abs() < 1e-6);
}

#[test]
fn forced_union_uses_smallest_threshold() {
    let mut forest = DisjointSetForest::new(2, 1.0);
    let root = forest.union(0, 1, 50.0, 1.0).expect("distinct");
    assert_eq!(forest.threshold_of(root), 1.0 + 0.5);
}

#[test]
fn find_compresses_paths() {
    let mut forest = DisjointSetForest::new(4, 0.0);
    forest.union(0, 1, 0.0, 0.0);
    forest.union(2, 3, 0.0, 0.0);
    forest.union(0, 2, 0.0, 0.0);
    forest.flatten();
    let root = forest.representative(3);
    for node in 0..4 {
        assert_eq!(forest.parent[node], root);
    }
}

#[test]
#[should_panic(expected = "outside a forest")]
fn find_out_of_range_panics() {
    let mut forest = DisjointSetForest::new(2, 0.0);
    forest.find(2);
}

fn naive_components(len: usize, pairs: &[(usize, usize)]) -> Vec<usize> {
    let mut label: Vec<usize> = (0..len).collect();
    for &(left, right) in pairs {
        let (from, to) = (label[right], label[left]);
        if from != to {
            for entry in &mut label {
                if *entry == from {
                    *entry = to;
                }
            }
        }
    }
    label
}

fn pairs_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..40).prop_flat_map(|len| {
        (
            Just(len),
            proptest::collection::vec((0..len, 0..len), 0..80),
        )
    })
}

proptest! {
    #![proptest_config(suite_proptest_config(128))]

    #[test]
    fn forest_matches_naive_partition((len, pairs) in pairs_strategy()) {
        let mut forest = DisjointSetForest::new(len, 1.0);
        for &(left, right) in &pairs {
            forest.union(left, right, 0.5, 1.0);
        }
        let expected = naive_components(len, &pairs);

        for left in 0..len {
            for right in 0..len {
                prop_assert_eq!(
                    forest.same_component(left, right),
                    expected[left] == expected[right]
                );
            }
        }

        let roots = forest.roots();
        prop_assert_eq!(roots.len(), forest.component_count());
        let total: usize = roots.iter().map(|&root| forest.size_of(root)).sum();
        prop_assert_eq!(total, len);
    }
}
