use std::collections::HashMap;

use mrsort::topn::{select_top_n_by_hash, select_top_n_by_min_heap, top_n};

#[test]
fn all_three_selectors_agree_across_a_range_of_n() {
    let map: HashMap<String, u64> = (0..150)
        .map(|i| (format!("url-{i:04}"), (i * 13 + 3) as u64))
        .collect();

    for n in [1usize, 5, 10, 50, 149] {
        let reference = top_n(&map, n);
        assert_eq!(reference, select_top_n_by_hash(&map, n));
        assert_eq!(reference, select_top_n_by_min_heap(&map, n));
    }
}

#[test]
fn n_larger_than_map_returns_every_entry() {
    let map: HashMap<String, u64> = [("a".to_string(), 1u64), ("b".to_string(), 2)]
        .into_iter()
        .collect();
    let result = top_n(&map, 10);
    assert_eq!(result.len(), 2);
}
