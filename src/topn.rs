//! Top-N selection over a `url -> count` mapping: three interchangeable
//! algorithms sharing one inverted `Ord` on [`UrlCount`], the same way the
//! teacher's `bin/sort.rs` hand-writes `Ord` on `SortedChunk` to turn
//! `BinaryHeap`'s max-heap behavior into the merge order it actually needs.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::heap::{insertion_sort_descending, MinHeap};

/// A `(url, count)` pair with an inverted ordering: `a < b` iff
/// `a.cnt < b.cnt`, tie-broken by `a.url > b.url` (a lexicographically
/// greater url counts as "smaller"). Popping the root of a *min*-heap
/// ordered this way always evicts the globally weakest top-N candidate,
/// leaving the strongest at the bottom of the heap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlCount {
    pub url: String,
    pub cnt: u64,
}

impl UrlCount {
    pub fn new(url: impl Into<String>, cnt: u64) -> Self {
        UrlCount { url: url.into(), cnt }
    }
}

impl PartialOrd for UrlCount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UrlCount {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cnt
            .cmp(&other.cnt)
            .then_with(|| other.url.cmp(&self.url))
    }
}

/// Reference implementation: fully sort descending (under the inverted
/// `Ord`, ascending `Ord::cmp` is already count-descending/url-ascending)
/// and take the first `n`.
pub fn top_n(map: &HashMap<String, u64>, n: usize) -> Vec<UrlCount> {
    let mut entries: Vec<UrlCount> = map
        .iter()
        .map(|(url, &cnt)| UrlCount::new(url.clone(), cnt))
        .collect();
    entries.sort_by(|a, b| b.cmp(a));
    entries.truncate(n);
    entries
}

const SMALL_INPUT_CUTOFF: usize = 20;

/// Hash-bucket counting selector: groups entries by count, walks counts
/// descending, and only sorts within a bucket (cheap when counts cluster,
/// as url-frequency data typically does).
pub fn select_top_n_by_hash(map: &HashMap<String, u64>, n: usize) -> Vec<UrlCount> {
    let entries: Vec<UrlCount> = map
        .iter()
        .map(|(url, &cnt)| UrlCount::new(url.clone(), cnt))
        .collect();

    if entries.len() <= SMALL_INPUT_CUTOFF && n <= SMALL_INPUT_CUTOFF {
        let mut entries = entries;
        insertion_sort_descending(&mut entries);
        entries.truncate(n);
        return entries;
    }

    let mut by_count: HashMap<u64, Vec<UrlCount>> = HashMap::new();
    for entry in entries {
        by_count.entry(entry.cnt).or_default().push(entry);
    }
    let mut counts: Vec<u64> = by_count.keys().copied().collect();
    counts.sort_unstable_by(|a, b| b.cmp(a));

    let mut result = Vec::with_capacity(n);
    for count in counts {
        let mut bucket = by_count.remove(&count).unwrap();
        if bucket.len() > n {
            bucket.sort_by(|a, b| b.cmp(a));
        } else {
            insertion_sort_descending(&mut bucket);
        }
        result.extend(bucket);
        if result.len() >= n {
            break;
        }
    }
    result.truncate(n);
    result
}

/// Fixed-capacity min-heap selector: seeds a capacity-`n` heap with the
/// first `n` entries, then scans the remainder from both ends inward,
/// replacing the heap's root whenever a candidate outranks it.
///
/// Stops once the cursors meet or cross (`while left < right`, plus a final
/// single check when they land on the same middle element), so every
/// remaining element is considered exactly once regardless of whether the
/// remainder's length is even or odd. A plain `left < right` loop with no
/// such final check would leave the remainder's exact middle element (odd
/// length) unconsidered; continuing past the point where the cursors cross
/// would reconsider elements already folded into the heap, which can evict a
/// genuine top-N member with a stale duplicate.
pub fn select_top_n_by_min_heap(map: &HashMap<String, u64>, n: usize) -> Vec<UrlCount> {
    let entries: Vec<UrlCount> = map
        .iter()
        .map(|(url, &cnt)| UrlCount::new(url.clone(), cnt))
        .collect();

    if entries.len() <= SMALL_INPUT_CUTOFF || n >= SMALL_INPUT_CUTOFF {
        let mut entries = entries;
        insertion_sort_descending(&mut entries);
        entries.truncate(n);
        return entries;
    }

    let mut heap: MinHeap<UrlCount> = MinHeap::new(n);
    let mut entries = entries;
    for entry in entries.drain(..n) {
        heap.append(entry, ());
    }

    let remaining = entries;
    if !remaining.is_empty() {
        let mut consider = |candidate: &UrlCount| {
            if heap.peek().map_or(false, |root| candidate > root) {
                heap.replace_root(candidate.clone());
            }
        };

        let mut left = 0usize;
        let mut right = remaining.len() - 1;
        while left < right {
            consider(&remaining[left]);
            consider(&remaining[right]);
            left += 1;
            right -= 1;
        }
        if left == right {
            consider(&remaining[left]);
        }
    }

    let mut sorted = heap.drain_into_sorted();
    sorted.truncate(n);
    sorted
}
