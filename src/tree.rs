//! Augmented interval tree for range-overlap queries
//!
//! The tree is built once from an already-sorted interval sequence and is
//! never mutated afterwards, so no rebalancing logic is needed: a
//! median-of-range recursive split over the sorted input yields a balanced
//! shape directly. Nodes live in a flat arena and reference their children
//! by index, which keeps the structure compact and cache-friendly.
//!
//! Each node is augmented with the maximum `end` value of its subtree.
//! Overlap queries descend the tree and prune whole subtrees using that
//! bound, giving `O(log n + k)` lookups for `k` matches.

use crate::interval::{Interval, SortedIntervals};

/// Sentinel index marking an absent child
const NIL: u32 = u32::MAX;

/// One arena slot: an interval plus the subtree's maximum end
#[derive(Debug, Clone, Copy)]
struct Node {
    interval: Interval,
    /// `max(interval.end, left.max_end, right.max_end)`
    max_end: u64,
    left: u32,
    right: u32,
}

/// An immutable interval tree answering "all intervals overlapping
/// `[start, end)`" queries
///
/// Matches are reported clipped to the query range: each returned
/// interval carries the stored row id but spans only the overlapping
/// segment. No output order is guaranteed.
#[derive(Debug, Clone)]
pub struct IntervalTree {
    nodes: Vec<Node>,
    root: u32,
}

impl IntervalTree {
    /// Build a balanced tree from a sorted interval sequence
    ///
    /// An empty sequence yields a tree that answers every query with no
    /// matches.
    pub fn build(intervals: &SortedIntervals) -> Self {
        let mut nodes = Vec::with_capacity(intervals.len());
        let root = Self::build_range(intervals.as_slice(), &mut nodes);
        Self { nodes, root }
    }

    /// Recursively place the median of `sorted` as the subtree root
    ///
    /// Returns the arena index of the subtree root, or `NIL` for an empty
    /// range. The node is pushed before its children so the arena ends up
    /// in pre-order; `max_end` is fixed up after both subtrees exist.
    fn build_range(sorted: &[Interval], nodes: &mut Vec<Node>) -> u32 {
        if sorted.is_empty() {
            return NIL;
        }

        let mid = sorted.len() / 2;
        let interval = sorted[mid];
        let idx = nodes.len() as u32;
        nodes.push(Node {
            interval,
            max_end: interval.end,
            left: NIL,
            right: NIL,
        });

        let left = Self::build_range(&sorted[..mid], nodes);
        let right = Self::build_range(&sorted[mid + 1..], nodes);

        let mut max_end = interval.end;
        if left != NIL {
            max_end = max_end.max(nodes[left as usize].max_end);
        }
        if right != NIL {
            max_end = max_end.max(nodes[right as usize].max_end);
        }

        let node = &mut nodes[idx as usize];
        node.left = left;
        node.right = right;
        node.max_end = max_end;

        idx
    }

    /// Number of intervals stored in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Collect all stored intervals overlapping `[start, end)`
    ///
    /// Matches are clipped to the query range. Strict half-open
    /// semantics: a stored interval touching the query only at an
    /// endpoint does not match.
    pub fn find_overlaps(&self, start: u64, end: u64) -> Vec<Interval> {
        let mut matches = Vec::new();
        self.find_overlaps_into(start, end, &mut matches);
        matches
    }

    /// Append all overlaps with `[start, end)` to a caller-owned buffer
    ///
    /// The buffer is not cleared first, so callers can reuse one
    /// allocation across many queries.
    pub fn find_overlaps_into(&self, start: u64, end: u64, matches: &mut Vec<Interval>) {
        if self.root != NIL {
            self.collect_overlaps(self.root, start, end, matches);
        }
    }

    fn collect_overlaps(&self, idx: u32, start: u64, end: u64, matches: &mut Vec<Interval>) {
        let node = &self.nodes[idx as usize];

        // Descend left only if something in the left subtree can reach
        // past the query start.
        if node.left != NIL && self.nodes[node.left as usize].max_end > start {
            self.collect_overlaps(node.left, start, end, matches);
        }

        if node.interval.overlaps_range(start, end) {
            matches.push(Interval {
                start: node.interval.start.max(start),
                end: node.interval.end.min(end),
                id: node.interval.id,
            });
        }

        // Everything to the right starts at or after this node's start,
        // so once that reaches the query end the whole subtree is out.
        if node.right != NIL && node.interval.start < end {
            self.collect_overlaps(node.right, start, end, matches);
        }
    }

    /// Maximum `end` stored anywhere in the tree, if non-empty
    pub fn max_end(&self) -> Option<u64> {
        if self.root == NIL {
            None
        } else {
            Some(self.nodes[self.root as usize].max_end)
        }
    }

    /// Validate the augmentation invariant on every node
    ///
    /// Returns `false` if any node's `max_end` disagrees with its
    /// subtree. Intended for tests and debugging.
    pub fn validate(&self) -> bool {
        if self.root == NIL {
            return true;
        }
        self.validate_node(self.root).is_some()
    }

    fn validate_node(&self, idx: u32) -> Option<u64> {
        let node = &self.nodes[idx as usize];
        let mut expected = node.interval.end;

        if node.left != NIL {
            expected = expected.max(self.validate_node(node.left)?);
        }
        if node.right != NIL {
            expected = expected.max(self.validate_node(node.right)?);
        }

        (expected == node.max_end).then_some(node.max_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn tree_of(raw: &[(u64, u64)]) -> IntervalTree {
        let intervals = raw
            .iter()
            .enumerate()
            .map(|(id, &(start, end))| Interval::new(start, end, id as u32))
            .collect();
        IntervalTree::build(&SortedIntervals::from_unsorted(intervals))
    }

    fn ids(mut matches: Vec<Interval>) -> Vec<u32> {
        matches.sort_by_key(|m| m.id);
        matches.into_iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_empty_tree() {
        let tree = IntervalTree::build(&SortedIntervals::new());

        assert!(tree.is_empty());
        assert_eq!(tree.max_end(), None);
        assert!(tree.find_overlaps(0, u64::MAX).is_empty());
    }

    #[test]
    fn test_single_interval() {
        let tree = tree_of(&[(10, 20)]);

        assert_eq!(ids(tree.find_overlaps(0, 100)), vec![0]);
        assert_eq!(ids(tree.find_overlaps(15, 16)), vec![0]);
        assert!(tree.find_overlaps(0, 10).is_empty());
        assert!(tree.find_overlaps(20, 30).is_empty());
    }

    #[test]
    fn test_disjoint_intervals() {
        let tree = tree_of(&[(0, 10), (20, 30), (40, 50), (60, 70)]);

        assert_eq!(ids(tree.find_overlaps(5, 45)), vec![0, 1, 2]);
        assert_eq!(ids(tree.find_overlaps(25, 26)), vec![1]);
        assert!(tree.find_overlaps(10, 20).is_empty());
    }

    #[test]
    fn test_nested_intervals() {
        let tree = tree_of(&[(0, 100), (10, 90), (20, 80), (30, 40)]);

        assert_eq!(ids(tree.find_overlaps(35, 36)), vec![0, 1, 2, 3]);
        assert_eq!(ids(tree.find_overlaps(85, 95)), vec![0, 1]);
    }

    #[test]
    fn test_matches_clipped_to_query() {
        let tree = tree_of(&[(0, 100)]);

        let matches = tree.find_overlaps(30, 40);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].start, 30);
        assert_eq!(matches[0].end, 40);
        assert_eq!(matches[0].id, 0);

        // A query extending past the stored range clips to the stored side
        let matches = tree.find_overlaps(90, 200);
        assert_eq!(matches[0].start, 90);
        assert_eq!(matches[0].end, 100);
    }

    #[test]
    fn test_half_open_boundaries() {
        let tree = tree_of(&[(10, 20)]);

        // Query ending exactly at the interval start does not match
        assert!(tree.find_overlaps(0, 10).is_empty());
        // Query starting exactly at the interval end does not match
        assert!(tree.find_overlaps(20, 40).is_empty());
        assert_eq!(tree.find_overlaps(9, 11).len(), 1);
        assert_eq!(tree.find_overlaps(19, 21).len(), 1);
    }

    #[test]
    fn test_augmentation_invariant() {
        let tree = tree_of(&[(0, 5), (1, 200), (2, 3), (50, 60), (70, 80), (75, 300)]);
        assert!(tree.validate());
        assert_eq!(tree.max_end(), Some(300));
    }

    #[test]
    fn test_duplicate_ranges() {
        let tree = tree_of(&[(10, 20), (10, 20), (10, 20)]);
        assert_eq!(ids(tree.find_overlaps(15, 16)), vec![0, 1, 2]);
    }

    #[test]
    fn test_randomized_against_naive_scan() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let count = rng.gen_range(0..200);
            let intervals: Vec<Interval> = (0..count)
                .map(|id| {
                    let start = rng.gen_range(0..1000u64);
                    let len = rng.gen_range(1..50u64);
                    Interval::new(start, start + len, id)
                })
                .collect();

            let sorted = SortedIntervals::from_unsorted(intervals.clone());
            let tree = IntervalTree::build(&sorted);
            assert!(tree.validate());

            for _ in 0..20 {
                let q_start = rng.gen_range(0..1000u64);
                let q_end = q_start + rng.gen_range(0..100u64);

                let mut expected: Vec<u32> = intervals
                    .iter()
                    .filter(|i| i.overlaps_range(q_start, q_end))
                    .map(|i| i.id)
                    .collect();
                expected.sort_unstable();

                let got = ids(tree.find_overlaps(q_start, q_end));
                assert_eq!(got, expected, "query [{}, {})", q_start, q_end);
            }
        }
    }
}
