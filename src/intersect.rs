//! Multi-way interval intersection
//!
//! Composes per-table overlap queries into a global intersection: given N
//! sorted interval sets, every surviving result identifies one interval
//! per set such that all N mutually overlap, together with the common
//! overlap window.
//!
//! The smallest set seeds the candidate list, and the remaining sets are
//! processed in ascending-size order. Each stage builds an interval tree
//! over its set and narrows every candidate through an overlap query, so
//! the candidate count can only shrink or fan out where genuine overlaps
//! exist. An empty set anywhere short-circuits the whole computation.

use log::debug;
use smallvec::SmallVec;

use crate::interval::SortedIntervals;
use crate::tree::IntervalTree;

/// Inline capacity for per-table id vectors; intersections rarely span
/// more tables than this.
const IDX_INLINE_SIZE: usize = 4;

/// One id per input table, indexed by original table position
pub type TableIds = SmallVec<[u32; IDX_INLINE_SIZE]>;

/// A surviving candidate: the overlap window plus one source row id per
/// input table
///
/// `idx_in_table[k]` is the row id of the matched interval in table `k`,
/// addressed by the table's original argument position regardless of
/// processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiIndexInterval {
    /// Overlap window start
    pub start: u64,
    /// Overlap window end (exclusive)
    pub end: u64,
    /// Matched row id per input table
    pub idx_in_table: TableIds,
}

/// Intersect N sorted interval sets
///
/// Returns one record per combination of mutually overlapping intervals,
/// in no guaranteed order. An empty input slice yields no records; a
/// single set yields one record per interval (its own bounds, its own
/// id). Callers wanting the boundary contract's `N >= 2` check get it
/// from [`crate::engine::interval_intersect`].
pub fn intersect(tables: &[&SortedIntervals]) -> Vec<MultiIndexInterval> {
    if tables.is_empty() || tables.iter().any(|t| t.is_empty()) {
        return Vec::new();
    }

    // Process order: ascending cardinality, ties broken by original
    // position so equal-sized inputs stay deterministic.
    let mut order: Vec<usize> = (0..tables.len()).collect();
    order.sort_by_key(|&idx| (tables[idx].len(), idx));

    let seed_idx = order[0];
    debug!(
        "intersecting {} tables, seed table {} ({} intervals)",
        tables.len(),
        seed_idx,
        tables[seed_idx].len()
    );

    // Every result must contain one interval from the seed, so the seed
    // bounds the initial candidate count.
    let mut candidates: Vec<MultiIndexInterval> = Vec::with_capacity(tables[seed_idx].len());
    for interval in tables[seed_idx].iter() {
        let mut idx_in_table = TableIds::from_elem(0, tables.len());
        idx_in_table[seed_idx] = interval.id;
        candidates.push(MultiIndexInterval {
            start: interval.start,
            end: interval.end,
            idx_in_table,
        });
    }

    // Two owned buffers swapped each stage; `matches` is reused across
    // every tree query.
    let mut survivors: Vec<MultiIndexInterval> = Vec::new();
    let mut matches = Vec::new();

    for &table_idx in &order[1..] {
        let tree = IntervalTree::build(tables[table_idx]);

        survivors.clear();
        for candidate in &candidates {
            matches.clear();
            tree.find_overlaps_into(candidate.start, candidate.end, &mut matches);

            for overlap in &matches {
                let mut idx_in_table = candidate.idx_in_table.clone();
                idx_in_table[table_idx] = overlap.id;
                survivors.push(MultiIndexInterval {
                    start: overlap.start,
                    end: overlap.end,
                    idx_in_table,
                });
            }
        }

        std::mem::swap(&mut candidates, &mut survivors);
        debug!(
            "table {}: {} candidates survive",
            table_idx,
            candidates.len()
        );

        // No candidate can ever repopulate an empty list.
        if candidates.is_empty() {
            break;
        }
    }

    candidates
}
