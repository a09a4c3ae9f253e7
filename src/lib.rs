//! Spansect: multi-way interval intersection for trace analysis
//!
//! This crate provides the computational kernel behind an "intervals
//! overlapping across all inputs" table-valued function: an augmented
//! interval tree for range-overlap lookups, a multi-way intersector that
//! composes per-table overlap queries into a global intersection, and a
//! columnar materializer that shapes the result for a host query engine.
//!
//! The kernel is pure and per-invocation: inputs are borrowed read-only,
//! every tree and candidate list is owned by the invocation that created
//! it, and nothing is shared across invocations.

#![warn(missing_docs)]

/// Interval value type and sorted input sequences
pub mod interval;

/// Augmented interval tree for overlap queries
pub mod tree;

/// Multi-way intersection algorithm
pub mod intersect;

/// Columnar result tables
pub mod table;

/// Tagged-handle boundary with the host query engine
pub mod engine;

// Re-exports
pub use engine::{
    FunctionRegistry, INTERVAL_INTERSECT, InvokeError, MIN_ARG_COUNT, TableFn, Value,
    interval_intersect,
};
pub use intersect::{MultiIndexInterval, TableIds, intersect};
pub use interval::{Interval, SortedIntervals};
pub use table::{ID_COL_OFFSET, Table, TableBuilder, TableError, intersect_columns, materialize};
pub use tree::IntervalTree;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_through_public_api() {
        let cpu_busy = Value::Intervals(SortedIntervals::from_unsorted(vec![
            Interval::new(0, 40, 1),
            Interval::new(60, 90, 2),
        ]));
        let thread_running = Value::Intervals(SortedIntervals::from_unsorted(vec![
            Interval::new(10, 70, 1),
        ]));

        let result = interval_intersect(&[cpu_busy, thread_running]).unwrap();
        let table = result.into_table().unwrap();

        let mut rows: Vec<Vec<u64>> = table.rows().collect();
        rows.sort();
        assert_eq!(rows, vec![vec![10, 30, 1, 1], vec![60, 10, 2, 1]]);
    }
}
