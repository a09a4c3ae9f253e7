//! Columnar result tables for the intersection kernel
//!
//! The kernel hands its results back to the host query engine as a small
//! columnar table: a fixed `ts`/`dur` prefix followed by one `id_<k>`
//! column per input table. The builder appends one row per surviving
//! candidate and finalizes atomically, so a failed build never leaks a
//! partial table.

use crate::intersect::MultiIndexInterval;

/// Number of fixed columns (`ts`, `dur`) ahead of the id columns
pub const ID_COL_OFFSET: usize = 2;

/// Maximum number of rows a single materialization may produce
const MAX_ROWS: usize = 1 << 24;

/// Errors that can occur while materializing a result table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The row cap was reached before all results were appended
    RowLimit {
        /// The implementation-defined cap that was hit
        limit: usize,
    },
    /// A row's width does not match the table schema
    ArityMismatch {
        /// Columns in the schema
        expected: usize,
        /// Values supplied for the row
        got: usize,
    },
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::RowLimit { limit } => {
                write!(f, "result table exceeds row limit of {}", limit)
            }
            TableError::ArityMismatch { expected, got } => {
                write!(f, "row has {} values but schema has {} columns", got, expected)
            }
        }
    }
}

impl std::error::Error for TableError {}

/// Column names for an intersection over `table_count` inputs
///
/// Fixed prefix `ts` and `dur`, then `id_0 .. id_{table_count-1}` by
/// original argument position.
pub fn intersect_columns(table_count: usize) -> Vec<String> {
    let mut columns = Vec::with_capacity(table_count + ID_COL_OFFSET);
    columns.push("ts".to_string());
    columns.push("dur".to_string());
    for i in 0..table_count {
        columns.push(format!("id_{}", i));
    }
    columns
}

/// An immutable columnar table of u64 cells
///
/// The schema is always present, even for a zero-row table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    columns: Vec<String>,
    cells: Vec<Vec<u64>>,
}

impl Table {
    /// Column names in schema order
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.cells.first().map_or(0, |col| col.len())
    }

    /// Read one cell, if the row and column exist
    pub fn cell(&self, row: usize, col: usize) -> Option<u64> {
        self.cells.get(col).and_then(|c| c.get(row)).copied()
    }

    /// Read a whole row in schema order, if it exists
    pub fn row(&self, row: usize) -> Option<Vec<u64>> {
        if row >= self.row_count() {
            return None;
        }
        Some(self.cells.iter().map(|col| col[row]).collect())
    }

    /// Iterate over rows in insertion order
    pub fn rows(&self) -> impl Iterator<Item = Vec<u64>> + '_ {
        (0..self.row_count()).map(move |r| self.row(r).unwrap())
    }
}

/// Incremental builder for a [`Table`]
///
/// Rows append one at a time; [`TableBuilder::build`] finalizes. Any
/// error aborts the whole materialization.
#[derive(Debug)]
pub struct TableBuilder {
    columns: Vec<String>,
    cells: Vec<Vec<u64>>,
}

impl TableBuilder {
    /// Create a builder for the given schema
    pub fn new(columns: Vec<String>) -> Self {
        let cells = vec![Vec::new(); columns.len()];
        Self { columns, cells }
    }

    /// Number of rows appended so far
    pub fn row_count(&self) -> usize {
        self.cells.first().map_or(0, |col| col.len())
    }

    /// Append one row of cells in schema order
    pub fn push_row(&mut self, row: &[u64]) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::ArityMismatch {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        if self.row_count() >= MAX_ROWS {
            return Err(TableError::RowLimit { limit: MAX_ROWS });
        }
        for (col, &value) in self.cells.iter_mut().zip(row) {
            col.push(value);
        }
        Ok(())
    }

    /// Append the row for one intersection result
    ///
    /// `ts` is the overlap start, `dur` its saturating length, followed
    /// by the matched row id per input table.
    pub fn push_result(
        &mut self,
        result: &MultiIndexInterval,
        table_count: usize,
    ) -> Result<(), TableError> {
        let mut row = Vec::with_capacity(table_count + ID_COL_OFFSET);
        row.push(result.start);
        row.push(result.end.saturating_sub(result.start));
        for i in 0..table_count {
            row.push(u64::from(result.idx_in_table[i]));
        }
        self.push_row(&row)
    }

    /// Finalize into an immutable table
    pub fn build(self) -> Table {
        Table {
            columns: self.columns,
            cells: self.cells,
        }
    }
}

/// Materialize intersection results into a table
///
/// One row per result, in the order supplied (which the intersector
/// itself leaves unspecified). Fails atomically: on error no table is
/// returned.
pub fn materialize(
    results: &[MultiIndexInterval],
    table_count: usize,
) -> Result<Table, TableError> {
    let mut builder = TableBuilder::new(intersect_columns(table_count));
    for result in results {
        builder.push_result(result, table_count)?;
    }
    Ok(builder.build())
}
