//! Boundary layer between the kernel and a host query engine
//!
//! Inputs and outputs cross this boundary as tagged handles: a [`Value`]
//! is either a sorted interval set (produced by an upstream build step)
//! or a result table (produced here). The host never sees interior
//! pointers; construction goes through the designated entry points only.

use log::debug;
use parking_lot::RwLock;

use crate::intersect::intersect;
use crate::interval::SortedIntervals;
use crate::table::{Table, TableBuilder, TableError, intersect_columns, materialize};

/// Name the intersection kernel registers under
pub const INTERVAL_INTERSECT: &str = "interval_intersect";

/// Minimum number of input tables for an intersection
pub const MIN_ARG_COUNT: usize = 2;

/// A tagged handle exchanged with the host query engine
#[derive(Debug, Clone)]
pub enum Value {
    /// A sorted interval set, borrowed by the kernel for one invocation
    Intervals(SortedIntervals),
    /// A result table, consumable as a relation by later query stages
    Table(Table),
}

impl Value {
    /// View the handle as an interval set, if it carries that tag
    pub fn as_intervals(&self) -> Option<&SortedIntervals> {
        match self {
            Value::Intervals(intervals) => Some(intervals),
            Value::Table(_) => None,
        }
    }

    /// View the handle as a table, if it carries that tag
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(table) => Some(table),
            Value::Intervals(_) => None,
        }
    }

    /// Consume the handle into a table, if it carries that tag
    pub fn into_table(self) -> Option<Table> {
        match self {
            Value::Table(table) => Some(table),
            Value::Intervals(_) => None,
        }
    }
}

/// Errors that can occur when invoking a kernel function
#[derive(Debug)]
pub enum InvokeError {
    /// Fewer arguments than the function supports
    WrongArgCount {
        /// Arguments actually supplied
        got: usize,
    },
    /// An argument does not carry the interval-set tag
    NotIntervalSet {
        /// Zero-based position of the offending argument
        position: usize,
    },
    /// Materialization of the result table failed
    Materialize(TableError),
    /// No function is registered under the requested name
    UnknownFunction(String),
}

impl From<TableError> for InvokeError {
    fn from(err: TableError) -> Self {
        InvokeError::Materialize(err)
    }
}

impl std::fmt::Display for InvokeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvokeError::WrongArgCount { got } => {
                write!(
                    f,
                    "interval intersection needs at least {} tables, got {}",
                    MIN_ARG_COUNT, got
                )
            }
            InvokeError::NotIntervalSet { position } => {
                write!(f, "argument {} is not an interval set", position)
            }
            InvokeError::Materialize(err) => write!(f, "materialization failed: {}", err),
            InvokeError::UnknownFunction(name) => write!(f, "unknown function: {}", name),
        }
    }
}

impl std::error::Error for InvokeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InvokeError::Materialize(err) => Some(err),
            _ => None,
        }
    }
}

/// Intersect N interval-set arguments and return the result as a table
///
/// Validation happens before any computation: at least
/// [`MIN_ARG_COUNT`] arguments, every one carrying the interval-set
/// tag. An empty input set anywhere yields a well-formed zero-row table
/// with the full column schema. The returned handle carries the table
/// tag so later query stages can treat it as a relation.
pub fn interval_intersect(args: &[Value]) -> Result<Value, InvokeError> {
    if args.len() < MIN_ARG_COUNT {
        return Err(InvokeError::WrongArgCount { got: args.len() });
    }

    let mut tables = Vec::with_capacity(args.len());
    for (position, arg) in args.iter().enumerate() {
        match arg.as_intervals() {
            Some(intervals) => tables.push(intervals),
            None => return Err(InvokeError::NotIntervalSet { position }),
        }
    }

    if tables.iter().any(|t| t.is_empty()) {
        debug!("empty input set, returning zero-row table");
        let builder = TableBuilder::new(intersect_columns(tables.len()));
        return Ok(Value::Table(builder.build()));
    }

    let results = intersect(&tables);
    debug!("{} result rows from {} tables", results.len(), tables.len());

    let table = materialize(&results, tables.len())?;
    Ok(Value::Table(table))
}

/// Signature of a kernel function invocable through the registry
pub type TableFn = fn(&[Value]) -> Result<Value, InvokeError>;

/// A minimal name-to-function registry
///
/// Hosts look kernel functions up by name the way the surrounding query
/// engine resolves table-valued functions. The map is guarded for use
/// from a host that registers on one thread and invokes on others;
/// invocations themselves share nothing and run concurrently.
pub struct FunctionRegistry {
    functions: RwLock<ahash::AHashMap<&'static str, TableFn>>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            functions: RwLock::new(ahash::AHashMap::new()),
        }
    }

    /// Create a registry with the built-in kernel functions registered
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(INTERVAL_INTERSECT, interval_intersect);
        registry
    }

    /// Register a function under a name, replacing any previous entry
    pub fn register(&self, name: &'static str, function: TableFn) {
        self.functions.write().insert(name, function);
    }

    /// Invoke a registered function by name
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, InvokeError> {
        let function = self
            .functions
            .read()
            .get(name)
            .copied()
            .ok_or_else(|| InvokeError::UnknownFunction(name.to_string()))?;
        function(args)
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
