use std::process;

use spansect::{FunctionRegistry, INTERVAL_INTERSECT, Interval, SortedIntervals, Value};

/// Print a usage message
fn print_usage() {
    println!("spansect - multi-way interval intersection");
    println!("Usage:");
    println!("  spansect TABLE TABLE [TABLE...]");
    println!("");
    println!("Each TABLE is a comma-separated list of START:END:ID triples,");
    println!("or the word 'empty' for an empty table, e.g.:");
    println!("  spansect 0:10:1,20:30:2 5:25:7");
    println!("");
    println!("Prints the intersection as rows of ts, dur and one id column");
    println!("per input table. Set RUST_LOG=debug for kernel tracing.");
}

/// Parse one START:END:ID triple
fn parse_interval(spec: &str) -> Result<Interval, String> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("expected START:END:ID, got '{}'", spec));
    }

    let start = parts[0]
        .parse::<u64>()
        .map_err(|_| format!("invalid start '{}'", parts[0]))?;
    let end = parts[1]
        .parse::<u64>()
        .map_err(|_| format!("invalid end '{}'", parts[1]))?;
    let id = parts[2]
        .parse::<u32>()
        .map_err(|_| format!("invalid id '{}'", parts[2]))?;

    Ok(Interval::new(start, end, id))
}

/// Parse one table argument into a sorted interval set
fn parse_table(arg: &str) -> Result<SortedIntervals, String> {
    if arg == "empty" {
        return Ok(SortedIntervals::new());
    }

    let mut intervals = Vec::new();
    for spec in arg.split(',') {
        intervals.push(parse_interval(spec)?);
    }
    Ok(SortedIntervals::from_unsorted(intervals))
}

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.contains(&"--help".to_string()) {
        print_usage();
        return Ok(());
    }

    let mut values = Vec::with_capacity(args.len());
    for arg in &args {
        values.push(Value::Intervals(parse_table(arg)?));
    }

    let registry = FunctionRegistry::with_builtins();
    let result = registry
        .invoke(INTERVAL_INTERSECT, &values)
        .map_err(|e| e.to_string())?;
    let table = result.into_table().expect("intersection returns a table");

    println!("{}", table.column_names().join("\t"));
    for row in table.rows() {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        println!("{}", cells.join("\t"));
    }
    println!("({} rows)", table.row_count());

    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(message) = run() {
        eprintln!("error: {}", message);
        process::exit(1);
    }
}
