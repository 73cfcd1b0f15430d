use std::thread;
use std::time::Duration;

use prefetched_adapter::PrefetchedRows;

fn main() {
    // Example: a table whose cells are produced lazily, one per row.
    //
    // The adapter flow is typically:
    // 1) when rows are about to scroll into view, call `prefetch_rows`
    // 2) when a cell is rendered, call `value` (blocks only if the row is not ready yet)
    let rows = PrefetchedRows::new(1000, "table-rows", |row| {
        // Simulate some work, e.g. a quick database read.
        thread::sleep(Duration::from_millis(2));
        format!("row {row}: {}", "lorem ipsum ".repeat(1 + row % 4))
    })
    .expect("lane spawned");

    rows.prefetch_rows(10..20).expect("rows in range");
    for row in 0..20 {
        println!(
            "status={:?} text={}",
            rows.status(row).expect("row in range"),
            rows.value(row).expect("row in range")
        );
    }
}
