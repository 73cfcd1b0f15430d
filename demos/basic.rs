use std::thread;
use std::time::Duration;

use prefetched::{DataWindow, DataWindowOptions, Identified, PrefetchedValue};

#[derive(Clone, Debug)]
struct Contact {
    id: u64,
    name: String,
}

impl Identified for Contact {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

fn main() {
    // Simulate a slow backing store: one query per page of identities.
    let fetch = |ids: &[u64]| {
        thread::sleep(Duration::from_millis(20));
        ids.iter()
            .map(|&id| Contact {
                id,
                name: format!("contact #{id}"),
            })
            .collect::<Vec<_>>()
    };

    let ids: Vec<u64> = (0..1_000_000).map(|i| 5_000_000 + i).collect();
    let window = DataWindow::new(
        DataWindowOptions::<Contact>::new(ids, fetch)
            .with_window_size(20)
            .with_pages_to_retain(3)
            .with_on_elements_ready(Some(|range: std::ops::Range<usize>| {
                println!("elements ready: {range:?}");
            })),
    )
    .expect("valid options");

    println!("get(123_456) = {:?}", window.get(123_456).expect("in range"));
    println!(
        "get_blocking(123_456) = {:?}",
        window.get_blocking(123_456).expect("in range")
    );
    println!("stats = {:?}", window.stats());

    // A single value produced off the calling thread, once.
    let greeting = PrefetchedValue::new(|| {
        thread::sleep(Duration::from_millis(10));
        String::from("hello from the lane")
    })
    .expect("lane spawned");
    greeting.prefetch();
    println!("status after prefetch = {:?}", greeting.status());
    println!("value = {}", greeting.value());
}
