use std::thread;
use std::time::Duration;

use prefetched::{DataWindowOptions, Identified};
use prefetched_adapter::RowPrefetcher;

#[derive(Clone, Debug)]
struct Track {
    id: u64,
    title: String,
}

impl Identified for Track {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

fn main() {
    // Example: drive a data window from the list's visible range.
    let c = RowPrefetcher::new(
        DataWindowOptions::<Track>::new((0..200u64).collect::<Vec<_>>(), |ids: &[u64]| {
            thread::sleep(Duration::from_millis(10));
            ids.iter()
                .map(|&id| Track {
                    id,
                    title: format!("track {id}"),
                })
                .collect::<Vec<_>>()
        })
        .with_window_size(16),
    )
    .expect("valid options");

    for top in [0usize, 8, 16, 40, 41, 42] {
        let visible = top..top + 12;
        let scheduled = c.on_visible_range(visible.clone()).expect("in range");
        c.window().wait_for_fetch();
        let ready = c.ready_rows(visible.clone());
        println!(
            "visible={visible:?} scheduled_page={scheduled:?} ready={}/{} first={:?}",
            ready.len(),
            visible.len(),
            ready.first().map(|(_, t)| &t.title)
        );
    }
}
