use std::ops::Range;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use prefetched::{DataWindow, DataWindowOptions, Identified};

#[derive(Clone, Debug)]
struct Row {
    id: u32,
}

impl Identified for Row {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }
}

fn main() {
    // Simulate a list adapter that renders 10 rows at a time while the user scrolls.
    let (ready_tx, ready_rx) = mpsc::channel::<Range<usize>>();
    let ready_tx = std::sync::Mutex::new(ready_tx);

    let window = DataWindow::new(
        DataWindowOptions::<Row>::new((0..500u32).collect::<Vec<_>>(), |ids: &[u32]| {
            thread::sleep(Duration::from_millis(5));
            // Every 7th row is missing from the backing store.
            ids.iter()
                .filter(|&&id| id % 7 != 0)
                .map(|&id| Row { id })
                .collect::<Vec<_>>()
        })
        .with_window_size(25)
        .with_pages_to_retain(2)
        .with_on_elements_ready(Some(move |range: Range<usize>| {
            let _ = ready_tx.lock().map(|tx| tx.send(range));
        })),
    )
    .expect("valid options");

    for top in (0..500).step_by(40) {
        let visible = top..(top + 10).min(500);
        let shown = visible
            .clone()
            .filter(|&i| matches!(window.get(i), Ok(Some(_))))
            .count();
        println!("visible={visible:?} shown={shown}/10 cached={}", window.cache().len());

        while let Ok(range) = ready_rx.recv_timeout(Duration::from_millis(50)) {
            println!("  ready: {range:?}");
        }
    }

    println!("stats = {:?}", window.stats());
}
