use crate::*;

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use prefetched::{DataWindowOptions, Error, Identified, Status};

#[derive(Clone, Debug, PartialEq)]
struct Message {
    id: u32,
    body: String,
}

impl Identified for Message {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }
}

fn controller(len: u32, window_size: usize) -> (RowPrefetcher<Message>, Arc<Mutex<Vec<u32>>>) {
    let fetched_pages = Arc::new(Mutex::new(Vec::new()));
    let fetcher = {
        let fetched_pages = Arc::clone(&fetched_pages);
        move |ids: &[u32]| {
            fetched_pages.lock().unwrap().push(ids[0]);
            ids.iter()
                .map(|&id| Message {
                    id,
                    body: format!("message {id}"),
                })
                .collect::<Vec<_>>()
        }
    };
    let c = RowPrefetcher::new(
        DataWindowOptions::<Message>::new((0..len).collect::<Vec<_>>(), fetcher)
            .with_window_size(window_size),
    )
    .unwrap();
    (c, fetched_pages)
}

#[test]
fn visible_range_schedules_first_missing_page() {
    let (c, fetched) = controller(100, 10);
    assert_eq!(c.on_visible_range(12..18).unwrap(), Some(1));
    c.window().wait_idle();

    // First and last visible rows share a cached page; the next page is requested.
    assert_eq!(c.on_visible_range(12..18).unwrap(), Some(2));
    c.window().wait_idle();

    assert_eq!(c.on_visible_range(12..18).unwrap(), None);
    assert_eq!(*fetched.lock().unwrap(), vec![10, 20]);
}

#[test]
fn visible_range_spanning_pages_fetches_both_in_turn() {
    let (c, fetched) = controller(100, 10);
    assert_eq!(c.on_visible_range(8..14).unwrap(), Some(0));
    c.window().wait_idle();
    assert_eq!(c.on_visible_range(8..14).unwrap(), Some(1));
    c.window().wait_idle();
    assert_eq!(*fetched.lock().unwrap(), vec![0, 10]);
}

#[test]
fn visible_range_is_clamped_and_empty_range_is_ignored() {
    let (c, fetched) = controller(25, 10);
    assert_eq!(c.on_visible_range(5..5).unwrap(), None);
    assert_eq!(c.on_visible_range(30..40).unwrap(), None);
    assert_eq!(c.on_visible_range(22..40).unwrap(), Some(2));
    c.window().wait_idle();
    // Last page: nothing after it to request.
    assert_eq!(c.on_visible_range(22..40).unwrap(), None);
    assert_eq!(*fetched.lock().unwrap(), vec![20]);
}

#[test]
fn prefetch_rows_dedupes_pages_and_validates_indices() {
    let (c, fetched) = controller(50, 10);
    assert_eq!(c.prefetch_rows([3, 4, 5]).unwrap(), 1);
    c.window().wait_idle();
    assert_eq!(c.prefetch_rows([3, 4, 5]).unwrap(), 0);
    assert!(matches!(
        c.prefetch_rows([1, 50]),
        Err(Error::IndexOutOfRange { index: 50, len: 50 })
    ));
    c.window().wait_idle();
    assert_eq!(*fetched.lock().unwrap(), vec![0]);
}

#[test]
fn ready_rows_reports_only_cached_rows() {
    let (c, _) = controller(30, 10);
    assert!(c.ready_rows(0..10).is_empty());
    assert_eq!(
        c.row_blocking(15).unwrap().map(|m| m.body),
        Some("message 15".into())
    );
    let ready = c.ready_rows(5..25);
    assert_eq!(
        ready.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
        (10..20).collect::<Vec<_>>()
    );
    assert!(ready.iter().all(|(i, m)| m.id == *i as u32));
    // Reading ready rows never schedules anything.
    assert!(!c.window().is_prefetching());
    assert_eq!(c.window().stats().fetches_scheduled, 1);
}

#[test]
fn row_miss_then_hit() {
    let (c, _) = controller(30, 10);
    assert_eq!(c.row(7).unwrap(), None);
    c.window().wait_for_fetch();
    assert_eq!(c.row(7).unwrap().map(|m| m.id), Some(7));
    assert_eq!(c.into_window().len(), 30);
}

#[test]
fn prefetched_rows_produce_lazily_and_once() {
    let produced = Arc::new(AtomicUsize::new(0));
    let rows = {
        let produced = Arc::clone(&produced);
        PrefetchedRows::new(100, "rows", move |row| {
            produced.fetch_add(1, Ordering::SeqCst);
            format!("row {row}")
        })
        .unwrap()
    };
    assert_eq!(rows.len(), 100);
    assert_eq!(rows.status(3).unwrap(), Status::Fresh);

    rows.prefetch_rows([3, 4, 5, 4]).unwrap();
    rows.lane().wait_idle();
    assert_eq!(produced.load(Ordering::SeqCst), 3);
    assert_eq!(rows.try_value(4).unwrap().map(String::as_str), Some("row 4"));
    assert_eq!(rows.try_value(6).unwrap(), None);

    assert_eq!(rows.value(6).unwrap(), "row 6");
    assert_eq!(rows.value(3).unwrap(), "row 3");
    assert_eq!(produced.load(Ordering::SeqCst), 4);
    assert!(matches!(
        rows.value(100),
        Err(Error::IndexOutOfRange { index: 100, len: 100 })
    ));
}
