use std::sync::Arc;

use prefetched::{Error, PrefetchedValue, SerialLane, Status};

/// A fixed set of rows, each produced lazily by a [`PrefetchedValue`].
///
/// All rows share one [`SerialLane`], so production is serialized across the whole collection
/// and runs in the order rows were requested.
pub struct PrefetchedRows<T> {
    rows: Vec<PrefetchedValue<T>>,
    lane: SerialLane,
}

impl<T: Send + Sync + 'static> PrefetchedRows<T> {
    /// Creates `count` rows; row `i` is produced by `producer(i)` on first request.
    pub fn new(
        count: usize,
        lane_name: impl Into<String>,
        producer: impl Fn(usize) -> T + Send + Sync + 'static,
    ) -> Result<Self, Error> {
        let lane = SerialLane::new(lane_name)?;
        let producer = Arc::new(producer);
        let rows = (0..count)
            .map(|row| {
                let producer = Arc::clone(&producer);
                PrefetchedValue::with_lane(lane.clone(), move || producer(row))
            })
            .collect();
        adebug!(count, lane = lane.name(), "PrefetchedRows::new");
        Ok(Self { rows, lane })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn lane(&self) -> &SerialLane {
        &self.lane
    }

    fn get(&self, row: usize) -> Result<&PrefetchedValue<T>, Error> {
        self.rows.get(row).ok_or(Error::IndexOutOfRange {
            index: row,
            len: self.rows.len(),
        })
    }

    /// Call this with the rows the list expects to show soon.
    pub fn prefetch_rows(&self, rows: impl IntoIterator<Item = usize>) -> Result<(), Error> {
        for row in rows {
            self.get(row)?.prefetch();
        }
        Ok(())
    }

    /// Returns the row's value, producing it and blocking if necessary.
    pub fn value(&self, row: usize) -> Result<&T, Error> {
        Ok(self.get(row)?.value())
    }

    /// Returns the row's value only if it is already produced.
    pub fn try_value(&self, row: usize) -> Result<Option<&T>, Error> {
        Ok(self.get(row)?.try_value())
    }

    pub fn status(&self, row: usize) -> Result<Status, Error> {
        Ok(self.get(row)?.status())
    }
}

impl<T> core::fmt::Debug for PrefetchedRows<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrefetchedRows")
            .field("len", &self.rows.len())
            .field("lane", &self.lane)
            .finish()
    }
}
