use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_derive::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::class::{Class, ClassTable};
use crate::crossing::Direction;
use crate::error::Error;

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionCounts {
    #[serde(rename = "in")]
    pub inward: u64,
    #[serde(rename = "out")]
    pub outward: u64,
}

impl DirectionCounts {
    #[inline]
    pub fn get(&self, direction: Direction) -> u64 {
        match direction {
            Direction::In => self.inward,
            Direction::Out => self.outward,
        }
    }

    #[inline]
    pub fn total(&self) -> u64 {
        self.inward + self.outward
    }

    #[inline]
    fn bump(&mut self, direction: Direction) {
        match direction {
            Direction::In => self.inward += 1,
            Direction::Out => self.outward += 1,
        }
    }
}

/// In/out counters for every class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountTable(ClassTable<DirectionCounts>);

impl CountTable {
    #[inline]
    pub fn get(&self, class: Class) -> DirectionCounts {
        self.0[class]
    }

    #[inline]
    pub fn increment(&mut self, class: Class, direction: Direction) {
        self.0[class].bump(direction);
    }

    pub fn merge(&mut self, other: &CountTable) {
        for (class, counts) in self.0.iter_mut() {
            counts.inward += other.0[class].inward;
            counts.outward += other.0[class].outward;
        }
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (Class, &DirectionCounts)> {
        self.0.iter()
    }

    pub fn total(&self) -> u64 {
        self.iter().map(|(_, c)| c.total()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

// `{"worker": {"in": 2, "out": 1}, ...}`
impl Serialize for CountTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Class::COUNT))?;
        for (class, counts) in self.iter() {
            map.serialize_entry(class.name(), counts)?;
        }
        map.end()
    }
}

/// Shared counters. Frame processing increments, the recorder drains.
#[derive(Debug, Default)]
pub struct CountAggregator {
    table: Mutex<CountTable>,
}

impl CountAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with `UnknownClass` for ids outside the configured class set.
    pub fn increment(&self, class: i32, direction: Direction) -> Result<(), Error> {
        let class = Class::from_id(class)?;
        self.lock().increment(class, direction);

        Ok(())
    }

    /// Returns the current table and zeroes it under a single lock.
    pub fn snapshot_and_reset(&self) -> CountTable {
        std::mem::take(&mut *self.lock())
    }

    /// Adds a previously drained snapshot back.
    pub fn merge(&self, table: &CountTable) {
        self.lock().merge(table);
    }

    pub fn snapshot(&self) -> CountTable {
        *self.lock()
    }

    // Counters stay consistent even if a holder panicked.
    #[inline]
    fn lock(&self) -> MutexGuard<'_, CountTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn snapshot_returns_and_clears() {
        let agg = CountAggregator::new();
        agg.increment(0, Direction::In).unwrap();
        agg.increment(0, Direction::In).unwrap();
        agg.increment(0, Direction::Out).unwrap();

        let snap = agg.snapshot_and_reset();
        assert_eq!(snap.get(Class::Worker), DirectionCounts { inward: 2, outward: 1 });
        assert_eq!(snap.get(Class::Drone), DirectionCounts::default());

        agg.increment(0, Direction::In).unwrap();
        let snap = agg.snapshot_and_reset();
        assert_eq!(snap.get(Class::Worker), DirectionCounts { inward: 1, outward: 0 });
        assert!(agg.snapshot().is_empty());
    }

    #[test]
    fn unknown_class_is_fatal() {
        let agg = CountAggregator::new();
        assert!(matches!(
            agg.increment(5, Direction::In),
            Err(Error::UnknownClass(5))
        ));
        assert!(agg.snapshot().is_empty());
    }

    #[test]
    fn merge_restores_drained_counts() {
        let agg = CountAggregator::new();
        agg.increment(2, Direction::Out).unwrap();
        let snap = agg.snapshot_and_reset();

        agg.increment(2, Direction::Out).unwrap();
        agg.merge(&snap);

        assert_eq!(agg.snapshot().get(Class::Drone).outward, 2);
    }

    #[test]
    fn serializes_by_class_name() {
        let mut table = CountTable::default();
        table.increment(Class::Pollen, Direction::In);

        let json = serde_json::to_value(table).unwrap();
        assert_eq!(json["pollen"]["in"], 1);
        assert_eq!(json["pollen"]["out"], 0);
        assert_eq!(json["worker"]["in"], 0);
    }

    #[test]
    fn no_increment_is_lost_across_concurrent_flushes() {
        let agg = Arc::new(CountAggregator::new());
        let per_thread = 10_000;

        let writers: Vec<_> = (0..3)
            .map(|class| {
                let agg = Arc::clone(&agg);
                thread::spawn(move || {
                    for i in 0..per_thread {
                        let dir = if i % 2 == 0 { Direction::In } else { Direction::Out };
                        agg.increment(class, dir).unwrap();
                    }
                })
            })
            .collect();

        let mut drained = CountTable::default();
        for _ in 0..100 {
            drained.merge(&agg.snapshot_and_reset());
        }

        for w in writers {
            w.join().unwrap();
        }
        drained.merge(&agg.snapshot_and_reset());

        assert_eq!(drained.total(), 3 * per_thread as u64);
        for (_, counts) in drained.iter() {
            assert_eq!(counts.inward, per_thread as u64 / 2);
            assert_eq!(counts.outward, per_thread as u64 / 2);
        }
    }
}
