use crate::circular_queue::CircularQueue;
use nalgebra as na;

/// Crossing detection only ever looks at the latest pair of centroids.
pub const HISTORY_CAPACITY: usize = 2;

#[derive(Debug, Clone)]
pub struct Track {
    pub track_id: i64,
    /// Most recently reported class id.
    pub class: i32,
    history: CircularQueue<na::Point2<f32>>,
    crossed: bool,
}

impl Track {
    pub(crate) fn new(track_id: i64, class: i32) -> Self {
        Self {
            track_id,
            class,
            history: CircularQueue::with_capacity(HISTORY_CAPACITY),
            crossed: false,
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, class: i32, centroid: na::Point2<f32>) {
        self.class = class;
        self.history.push(centroid);
    }

    /// Retained centroids, oldest first.
    #[inline]
    pub fn history(&self) -> impl Iterator<Item = &na::Point2<f32>> {
        self.history.asc_iter()
    }

    #[inline]
    pub fn position(&self) -> Option<na::Point2<f32>> {
        self.history.top().copied()
    }

    #[inline]
    pub fn latest_two(&self) -> Option<(na::Point2<f32>, na::Point2<f32>)> {
        self.history.latest_two()
    }

    #[inline]
    pub fn has_crossed(&self) -> bool {
        self.crossed
    }

    /// Latches the crossed flag. Returns false when it was already set.
    #[inline]
    pub(crate) fn mark_crossed(&mut self) -> bool {
        !std::mem::replace(&mut self.crossed, true)
    }
}
