use std::collections::HashMap;

use crate::track::Track;
use nalgebra as na;

/// Per-track-id position history. Tracks are created on first sight and
/// live for the rest of the process.
#[derive(Debug, Default)]
pub struct TrackHistory {
    tracks: HashMap<i64, Track>,
}

impl TrackHistory {
    pub fn new() -> Self {
        Self {
            tracks: HashMap::new(),
        }
    }

    /// Appends `centroid` to the track's history, creating the track if unseen.
    pub fn observe(&mut self, track_id: i64, class: i32, centroid: na::Point2<f32>) -> &Track {
        let track = self
            .tracks
            .entry(track_id)
            .or_insert_with(|| Track::new(track_id, class));

        track.push(class, centroid);
        track
    }

    #[inline]
    pub fn latest_two(&self, track_id: i64) -> Option<(na::Point2<f32>, na::Point2<f32>)> {
        self.tracks.get(&track_id)?.latest_two()
    }

    #[inline]
    pub fn get(&self, track_id: i64) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, track_id: i64) -> Option<&mut Track> {
        self.tracks.get_mut(&track_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn crossed_count(&self) -> usize {
        self.tracks.values().filter(|t| t.has_crossed()).count()
    }
}
