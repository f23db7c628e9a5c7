use nalgebra as na;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::Error;
use crate::history::TrackHistory;
use crate::math;

/// Fixed counting line in frame pixel coordinates.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(try_from = "[[f32; 2]; 2]", into = "[[f32; 2]; 2]")]
pub struct BoundaryLine {
    p1: na::Point2<f32>,
    p2: na::Point2<f32>,
}

impl BoundaryLine {
    pub fn new(p1: na::Point2<f32>, p2: na::Point2<f32>) -> Result<Self, Error> {
        let finite = [p1.x, p1.y, p2.x, p2.y].iter().all(|v| v.is_finite());

        if !finite || p1 == p2 {
            return Err(Error::DegenerateBoundary);
        }

        Ok(Self { p1, p2 })
    }

    /// Horizontal line through the middle of a `width x height` frame.
    pub fn horizontal_midline(width: u32, height: u32) -> Result<Self, Error> {
        let y = (height / 2) as f32;

        Self::new(na::Point2::new(0.0, y), na::Point2::new(width as f32, y))
    }

    #[inline]
    pub fn p1(&self) -> na::Point2<f32> {
        self.p1
    }

    #[inline]
    pub fn p2(&self) -> na::Point2<f32> {
        self.p2
    }

    #[inline]
    pub fn is_crossed_by(&self, from: na::Point2<f32>, to: na::Point2<f32>) -> bool {
        math::segments_cross(from, to, self.p1, self.p2)
    }
}

impl TryFrom<[[f32; 2]; 2]> for BoundaryLine {
    type Error = Error;

    fn try_from([a, b]: [[f32; 2]; 2]) -> Result<Self, Error> {
        BoundaryLine::new(na::Point2::new(a[0], a[1]), na::Point2::new(b[0], b[1]))
    }
}

impl From<BoundaryLine> for [[f32; 2]; 2] {
    fn from(line: BoundaryLine) -> Self {
        [[line.p1.x, line.p1.y], [line.p2.x, line.p2.y]]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Moving up the image (decreasing y) is "in", anything else is "out".
    #[inline]
    pub fn of_step(prev: na::Point2<f32>, curr: na::Point2<f32>) -> Self {
        if curr.y < prev.y {
            Direction::In
        } else {
            Direction::Out
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A track's one and only counted crossing.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub track_id: i64,
    pub class: i32,
    pub direction: Direction,
}

#[derive(Debug, Clone)]
pub struct CrossingDetector {
    line: BoundaryLine,
}

impl CrossingDetector {
    pub fn new(line: BoundaryLine) -> Self {
        Self { line }
    }

    #[inline]
    pub fn line(&self) -> &BoundaryLine {
        &self.line
    }

    /// Decides whether the track's latest step crossed the line. A track
    /// yields at most one crossing over its whole lifetime.
    pub fn evaluate(&self, history: &mut TrackHistory, track_id: i64) -> Option<Crossing> {
        let track = history.get_mut(track_id)?;

        if track.has_crossed() {
            return None;
        }

        let (prev, curr) = track.latest_two()?;

        if !self.line.is_crossed_by(prev, curr) {
            return None;
        }

        track.mark_crossed();

        let crossing = Crossing {
            track_id,
            class: track.class,
            direction: Direction::of_step(prev, curr),
        };

        debug!(
            track_id,
            class = crossing.class,
            direction = %crossing.direction,
            "track crossed the boundary"
        );

        Some(crossing)
    }
}
