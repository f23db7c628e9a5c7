use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb, Ltwh, Xywh};

/// Bounding box as delivered by the detector, in either corner or center form.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum DetectionBox {
    Ltrb(BBox<Ltrb>),
    Ltwh(BBox<Ltwh>),
    Xywh(BBox<Xywh>),
}

impl DetectionBox {
    /// Center of the box in `f32` pixels. Fractional centers are kept as is,
    /// never truncated to whole pixels, so a center cannot snap onto the
    /// boundary line.
    #[inline]
    pub fn centroid(&self) -> na::Point2<f32> {
        match self {
            DetectionBox::Ltrb(b) => b.centroid(),
            DetectionBox::Ltwh(b) => b.centroid(),
            DetectionBox::Xywh(b) => b.centroid(),
        }
    }

    #[inline]
    pub fn as_ltrb(&self) -> BBox<Ltrb> {
        match self {
            DetectionBox::Ltrb(b) => *b,
            DetectionBox::Ltwh(b) => b.as_ltrb(),
            DetectionBox::Xywh(b) => b.as_ltrb(),
        }
    }
}

impl From<BBox<Ltrb>> for DetectionBox {
    fn from(b: BBox<Ltrb>) -> Self {
        DetectionBox::Ltrb(b)
    }
}

impl From<BBox<Ltwh>> for DetectionBox {
    fn from(b: BBox<Ltwh>) -> Self {
        DetectionBox::Ltwh(b)
    }
}

impl From<BBox<Xywh>> for DetectionBox {
    fn from(b: BBox<Xywh>) -> Self {
        DetectionBox::Xywh(b)
    }
}

/// A single tracked detection of one frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    #[serde(rename = "id")]
    pub track_id: i64,
    #[serde(rename = "c")]
    pub class: i32,
    #[serde(rename = "p")]
    pub confidence: f32,
    pub bbox: DetectionBox,
}

impl Detection {
    pub fn new(track_id: i64, class: i32, confidence: f32, bbox: impl Into<DetectionBox>) -> Self {
        Self {
            track_id,
            class,
            confidence,
            bbox: bbox.into(),
        }
    }

    #[inline(always)]
    pub fn centroid(&self) -> na::Point2<f32> {
        self.bbox.centroid()
    }
}
