use nalgebra as na;
use serde_derive::{Deserialize, Serialize};
use std::marker::PhantomData;

pub trait BBoxFormat: std::fmt::Debug {}

/// Left-top-width-height format, contains left top corner and width-height
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Ltwh;
impl BBoxFormat for Ltwh {}

/// Left-top-right-bottom format, contains left top and right bottom corners
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Ltrb;
impl BBoxFormat for Ltrb {}

/// X-y-width-height format, contains coordinates of the center of bbox and width-height
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Xywh;
impl BBoxFormat for Xywh {}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(transparent, bound = "")]
pub struct BBox<F: BBoxFormat> {
    coords: [f32; 4],
    #[serde(skip)]
    format: PhantomData<F>,
}

impl<F: BBoxFormat> From<BBox<F>> for [f32; 4] {
    fn from(bbox: BBox<F>) -> Self {
        bbox.coords
    }
}

impl<F: BBoxFormat> BBox<F> {
    #[inline(always)]
    fn new(coords: [f32; 4]) -> Self {
        BBox {
            coords,
            format: PhantomData,
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32; 4] {
        &self.coords
    }
}

impl BBox<Ltwh> {
    #[inline]
    pub fn ltwh(x1: f32, x2: f32, x3: f32, x4: f32) -> Self {
        BBox::new([x1, x2, x3, x4])
    }

    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.coords[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.coords[1]
    }

    #[inline(always)]
    pub fn width(&self) -> f32 {
        self.coords[2]
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.coords[3]
    }

    #[inline]
    pub fn as_ltrb(&self) -> BBox<Ltrb> {
        self.into()
    }

    #[inline]
    pub fn centroid(&self) -> na::Point2<f32> {
        na::Point2::new(
            self.left() + self.width() / 2.0,
            self.top() + self.height() / 2.0,
        )
    }
}

impl BBox<Ltrb> {
    #[inline]
    pub fn ltrb(x1: f32, x2: f32, x3: f32, x4: f32) -> Self {
        BBox::new([x1, x2, x3, x4])
    }

    #[inline]
    pub fn as_ltwh(&self) -> BBox<Ltwh> {
        self.into()
    }

    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.coords[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.coords[1]
    }

    #[inline(always)]
    pub fn right(&self) -> f32 {
        self.coords[2]
    }

    #[inline(always)]
    pub fn bottom(&self) -> f32 {
        self.coords[3]
    }

    #[inline]
    pub fn centroid(&self) -> na::Point2<f32> {
        na::Point2::new(
            (self.left() + self.right()) / 2.0,
            (self.top() + self.bottom()) / 2.0,
        )
    }
}

impl BBox<Xywh> {
    #[inline]
    pub fn xywh(x1: f32, x2: f32, x3: f32, x4: f32) -> Self {
        BBox::new([x1, x2, x3, x4])
    }

    #[inline(always)]
    pub fn as_ltrb(&self) -> BBox<Ltrb> {
        self.into()
    }

    #[inline(always)]
    pub fn cx(&self) -> f32 {
        self.coords[0]
    }

    #[inline(always)]
    pub fn cy(&self) -> f32 {
        self.coords[1]
    }

    #[inline(always)]
    pub fn width(&self) -> f32 {
        self.coords[2]
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.coords[3]
    }

    #[inline]
    pub fn centroid(&self) -> na::Point2<f32> {
        na::Point2::new(self.cx(), self.cy())
    }
}

impl<'a> From<&'a BBox<Ltwh>> for BBox<Ltrb> {
    #[inline]
    fn from(v: &'a BBox<Ltwh>) -> Self {
        let [l, t, w, h] = v.coords;

        BBox::new([l, t, l + w, t + h])
    }
}

impl<'a> From<&'a BBox<Xywh>> for BBox<Ltrb> {
    #[inline]
    fn from(v: &'a BBox<Xywh>) -> Self {
        let [cx, cy, w, h] = v.coords;

        BBox::new([cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0])
    }
}

impl<'a> From<&'a BBox<Ltrb>> for BBox<Ltwh> {
    #[inline]
    fn from(v: &'a BBox<Ltrb>) -> Self {
        let [l, t, r, b] = v.coords;

        BBox::new([l, t, r - l, b - t])
    }
}
