// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Region-of-interest masks
//!
//! Masks are single-channel images the size of the frame. Pixels inside the
//! region carry the mask color's value, everything else is 0. The lane
//! pipeline uses a filled triangle whose apex sits at 60% of the height.

use crate::error::{Error, Result};
use crate::image_ops::bitwise_and;
use image::{GrayImage, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use lane_lite_lanes::ImageDims;
use serde::{Deserialize, Serialize};

/// Fill color of a mask, as an RGB triple
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MaskColor {
    Red,
    Blue,
    Green,
    Yellow,
    #[default]
    White,
    Black,
}

impl MaskColor {
    pub fn rgb(self) -> [u8; 3] {
        match self {
            MaskColor::Red => [255, 0, 0],
            MaskColor::Blue => [0, 0, 255],
            MaskColor::Green => [0, 255, 0],
            MaskColor::Yellow => [255, 255, 0],
            MaskColor::White => [255, 255, 255],
            MaskColor::Black => [0, 0, 0],
        }
    }

    /// Value written into a single-channel mask (the first component)
    pub fn mask_value(self) -> u8 {
        self.rgb()[0]
    }
}

/// Outline thickness, or a solid fill
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Stroke {
    Filled,
    Width(u32),
}

impl Default for Stroke {
    fn default() -> Self {
        Stroke::Width(2)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RoiShape {
    /// Road-facing triangle derived from the frame size
    #[default]
    Triangle,
    /// Axis-aligned rectangle between two corners
    Rectangle {
        start: (i32, i32),
        end: (i32, i32),
        #[serde(default)]
        stroke: Stroke,
    },
    Circle {
        center: (i32, i32),
        radius: u32,
        #[serde(default)]
        stroke: Stroke,
    },
}

/// Closed polygon with at least three vertices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoiPolygon {
    vertices: Vec<(i32, i32)>,
}

impl RoiPolygon {
    /// Repeated consecutive vertices collapse, and trailing vertices equal to
    /// the first are treated as closing points
    pub fn new(mut vertices: Vec<(i32, i32)>) -> Result<Self> {
        vertices.dedup();
        while vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return Err(Error::InvalidMaskVertices(vertices.len()));
        }
        Ok(Self { vertices })
    }

    pub fn triangle(dims: ImageDims) -> Self {
        Self {
            vertices: triangle_vertices(dims).to_vec(),
        }
    }

    pub fn vertices(&self) -> &[(i32, i32)] {
        &self.vertices
    }

    pub fn fill(&self, mask: &mut GrayImage, value: u8) {
        let points: Vec<Point<i32>> = self
            .vertices
            .iter()
            .map(|&(x, y)| Point::new(x, y))
            .collect();
        draw_polygon_mut(mask, &points, Luma([value]));
    }
}

/// Bottom-left, bottom-right and apex of the lane triangle
///
/// For an 800x400 frame: `(40, 400)`, `(760, 400)`, `(400, 240)`.
pub fn triangle_vertices(dims: ImageDims) -> [(i32, i32); 3] {
    let width = dims.width as f64;
    let height = dims.height as f64;
    [
        ((width * 0.05) as i32, dims.height as i32),
        ((width * 0.95) as i32, dims.height as i32),
        ((width * 0.5) as i32, (height * 0.6) as i32),
    ]
}

/// Build a frame-sized mask for `shape`
pub fn roi_mask(dims: ImageDims, shape: &RoiShape, color: MaskColor) -> GrayImage {
    let mut mask = GrayImage::new(dims.width, dims.height);
    let value = color.mask_value();

    match *shape {
        RoiShape::Triangle => RoiPolygon::triangle(dims).fill(&mut mask, value),
        RoiShape::Rectangle { start, end, stroke } => {
            draw_rectangle(&mut mask, start, end, stroke, value)
        }
        RoiShape::Circle {
            center,
            radius,
            stroke,
        } => draw_circle(&mut mask, center, radius, stroke, value),
    }

    mask
}

/// Keep only the edge pixels inside a white `shape` mask
pub fn apply_roi(edges: &GrayImage, shape: &RoiShape) -> Result<GrayImage> {
    let dims = ImageDims::new(edges.width(), edges.height())?;
    let mask = roi_mask(dims, shape, MaskColor::White);
    bitwise_and(edges, &mask)
}

fn draw_rectangle(mask: &mut GrayImage, start: (i32, i32), end: (i32, i32), stroke: Stroke, value: u8) {
    let (x0, x1) = (start.0.min(end.0), start.0.max(end.0));
    let (y0, y1) = (start.1.min(end.1), start.1.max(end.1));

    match stroke {
        Stroke::Filled => {
            let rect = Rect::at(x0, y0).of_size((x1 - x0 + 1) as u32, (y1 - y0 + 1) as u32);
            draw_filled_rect_mut(mask, rect, Luma([value]));
        }
        Stroke::Width(width) => {
            let half = width.max(1) as f64 / 2.0;
            let on_outline = |x: i32, y: i32| {
                let (x, y) = (x as f64, y as f64);
                let outer = x >= x0 as f64 - half
                    && x <= x1 as f64 + half
                    && y >= y0 as f64 - half
                    && y <= y1 as f64 + half;
                let inner = x > x0 as f64 + half
                    && x < x1 as f64 - half
                    && y > y0 as f64 + half
                    && y < y1 as f64 - half;
                outer && !inner
            };
            let pad = half.ceil() as i32;
            paint_where(mask, (x0 - pad, y0 - pad), (x1 + pad, y1 + pad), value, on_outline);
        }
    }
}

fn draw_circle(mask: &mut GrayImage, center: (i32, i32), radius: u32, stroke: Stroke, value: u8) {
    match stroke {
        Stroke::Filled => draw_filled_circle_mut(mask, center, radius as i32, Luma([value])),
        Stroke::Width(width) => {
            let half = width.max(1) as f64 / 2.0;
            let r = radius as f64;
            let on_ring = |x: i32, y: i32| {
                let dx = (x - center.0) as f64;
                let dy = (y - center.1) as f64;
                ((dx * dx + dy * dy).sqrt() - r).abs() <= half
            };
            let reach = radius as i32 + half.ceil() as i32;
            paint_where(
                mask,
                (center.0 - reach, center.1 - reach),
                (center.0 + reach, center.1 + reach),
                value,
                on_ring,
            );
        }
    }
}

/// Set every pixel of the inclusive box `min..=max` (clipped) that satisfies `inside`
fn paint_where(
    mask: &mut GrayImage,
    min: (i32, i32),
    max: (i32, i32),
    value: u8,
    inside: impl Fn(i32, i32) -> bool,
) {
    let x_lo = min.0.max(0);
    let y_lo = min.1.max(0);
    let x_hi = max.0.min(mask.width() as i32 - 1);
    let y_hi = max.1.min(mask.height() as i32 - 1);

    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            if inside(x, y) {
                mask.put_pixel(x as u32, y as u32, Luma([value]));
            }
        }
    }
}
