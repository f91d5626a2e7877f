// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lane overlay rendering
//!
//! Colors are given in BGR, the pipeline's working order, and translated to
//! whatever order the target frame stores.

use crate::error::{Error, Result};
use crate::frame::{ChannelOrder, Frame};
use image::{Rgb, RgbImage};
use lane_lite_lanes::{LaneLines, LaneSide, Segment};
use serde::{Deserialize, Serialize};

/// Color used for raw segment debug rendering (BGR blue)
pub const SEGMENT_COLOR: [u8; 3] = [255, 0, 0];
pub const SEGMENT_THICKNESS: u32 = 5;

/// Appearance of the lane overlay and how it is blended into the frame
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LaneStyle {
    /// BGR
    pub left_color: [u8; 3],
    /// BGR
    pub right_color: [u8; 3],
    pub thickness: u32,
    /// Weight of the original frame
    pub alpha: f64,
    /// Weight of the lane overlay
    pub beta: f64,
    /// Added to every blended channel
    pub gamma: f64,
}

impl Default for LaneStyle {
    fn default() -> Self {
        Self {
            left_color: [255, 0, 0],
            right_color: [0, 255, 0],
            thickness: 10,
            alpha: 0.8,
            beta: 1.0,
            gamma: 1.0,
        }
    }
}

impl LaneStyle {
    pub fn color(&self, side: LaneSide) -> [u8; 3] {
        match side {
            LaneSide::Left => self.left_color,
            LaneSide::Right => self.right_color,
        }
    }
}

/// Draw a line with round caps: every pixel within `thickness / 2` of the
/// segment is painted
pub fn draw_thick_line_mut(
    canvas: &mut RgbImage,
    start: (i32, i32),
    end: (i32, i32),
    color: Rgb<u8>,
    thickness: u32,
) {
    if canvas.width() == 0 || canvas.height() == 0 {
        return;
    }
    let radius = thickness.max(1) as f64 / 2.0;
    let pad = radius.ceil() as i32;

    let x_lo = (start.0.min(end.0) - pad).max(0);
    let y_lo = (start.1.min(end.1) - pad).max(0);
    let x_hi = (start.0.max(end.0) + pad).min(canvas.width() as i32 - 1);
    let y_hi = (start.1.max(end.1) + pad).min(canvas.height() as i32 - 1);

    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            if point_to_segment_distance((x, y), start, end) <= radius {
                canvas.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

/// Perpendicular distance from a pixel to a segment, clamped to its ends
fn point_to_segment_distance(point: (i32, i32), start: (i32, i32), end: (i32, i32)) -> f64 {
    let (px, py) = (point.0 as f64, point.1 as f64);
    let (sx, sy) = (start.0 as f64, start.1 as f64);
    let dx = end.0 as f64 - sx;
    let dy = end.1 as f64 - sy;
    let length_sq = dx * dx + dy * dy;

    if length_sq < 1e-10 {
        return ((px - sx).powi(2) + (py - sy).powi(2)).sqrt();
    }

    let t = (((px - sx) * dx + (py - sy) * dy) / length_sq).clamp(0.0, 1.0);
    let cx = sx + t * dx;
    let cy = sy + t * dy;
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

/// A BGR color as a pixel in the given storage order
fn pixel_for(bgr: [u8; 3], order: ChannelOrder) -> Rgb<u8> {
    match order {
        ChannelOrder::Bgr => Rgb(bgr),
        ChannelOrder::Rgb => Rgb([bgr[2], bgr[1], bgr[0]]),
    }
}

/// Blank canvas the size of `frame` with the fitted lane lines drawn on it
pub fn draw_lane_lines(frame: &Frame, lanes: &LaneLines, style: &LaneStyle) -> Frame {
    let mut buffer = RgbImage::new(frame.width(), frame.height());

    for side in [LaneSide::Left, LaneSide::Right] {
        if let Some(line) = lanes.side(side) {
            draw_thick_line_mut(
                &mut buffer,
                line.start(),
                line.end(),
                pixel_for(style.color(side), frame.order()),
                style.thickness,
            );
        }
    }

    frame.with_buffer(buffer)
}

/// Blank canvas with every raw segment drawn, for inspecting the detector
pub fn draw_segments(frame: &Frame, segments: &[Segment]) -> Frame {
    let mut buffer = RgbImage::new(frame.width(), frame.height());
    let color = pixel_for(SEGMENT_COLOR, frame.order());

    for s in segments {
        draw_thick_line_mut(&mut buffer, (s.x1, s.y1), (s.x2, s.y2), color, SEGMENT_THICKNESS);
    }

    frame.with_buffer(buffer)
}

/// `src * alpha + overlay * beta + gamma` per channel, rounded half to even
/// and saturated
///
/// The result keeps `src`'s channel order; `overlay` is reordered if needed.
pub fn add_weighted(src: &Frame, alpha: f64, overlay: &Frame, beta: f64, gamma: f64) -> Result<Frame> {
    if (src.width(), src.height()) != (overlay.width(), overlay.height()) {
        return Err(Error::SizeMismatch(format!(
            "cannot blend {}x{} with {}x{}",
            src.width(),
            src.height(),
            overlay.width(),
            overlay.height()
        )));
    }
    let overlay = overlay.to_order(src.order());

    let mut out = src.buffer().clone();
    for (dst, o) in out.pixels_mut().zip(overlay.buffer().pixels()) {
        for c in 0..3 {
            let value = dst.0[c] as f64 * alpha + o.0[c] as f64 * beta + gamma;
            dst.0[c] = value.round_ties_even().clamp(0.0, 255.0) as u8;
        }
    }

    Ok(src.with_buffer(out))
}

/// Lanes drawn on a blank canvas and blended into the frame
///
/// The result keeps the frame's channel order.
pub fn composite(frame: &Frame, lanes: &LaneLines, style: &LaneStyle) -> Result<Frame> {
    let lane_image = draw_lane_lines(frame, lanes, style);
    add_weighted(frame, style.alpha, &lane_image, style.beta, style.gamma)
}
