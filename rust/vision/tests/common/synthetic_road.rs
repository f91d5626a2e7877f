// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synthetic road images and edge maps for pipeline tests

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use lane_lite_vision::draw::draw_thick_line_mut;
use std::path::PathBuf;

/// Left lane edge in a 640x360 frame: negative slope, left of center
pub const LEFT_EDGE: ((f32, f32), (f32, f32)) = ((200.0, 355.0), (280.0, 260.0));

/// Right lane edge in a 640x360 frame: positive slope, right of center
pub const RIGHT_EDGE: ((f32, f32), (f32, f32)) = ((440.0, 355.0), (360.0, 260.0));

/// Black edge map with one-pixel white lines
pub fn edge_map(width: u32, height: u32, lines: &[((f32, f32), (f32, f32))]) -> GrayImage {
    let mut img = GrayImage::new(width, height);
    for &(start, end) in lines {
        draw_line_segment_mut(&mut img, start, end, Luma([255]));
    }
    img
}

/// 640x360 edge map with two well-separated lane edges
pub fn two_lane_edges() -> GrayImage {
    edge_map(640, 360, &[LEFT_EDGE, RIGHT_EDGE])
}

/// Full-resolution 1280x720 road: dark asphalt with two bright markings
/// that land on `LEFT_EDGE` and `RIGHT_EDGE` after halving
pub fn road_image() -> RgbImage {
    let mut img = RgbImage::from_pixel(1280, 720, Rgb([60, 60, 60]));
    let white = Rgb([240, 240, 240]);
    draw_thick_line_mut(&mut img, (400, 710), (560, 520), white, 12);
    draw_thick_line_mut(&mut img, (880, 710), (720, 520), white, 12);
    img
}

/// Fresh per-test scratch directory under the system temp dir
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("lane-lite-it-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
