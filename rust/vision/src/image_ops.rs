// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Image processing operations for lane detection
//!
//! Parameters that need validation (`KernelSize`, `CannyThresholds`,
//! `Kernel2d`) are parsed once into typed values; the operations themselves
//! take those types and cannot fail on them.

use crate::error::{Error, Result};
use crate::frame::{Channel, Frame};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use serde::{Deserialize, Serialize};

/// Positive odd blur aperture, possibly different along each axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelSize {
    width: u32,
    height: u32,
}

impl KernelSize {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        for k in [width, height] {
            if k == 0 || k % 2 == 0 {
                return Err(Error::InvalidKernel(format!(
                    "kernel size must be a positive odd integer, got {width}x{height}"
                )));
            }
        }
        Ok(Self { width, height })
    }

    pub fn square(size: u32) -> Result<Self> {
        Self::new(size, size)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn radii(&self) -> (u32, u32) {
        (self.width / 2, self.height / 2)
    }
}

/// Hysteresis thresholds for Canny, with `0 <= low < high`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CannyThresholds {
    low: f32,
    high: f32,
}

impl CannyThresholds {
    pub fn new(low: f32, high: f32) -> Result<Self> {
        if !low.is_finite() || !high.is_finite() || low < 0.0 || high < 0.0 || low >= high {
            return Err(Error::InvalidThreshold(format!(
                "thresholds must be non-negative with lower < higher, got {low} and {high}"
            )));
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> f32 {
        self.low
    }

    pub fn high(&self) -> f32 {
        self.high
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlipAxis {
    /// Mirror left-right
    Horizontal,
    /// Mirror top-bottom
    Vertical,
    Both,
}

/// Quarter-turn rotations; the canvas always grows to fit the result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Rotation {
    Deg90,
    Deg180,
    Deg270,
}

// ---------------------------------------------------------------------------
// Resize
// ---------------------------------------------------------------------------

/// Scale by `fx` horizontally and `fy` (default `fx`) vertically, bilinear
pub fn resize_by_factor(frame: &Frame, fx: f64, fy: Option<f64>) -> Result<Frame> {
    let fy = fy.unwrap_or(fx);
    if !(fx.is_finite() && fy.is_finite() && fx > 0.0 && fy > 0.0) {
        return Err(Error::InvalidScale(format!(
            "scaling factors must be positive, got {fx} and {fy}"
        )));
    }

    let width = (frame.width() as f64 * fx).round() as u32;
    let height = (frame.height() as f64 * fy).round() as u32;
    resize_to(frame, width, height)
}

/// Resize to an exact size, bilinear
pub fn resize_to(frame: &Frame, width: u32, height: u32) -> Result<Frame> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidScale(format!(
            "target size must be positive, got {width}x{height}"
        )));
    }
    let resized = imageops::resize(frame.buffer(), width, height, FilterType::Triangle);
    Ok(frame.with_buffer(resized))
}

/// Resize keeping the aspect ratio
///
/// A given width wins over a given height; the other side is derived and
/// truncated. With neither, the frame is halved.
pub fn resize_by_aspect_ratio(
    frame: &Frame,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<Frame> {
    let ratio = aspect_ratio(frame);
    let (width, height) = match (width, height) {
        (Some(w), _) => (w, (w as f64 / ratio) as u32),
        (None, Some(h)) => ((h as f64 * ratio) as u32, h),
        (None, None) => {
            let w = frame.width() / 2;
            (w, (w as f64 / ratio) as u32)
        }
    };
    resize_to(frame, width, height)
}

/// `width / height`
pub fn aspect_ratio(frame: &Frame) -> f64 {
    frame.width() as f64 / frame.height() as f64
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// Luminance using ITU-R BT.601 weights, honoring the frame's channel order
pub fn to_grayscale(frame: &Frame) -> GrayImage {
    let blue = frame.channel(Channel::Blue);
    let green = frame.channel(Channel::Green);
    let red = frame.channel(Channel::Red);

    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let b = blue.get_pixel(x, y).0[0] as f32;
        let g = green.get_pixel(x, y).0[0] as f32;
        let r = red.get_pixel(x, y).0[0] as f32;
        let luma = (0.299 * r + 0.587 * g + 0.114 * b).round();
        Luma([luma.clamp(0.0, 255.0) as u8])
    })
}

// ---------------------------------------------------------------------------
// Blur
// ---------------------------------------------------------------------------

/// Normalized box (averaging) filter
pub fn box_blur(image: &GrayImage, kernel: KernelSize) -> GrayImage {
    let (rx, ry) = kernel.radii();
    imageproc::filter::box_filter(image, rx, ry)
}

/// Median filter over a `width x height` window
pub fn median_blur(image: &GrayImage, kernel: KernelSize) -> GrayImage {
    let (rx, ry) = kernel.radii();
    imageproc::filter::median_filter(image, rx, ry)
}

/// Separable Gaussian blur, borders padded by repeating the edge pixel
///
/// `sigma <= 0` derives the deviation from the kernel size. A positive
/// `sigma` defines the kernel extent itself and the aperture is ignored.
pub fn gaussian_blur(image: &GrayImage, kernel: KernelSize, sigma: f64) -> GrayImage {
    if sigma > 0.0 {
        return imageproc::filter::gaussian_blur_f32(image, sigma as f32);
    }

    let kx = gaussian_kernel(kernel.width(), sigma);
    if kernel.width() == kernel.height() {
        imageproc::filter::separable_filter_equal(image, &kx)
    } else {
        let ky = gaussian_kernel(kernel.height(), sigma);
        imageproc::filter::separable_filter(image, &kx, &ky)
    }
}

/// 1-D Gaussian taps for an odd `size`, summing to one
fn gaussian_kernel(size: u32, sigma: f64) -> Vec<f32> {
    if sigma <= 0.0 {
        match size {
            1 => return vec![1.0],
            3 => return vec![0.25, 0.5, 0.25],
            5 => return vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
            7 => return vec![0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
            _ => {}
        }
    }

    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let radius = (size / 2) as i64;
    let scale = -0.5 / (sigma * sigma);

    let raw: Vec<f64> = (-radius..=radius)
        .map(|i| (scale * (i * i) as f64).exp())
        .collect();
    let sum: f64 = raw.iter().sum();
    raw.iter().map(|w| (w / sum) as f32).collect()
}

/// Edge-preserving smoothing over a `diameter x diameter` window
pub fn bilateral_filter(
    image: &GrayImage,
    diameter: u32,
    sigma_color: f64,
    sigma_space: f64,
) -> Result<GrayImage> {
    if diameter == 0 || diameter % 2 == 0 {
        return Err(Error::InvalidKernel(format!(
            "bilateral diameter must be a positive odd integer, got {diameter}"
        )));
    }
    for (name, sigma) in [("color", sigma_color), ("space", sigma_space)] {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(Error::InvalidSigma(format!(
                "sigma {name} must be positive, got {sigma}"
            )));
        }
    }
    if image.width() == 0 || image.height() == 0 {
        return Err(Error::EmptyImage);
    }

    Ok(imageproc::filter::bilateral_filter(
        image,
        diameter,
        sigma_color as f32,
        sigma_space as f32,
    ))
}

/// Row-major 2-D correlation kernel
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel2d {
    data: Vec<f32>,
    width: u32,
    height: u32,
}

impl Kernel2d {
    pub fn new(data: Vec<f32>, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 || data.len() as u64 != width as u64 * height as u64 {
            return Err(Error::InvalidKernel(format!(
                "a {width}x{height} kernel needs {} values, got {}",
                width as u64 * height as u64,
                data.len()
            )));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidKernel("kernel values must be finite".into()));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Build from rows, which must all have the same length
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != width) {
            return Err(Error::InvalidKernel("kernel rows differ in length".into()));
        }
        Self::new(rows.concat(), width as u32, rows.len() as u32)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Correlate with an arbitrary kernel, saturating the result to `0..=255`
pub fn filter_2d(image: &GrayImage, kernel: &Kernel2d) -> GrayImage {
    imageproc::filter::Kernel::new(&kernel.data, kernel.width, kernel.height)
        .filter(image, |out: &mut u8, acc: f32| {
            *out = acc.round().clamp(0.0, 255.0) as u8;
        })
}

// ---------------------------------------------------------------------------
// Threshold and edges
// ---------------------------------------------------------------------------

/// Binary threshold: pixels strictly above `thresh` become `maxval`, others 0
pub fn threshold_binary(image: &GrayImage, thresh: u8, maxval: u8) -> GrayImage {
    let mut result = GrayImage::new(image.width(), image.height());

    for (x, y, pixel) in image.enumerate_pixels() {
        let value = if pixel.0[0] > thresh { maxval } else { 0 };
        result.put_pixel(x, y, Luma([value]));
    }

    result
}

/// How the local threshold of `adaptive_threshold` is computed
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AdaptiveMethod {
    /// Plain mean of the block
    Mean,
    /// Gaussian-weighted mean of the block
    #[default]
    Gaussian,
}

/// Binary threshold against the local mean of a `block_size` square, minus `c`
///
/// A pixel becomes `maxval` when it is strictly above `mean - c`, 0 otherwise.
pub fn adaptive_threshold(
    image: &GrayImage,
    maxval: u8,
    method: AdaptiveMethod,
    block_size: u32,
    c: i32,
) -> Result<GrayImage> {
    if block_size <= 1 || block_size % 2 == 0 {
        return Err(Error::InvalidKernel(format!(
            "block size must be an odd integer greater than 1, got {block_size}"
        )));
    }

    let block = KernelSize::square(block_size)?;
    let local_mean = match method {
        AdaptiveMethod::Mean => box_blur(image, block),
        AdaptiveMethod::Gaussian => gaussian_blur(image, block, 0.0),
    };

    let mut result = GrayImage::new(image.width(), image.height());
    for ((dst, src), mean) in result.pixels_mut().zip(image.pixels()).zip(local_mean.pixels()) {
        let level = mean.0[0] as i32 - c;
        dst.0[0] = if src.0[0] as i32 > level { maxval } else { 0 };
    }
    Ok(result)
}

/// Apply Canny edge detection; edge pixels are 255, everything else 0
pub fn canny_edges(image: &GrayImage, thresholds: CannyThresholds) -> GrayImage {
    imageproc::edges::canny(image, thresholds.low(), thresholds.high())
}

/// Per-pixel AND of two single-channel images of equal size
pub fn bitwise_and(a: &GrayImage, b: &GrayImage) -> Result<GrayImage> {
    if a.dimensions() != b.dimensions() {
        return Err(Error::SizeMismatch(format!(
            "{:?} vs {:?}",
            a.dimensions(),
            b.dimensions()
        )));
    }
    let mut out = a.clone();
    for (dst, src) in out.pixels_mut().zip(b.pixels()) {
        dst.0[0] &= src.0[0];
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Sub-image over rows `y_start..y_end` and columns `x_start..x_end`
pub fn crop(frame: &Frame, y_start: u32, y_end: u32, x_start: u32, x_end: u32) -> Result<Frame> {
    if !(y_start < y_end && y_end <= frame.height() && x_start < x_end && x_end <= frame.width()) {
        return Err(Error::InvalidCrop(format!(
            "rows {y_start}..{y_end}, columns {x_start}..{x_end} do not fit a {}x{} image",
            frame.width(),
            frame.height()
        )));
    }
    let cropped = imageops::crop_imm(
        frame.buffer(),
        x_start,
        y_start,
        x_end - x_start,
        y_end - y_start,
    )
    .to_image();
    Ok(frame.with_buffer(cropped))
}

pub fn flip(frame: &Frame, axis: FlipAxis) -> Frame {
    let buffer = match axis {
        FlipAxis::Horizontal => imageops::flip_horizontal(frame.buffer()),
        FlipAxis::Vertical => imageops::flip_vertical(frame.buffer()),
        FlipAxis::Both => imageops::rotate180(frame.buffer()),
    };
    frame.with_buffer(buffer)
}

/// Rotate about the center by a quarter-turn multiple, then scale by `scale`
///
/// The canvas grows to the rotated bounding box. `scale == 1` is lossless.
pub fn rotate(frame: &Frame, rotation: Rotation, clockwise: bool, scale: f64) -> Result<Frame> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(Error::InvalidScale(format!(
            "rotation scale must be positive, got {scale}"
        )));
    }

    let buffer = match (rotation, clockwise) {
        (Rotation::Deg180, _) => imageops::rotate180(frame.buffer()),
        (Rotation::Deg90, true) | (Rotation::Deg270, false) => imageops::rotate90(frame.buffer()),
        (Rotation::Deg90, false) | (Rotation::Deg270, true) => imageops::rotate270(frame.buffer()),
    };
    let rotated = frame.with_buffer(buffer);

    if scale == 1.0 {
        return Ok(rotated);
    }
    resize_by_factor(&rotated, scale, None)
}

/// Map `frame` through the 2x3 affine `matrix` (source to destination) onto
/// a `width x height` canvas
///
/// Destination pixels whose source falls outside the frame are black.
pub fn warp_affine(frame: &Frame, matrix: [[f64; 3]; 2], width: u32, height: u32) -> Result<Frame> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidScale(format!(
            "output size must be positive, got {width}x{height}"
        )));
    }
    let [[a, b, c], [d, e, f]] = matrix;
    if matrix.iter().flatten().any(|v| !v.is_finite()) {
        return Err(Error::InvalidTransform("matrix entries must be finite".into()));
    }

    let projection = Projection::from_matrix([
        a as f32, b as f32, c as f32, d as f32, e as f32, f as f32, 0.0, 0.0, 1.0,
    ])
    .ok_or_else(|| Error::InvalidTransform(format!("matrix {matrix:?} is not invertible")))?;

    let mut out = RgbImage::new(width, height);
    warp_into(
        frame.buffer(),
        &projection,
        Interpolation::Bilinear,
        Rgb([0, 0, 0]),
        &mut out,
    );
    Ok(frame.with_buffer(out))
}
