// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end lane detection on a single road image
//!
//! The stages run strictly in order and any failure aborts the frame.
//! Persisting the result is the one exception: a failed save is logged and
//! reported in `ProcessedRoute::persisted` but the detection still succeeds.

use crate::config::PipelineConfig;
use crate::draw::{composite, LaneStyle};
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::hough::{detect_segments, HoughParams};
use crate::image_ops::{
    canny_edges, gaussian_blur, resize_by_factor, to_grayscale, CannyThresholds, KernelSize,
};
use crate::io::{load_frame, save_rgb};
use crate::roi::{apply_roi, RoiShape};
use image::{GrayImage, RgbImage};
use lane_lite_lanes::{classify_segments, fit_lanes, FittedLine, LaneLines, Segment};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum PipelineStage {
    Loaded,
    Resized,
    Grayscaled,
    Blurred,
    EdgeDetected,
    Masked,
    SegmentsDetected,
    Classified,
    Fitted,
    Composited,
    ColorConverted,
    Persisted,
}

fn enter(stage: PipelineStage) {
    tracing::debug!(stage = ?stage, "Pipeline stage");
}

/// Result of running the detector on one frame
#[derive(Debug, Clone)]
pub struct LaneDetection {
    /// Composited overlay in RGB order
    pub image: RgbImage,
    pub lanes: LaneLines,
    /// Raw segments found by the Hough detector
    pub segments: Vec<Segment>,
    pub left_candidates: usize,
    pub right_candidates: usize,
}

/// Result of `LanePipeline::process_route`
#[derive(Debug, Clone)]
pub struct ProcessedRoute {
    pub input: PathBuf,
    pub detection: LaneDetection,
    /// `None` when no output path was requested
    pub persisted: Option<bool>,
}

impl ProcessedRoute {
    pub fn report(&self) -> LaneReport {
        let detection = &self.detection;
        LaneReport {
            input: self.input.clone(),
            width: detection.image.width(),
            height: detection.image.height(),
            segment_count: detection.segments.len(),
            left_candidates: detection.left_candidates,
            right_candidates: detection.right_candidates,
            left: detection.lanes.left,
            right: detection.lanes.right,
            persisted: self.persisted,
        }
    }
}

/// Serializable summary of one processed image
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LaneReport {
    pub input: PathBuf,
    pub width: u32,
    pub height: u32,
    pub segment_count: usize,
    pub left_candidates: usize,
    pub right_candidates: usize,
    pub left: Option<FittedLine>,
    pub right: Option<FittedLine>,
    pub persisted: Option<bool>,
}

/// Validated detector configuration
#[derive(Debug, Clone)]
pub struct LanePipeline {
    resize_factor: f64,
    blur_kernel: KernelSize,
    blur_sigma: f64,
    canny: CannyThresholds,
    hough: HoughParams,
    slope_threshold: f64,
    roi: RoiShape,
    style: LaneStyle,
}

impl LanePipeline {
    /// Parse a raw config, rejecting invalid values before any image is read
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        if !(config.resize_factor.is_finite() && config.resize_factor > 0.0) {
            return Err(Error::InvalidScale(format!(
                "resize factor must be positive, got {}",
                config.resize_factor
            )));
        }
        if !(config.slope_threshold.is_finite() && config.slope_threshold >= 0.0) {
            return Err(Error::InvalidThreshold(format!(
                "slope threshold must be non-negative, got {}",
                config.slope_threshold
            )));
        }

        Ok(Self {
            resize_factor: config.resize_factor,
            blur_kernel: KernelSize::square(config.blur_kernel)?,
            blur_sigma: config.blur_sigma,
            canny: CannyThresholds::new(config.canny_low, config.canny_high)?,
            hough: config.hough.clone(),
            slope_threshold: config.slope_threshold,
            roi: config.roi.clone(),
            style: config.style.clone(),
        })
    }

    /// Load an image, detect its lanes, and optionally save the overlay
    pub fn process_route(&self, path: &Path, output: Option<&Path>) -> Result<ProcessedRoute> {
        let frame = load_frame(path)?;
        enter(PipelineStage::Loaded);

        let detection = self.process_frame(&frame)?;

        let persisted = output.map(|out| {
            enter(PipelineStage::Persisted);
            match save_rgb(&detection.image, out) {
                Ok(()) => {
                    tracing::info!(path = %out.display(), "Processed image saved");
                    true
                }
                Err(err) => {
                    tracing::warn!(path = %out.display(), error = %err, "Failed to save processed image");
                    false
                }
            }
        });

        Ok(ProcessedRoute {
            input: path.to_path_buf(),
            detection,
            persisted,
        })
    }

    /// Run every stage after loading on a BGR frame
    pub fn process_frame(&self, frame: &Frame) -> Result<LaneDetection> {
        // Step 1: Downscale
        let resized = resize_by_factor(frame, self.resize_factor, None)?;
        enter(PipelineStage::Resized);

        // Step 2: Grayscale
        let gray = to_grayscale(&resized);
        enter(PipelineStage::Grayscaled);

        // Step 3: Blur to suppress texture before edge detection
        let blurred = gaussian_blur(&gray, self.blur_kernel, self.blur_sigma);
        enter(PipelineStage::Blurred);

        // Step 4: Edges
        let edges = canny_edges(&blurred, self.canny);
        enter(PipelineStage::EdgeDetected);

        self.detect_from_edges(&resized, &edges)
    }

    /// Run the stages from ROI masking onward on a caller-supplied edge map
    ///
    /// `edges` must have the same size as `frame`.
    pub fn detect_from_edges(&self, frame: &Frame, edges: &GrayImage) -> Result<LaneDetection> {
        if edges.dimensions() != (frame.width(), frame.height()) {
            return Err(Error::SizeMismatch(format!(
                "edge map is {:?} but frame is {}x{}",
                edges.dimensions(),
                frame.width(),
                frame.height()
            )));
        }
        let dims = frame.dims();

        // Step 5: Keep the road region
        let masked = apply_roi(edges, &self.roi)?;
        enter(PipelineStage::Masked);

        // Step 6: Straight segments
        let segments = detect_segments(&masked, &self.hough);
        enter(PipelineStage::SegmentsDetected);

        // Step 7: Left/right candidates
        let buckets = classify_segments(dims, &segments, self.slope_threshold);
        enter(PipelineStage::Classified);

        // Step 8: One line per side
        let lanes = fit_lanes(dims, &buckets)?;
        enter(PipelineStage::Fitted);

        // Step 9: Overlay
        let blended = composite(frame, &lanes, &self.style)?;
        enter(PipelineStage::Composited);

        let image = blended.into_rgb();
        enter(PipelineStage::ColorConverted);

        tracing::debug!(
            segments = segments.len(),
            lanes = lanes.count(),
            "Lane detection finished"
        );

        Ok(LaneDetection {
            image,
            lanes,
            left_candidates: buckets.left.len(),
            right_candidates: buckets.right.len(),
            segments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ChannelOrder;
    use image::{Luma, Rgb};

    fn pipeline() -> LanePipeline {
        LanePipeline::new(&PipelineConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = PipelineConfig::default();
        config.blur_kernel = 4;
        assert!(matches!(LanePipeline::new(&config), Err(Error::InvalidKernel(_))));

        let mut config = PipelineConfig::default();
        config.canny_low = 200.0;
        assert!(matches!(LanePipeline::new(&config), Err(Error::InvalidThreshold(_))));

        let mut config = PipelineConfig::default();
        config.resize_factor = 0.0;
        assert!(matches!(LanePipeline::new(&config), Err(Error::InvalidScale(_))));

        let mut config = PipelineConfig::default();
        config.slope_threshold = -0.1;
        assert!(LanePipeline::new(&config).is_err());
    }

    #[test]
    fn test_missing_file_fails_before_processing() {
        let err = pipeline()
            .process_route(Path::new("/no/such/road.jpg"), None)
            .unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_edge_map_size_must_match() {
        let frame = Frame::new(RgbImage::new(64, 36), ChannelOrder::Bgr).unwrap();
        let edges = GrayImage::new(32, 18);
        assert!(matches!(
            pipeline().detect_from_edges(&frame, &edges),
            Err(Error::SizeMismatch(_))
        ));
    }

    #[test]
    fn test_blank_frame_has_no_lanes() {
        let frame = Frame::new(RgbImage::from_pixel(160, 90, Rgb([40, 40, 40])), ChannelOrder::Bgr)
            .unwrap();
        let detection = pipeline().process_frame(&frame).unwrap();

        assert_eq!(detection.lanes, LaneLines::default());
        assert!(detection.segments.is_empty());
        assert_eq!(detection.image.dimensions(), (80, 45));
        // 40 * 0.8 + 1
        assert_eq!(detection.image.get_pixel(10, 10).0, [33, 33, 33]);
    }

    #[test]
    fn test_edges_outside_roi_are_ignored() {
        let frame = Frame::new(RgbImage::new(200, 100), ChannelOrder::Bgr).unwrap();
        let mut edges = GrayImage::new(200, 100);
        // A long steep edge in the sky region
        for y in 0..50 {
            edges.put_pixel(20 + y / 2, y, Luma([255]));
        }
        let detection = pipeline().detect_from_edges(&frame, &edges).unwrap();
        assert!(detection.segments.is_empty());
        assert_eq!(detection.lanes.count(), 0);
    }
}
