// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lane-line detection on road images
//!
//! This crate provides the pixel side of the lane detector:
//! 1. Loading frames and keeping track of their channel order
//! 2. Classical preprocessing (resize, grayscale, blur, Canny)
//! 3. Masking the road region and finding straight segments (Hough)
//! 4. Rendering the fitted lanes from `lane-lite-lanes` as an overlay
//!
//! # Usage
//!
//! ```rust,ignore
//! use lane_lite_vision::{LanePipeline, PipelineConfig};
//! use std::path::Path;
//!
//! let pipeline = LanePipeline::new(&PipelineConfig::default())?;
//! let route = pipeline.process_route(Path::new("road.jpg"), Some(Path::new("out/road_lanes.png")))?;
//!
//! if let Some(left) = route.detection.lanes.left {
//!     println!("left lane: {:?}", left.as_tuple());
//! }
//! ```

pub mod config;
pub mod draw;
pub mod error;
pub mod frame;
pub mod hough;
pub mod image_ops;
pub mod io;
pub mod pipeline;
pub mod roi;

// Re-export commonly used types and functions
pub use config::{load_config, PipelineConfig};
pub use draw::{add_weighted, composite, draw_lane_lines, draw_segments, LaneStyle};
pub use error::{Error, Result};
pub use frame::{Channel, ChannelOrder, Frame};
pub use hough::{detect_segments, HoughParams};
pub use io::{load_frame, save_frame, save_rgb, write_json_file};
pub use pipeline::{LaneDetection, LanePipeline, LaneReport, PipelineStage, ProcessedRoute};
pub use roi::{apply_roi, roi_mask, triangle_vertices, MaskColor, RoiPolygon, RoiShape, Stroke};

pub use lane_lite_lanes as lanes;
