// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline tunables, loadable from JSON
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Validation happens when the config is turned into a
//! `LanePipeline`, not here.

use crate::draw::LaneStyle;
use crate::error::{Error, Result};
use crate::hough::HoughParams;
use crate::roi::RoiShape;
use lane_lite_lanes::DEFAULT_SLOPE_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Uniform scale applied to the input before detection
    pub resize_factor: f64,
    /// Gaussian aperture (positive, odd)
    pub blur_kernel: u32,
    /// Gaussian deviation; `<= 0` derives it from the aperture
    pub blur_sigma: f64,
    pub canny_low: f32,
    pub canny_high: f32,
    pub hough: HoughParams,
    /// Minimum `|slope|` for a segment to be a lane candidate
    pub slope_threshold: f64,
    pub roi: RoiShape,
    pub style: LaneStyle,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resize_factor: 0.5,
            blur_kernel: 5,
            blur_sigma: 0.0,
            canny_low: 50.0,
            canny_high: 175.0,
            hough: HoughParams::default(),
            slope_threshold: DEFAULT_SLOPE_THRESHOLD,
            roi: RoiShape::Triangle,
            style: LaneStyle::default(),
        }
    }
}

/// Read a JSON pipeline config; missing fields take their defaults
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let data = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| Error::Config {
        path: path.to_path_buf(),
        source,
    })
}
