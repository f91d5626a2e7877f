// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types shared by the classifier, the fitter and the vision pipeline

use crate::error::{Error, Result};
use crate::segment::Segment;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum `|slope|` a segment needs to count as a lane-boundary candidate
pub const DEFAULT_SLOPE_THRESHOLD: f64 = 0.4;

/// Fitted lines run from the bottom row up to this fraction of the image height
pub const LANE_HORIZON_FRACTION: f64 = 0.65;

/// Spatial size of the frame the segments were detected in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageDims {
    pub width: u32,
    pub height: u32,
}

impl ImageDims {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Horizontal image center, floor division
    pub fn center_x(&self) -> i32 {
        (self.width / 2) as i32
    }

    /// Row at which fitted lines end, truncated
    pub fn horizon_y(&self) -> i32 {
        (self.height as f64 * LANE_HORIZON_FRACTION) as i32
    }
}

/// Which lane boundary a segment or line belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LaneSide {
    Left,
    Right,
}

impl fmt::Display for LaneSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneSide::Left => write!(f, "left"),
            LaneSide::Right => write!(f, "right"),
        }
    }
}

/// Segments surviving classification, split by side
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LaneBuckets {
    pub left: Vec<Segment>,
    pub right: Vec<Segment>,
}

impl LaneBuckets {
    pub fn side(&self, side: LaneSide) -> &[Segment] {
        match side {
            LaneSide::Left => &self.left,
            LaneSide::Right => &self.right,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }
}

/// Single regression line representing one lane boundary
///
/// `y_start` is always the image height (bottom row) and `y_end` the
/// horizon row; both x values lie inside `[0, width)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FittedLine {
    pub x_start: i32,
    pub y_start: i32,
    pub x_end: i32,
    pub y_end: i32,
}

impl FittedLine {
    pub fn start(&self) -> (i32, i32) {
        (self.x_start, self.y_start)
    }

    pub fn end(&self) -> (i32, i32) {
        (self.x_end, self.y_end)
    }

    pub fn as_tuple(&self) -> (i32, i32, i32, i32) {
        (self.x_start, self.y_start, self.x_end, self.y_end)
    }
}

/// Left and right lane lines of one frame; either side may be missing
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaneLines {
    pub left: Option<FittedLine>,
    pub right: Option<FittedLine>,
}

impl LaneLines {
    pub fn side(&self, side: LaneSide) -> Option<&FittedLine> {
        match side {
            LaneSide::Left => self.left.as_ref(),
            LaneSide::Right => self.right.as_ref(),
        }
    }

    pub fn count(&self) -> usize {
        self.left.is_some() as usize + self.right.is_some() as usize
    }
}
