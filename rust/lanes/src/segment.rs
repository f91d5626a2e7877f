// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw line segments and the geometry primitives built on them
//!
//! Segments enter the crate through `Segment::new` or one of the `TryFrom`
//! conversions. Once constructed they always hold four integer pixel
//! coordinates, so nothing downstream re-checks shape or integrality.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Detected straight edge in image space (origin top-left, y grows downward)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Segment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Segment {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// `(y2 - y1) / (x2 - x1)`, or `+inf` for a vertical segment
    ///
    /// A line rising left-to-right on screen has a negative slope here.
    pub fn slope(&self) -> f64 {
        let h_dist = self.x2 as i64 - self.x1 as i64;
        let v_dist = self.y2 as i64 - self.y1 as i64;
        if h_dist == 0 {
            f64::INFINITY
        } else {
            v_dist as f64 / h_dist as f64
        }
    }

    /// Endpoint coordinates as `([x1, x2], [y1, y2])`
    pub fn points(&self) -> ([i32; 2], [i32; 2]) {
        ([self.x1, self.x2], [self.y1, self.y2])
    }

    pub fn length(&self) -> f64 {
        let dx = self.x2 as f64 - self.x1 as f64;
        let dy = self.y2 as f64 - self.y1 as f64;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self) -> (f64, f64) {
        (
            (self.x1 as f64 + self.x2 as f64) / 2.0,
            (self.y1 as f64 + self.y2 as f64) / 2.0,
        )
    }
}

impl From<[i32; 4]> for Segment {
    fn from(c: [i32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl TryFrom<&[i64]> for Segment {
    type Error = Error;

    fn try_from(coords: &[i64]) -> Result<Self> {
        let [x1, y1, x2, y2] = <[i64; 4]>::try_from(coords)
            .map_err(|_| Error::InvalidShape(coords.len()))?;
        Ok(Self::new(
            narrow(x1)?,
            narrow(y1)?,
            narrow(x2)?,
            narrow(y2)?,
        ))
    }
}

impl TryFrom<&[f64]> for Segment {
    type Error = Error;

    fn try_from(coords: &[f64]) -> Result<Self> {
        if coords.len() != 4 {
            return Err(Error::InvalidShape(coords.len()));
        }
        let mut out = [0i32; 4];
        for (slot, &value) in out.iter_mut().zip(coords) {
            if !value.is_finite()
                || value.fract() != 0.0
                || value < i32::MIN as f64
                || value > i32::MAX as f64
            {
                return Err(Error::NonIntegralCoordinate(value));
            }
            *slot = value as i32;
        }
        Ok(Segment::from(out))
    }
}

fn narrow(value: i64) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::NonIntegralCoordinate(value as f64))
}

/// Concatenate the endpoints of every segment, in order
///
/// Returns `(xs, ys)` with two entries per segment; this is the regression
/// input of the lane fitter.
pub fn collect_points(segments: &[Segment]) -> (Vec<i32>, Vec<i32>) {
    let mut all_x = Vec::with_capacity(segments.len() * 2);
    let mut all_y = Vec::with_capacity(segments.len() * 2);

    for segment in segments {
        let (xs, ys) = segment.points();
        all_x.extend_from_slice(&xs);
        all_y.extend_from_slice(&ys);
    }

    (all_x, all_y)
}
