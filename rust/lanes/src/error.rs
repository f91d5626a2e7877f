// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for lane geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing segments or fitting lane lines
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Segment must carry exactly four coordinates (x1, y1, x2, y2), got {0}")]
    InvalidShape(usize),

    #[error("Segment coordinate {0} is not an integer")]
    NonIntegralCoordinate(f64),

    #[error("Image dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error(
        "Fitted line coordinates are out of image bounds: x_start={x_start}, x_end={x_end}, width={width}"
    )]
    DegenerateFit {
        x_start: i32,
        x_end: i32,
        width: u32,
    },
}
