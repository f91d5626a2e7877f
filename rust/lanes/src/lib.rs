// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lane-boundary geometry
//!
//! Turns the raw straight segments found by a line detector into at most one
//! left and one right lane line:
//! 1. Partition segments by slope sign and horizontal position
//! 2. Fit `x = m*y + b` to the endpoints of each side
//! 3. Extrapolate from the bottom row to the horizon row
//!
//! Nothing here touches pixels; see `lane-lite-vision` for the image side.
//!
//! # Usage
//!
//! ```rust
//! use lane_lite_lanes::{classify_segments, fit_lanes, ImageDims, Segment};
//!
//! let dims = ImageDims::new(640, 360)?;
//! let segments = [
//!     Segment::new(200, 355, 280, 260),
//!     Segment::new(440, 355, 360, 260),
//! ];
//!
//! let buckets = classify_segments(dims, &segments, 0.4);
//! let lanes = fit_lanes(dims, &buckets)?;
//! assert_eq!(lanes.count(), 2);
//! # Ok::<(), lane_lite_lanes::Error>(())
//! ```

pub mod classify;
pub mod error;
pub mod fit;
pub mod segment;
pub mod types;

pub use classify::{classify_segment, classify_segments};
pub use error::{Error, Result};
pub use fit::{fit_lane_line, fit_lanes};
pub use segment::{collect_points, Segment};
pub use types::{
    FittedLine, ImageDims, LaneBuckets, LaneLines, LaneSide, DEFAULT_SLOPE_THRESHOLD,
    LANE_HORIZON_FRACTION,
};
