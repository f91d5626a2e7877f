// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Least-squares lane line fitting
//!
//! Each bucket is reduced to one line `x = slope * y + intercept`. The axes
//! are swapped relative to the usual `y = mx + b` form: lane boundaries are
//! close to vertical in image space, where a fit of y over x becomes
//! ill-conditioned or undefined. The fitted line is extrapolated from the
//! bottom row up to the horizon row and rejected if it leaves the frame.

use crate::error::{Error, Result};
use crate::segment::{collect_points, Segment};
use crate::types::{FittedLine, ImageDims, LaneBuckets, LaneLines, LaneSide};
use nalgebra::DVector;

/// Fit a single lane line to the endpoints of a bucket
///
/// Returns `Ok(None)` for an empty bucket and for a bucket whose endpoints
/// cannot define a regression of x on y (fewer than two distinct points or
/// a single distinct row). Returns `Error::DegenerateFit` when either
/// extrapolated x coordinate falls outside `[0, width)`.
pub fn fit_lane_line(dims: ImageDims, bucket: &[Segment]) -> Result<Option<FittedLine>> {
    if bucket.is_empty() {
        return Ok(None);
    }

    let (xs, ys) = collect_points(bucket);

    let Some((slope, intercept)) = least_squares(&ys, &xs) else {
        tracing::debug!(
            points = xs.len(),
            "Not enough distinct points to fit a lane line"
        );
        return Ok(None);
    };

    let y_start = dims.height as i32;
    let y_end = dims.horizon_y();
    let x_start = (slope * y_start as f64 + intercept) as i32;
    let x_end = (slope * y_end as f64 + intercept) as i32;

    let width = dims.width as i32;
    if !(0..width).contains(&x_start) || !(0..width).contains(&x_end) {
        return Err(Error::DegenerateFit {
            x_start,
            x_end,
            width: dims.width,
        });
    }

    Ok(Some(FittedLine {
        x_start,
        y_start,
        x_end,
        y_end,
    }))
}

/// Fit both sides; the first degenerate side aborts the frame
pub fn fit_lanes(dims: ImageDims, buckets: &LaneBuckets) -> Result<LaneLines> {
    let mut lanes = LaneLines::default();

    for side in [LaneSide::Left, LaneSide::Right] {
        let line = fit_lane_line(dims, buckets.side(side)).inspect_err(|err| {
            tracing::warn!(%side, error = %err, "Rejected lane fit");
        })?;
        tracing::debug!(%side, ?line, "Fitted lane line");
        match side {
            LaneSide::Left => lanes.left = line,
            LaneSide::Right => lanes.right = line,
        }
    }

    Ok(lanes)
}

/// Ordinary least squares for `value = slope * arg + intercept`
///
/// Works on mean-centered data so integer pixel inputs with exact means
/// produce exact coefficients. `None` when every argument is the same
/// (this also covers a single distinct point).
fn least_squares(args: &[i32], values: &[i32]) -> Option<(f64, f64)> {
    let first = *args.first()?;
    if args.iter().all(|&a| a == first) {
        return None;
    }

    let a = DVector::from_iterator(args.len(), args.iter().map(|&v| v as f64));
    let v = DVector::from_iterator(values.len(), values.iter().map(|&v| v as f64));

    let (mean_a, mean_v) = (a.mean(), v.mean());
    let a_centered = a.add_scalar(-mean_a);
    let v_centered = v.add_scalar(-mean_v);

    let spread = a_centered.norm_squared();
    if spread <= f64::EPSILON {
        return None;
    }

    let slope = a_centered.dot(&v_centered) / spread;
    let intercept = mean_v - slope * mean_a;
    if !slope.is_finite() || !intercept.is_finite() {
        return None;
    }
    Some((slope, intercept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dims(width: u32, height: u32) -> ImageDims {
        ImageDims::new(width, height).unwrap()
    }

    #[test]
    fn test_empty_bucket_is_absent() {
        assert_eq!(fit_lane_line(dims(640, 360), &[]), Ok(None));
    }

    #[test]
    fn test_vertical_bounds_are_fixed() {
        let bucket = [Segment::new(300, 400, 350, 300)];
        let line = fit_lane_line(dims(800, 400), &bucket).unwrap().unwrap();
        assert_eq!(line.y_start, 400);
        assert_eq!(line.y_end, 260);
    }

    #[test]
    fn test_single_segment_is_extended() {
        // x = -0.5 * y + 500
        let bucket = [Segment::new(300, 400, 350, 300)];
        let line = fit_lane_line(dims(800, 400), &bucket).unwrap().unwrap();
        assert_eq!(line.as_tuple(), (300, 400, 370, 260));
    }

    #[test]
    fn test_vertical_lane_is_well_conditioned() {
        let bucket = [Segment::new(500, 100, 500, 300), Segment::new(500, 320, 500, 390)];
        let line = fit_lane_line(dims(640, 400), &bucket).unwrap().unwrap();
        assert_eq!(line.x_start, 500);
        assert_eq!(line.x_end, 500);
    }

    #[test]
    fn test_least_squares_matches_closed_form() {
        let ys = [0, 1, 2, 3];
        let xs = [1, 3, 5, 8];
        let (slope, intercept) = least_squares(&ys, &xs).unwrap();
        assert_relative_eq!(slope, 2.3, epsilon = 1e-12);
        assert_relative_eq!(intercept, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let bucket = [
            Segment::new(210, 350, 270, 270),
            Segment::new(190, 359, 230, 310),
            Segment::new(250, 290, 282, 250),
        ];
        let a = fit_lane_line(dims(640, 360), &bucket).unwrap();
        let b = fit_lane_line(dims(640, 360), &bucket).unwrap();
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn test_out_of_frame_fit_is_rejected() {
        // Shallow but above threshold, far to the left: x = -1.8 * y + 550
        let bucket = [Segment::new(10, 300, 100, 250)];
        let err = fit_lane_line(dims(640, 360), &bucket).unwrap_err();
        match err {
            Error::DegenerateFit { x_start, width, .. } => {
                assert!(x_start < 0);
                assert_eq!(width, 640);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_insufficient_points_are_absent() {
        // Zero-length segment: a single distinct point
        let bucket = [Segment::new(100, 200, 100, 200)];
        assert_eq!(fit_lane_line(dims(640, 360), &bucket), Ok(None));

        // Horizontal segment: every point on the same row
        let bucket = [Segment::new(100, 200, 150, 200)];
        assert_eq!(fit_lane_line(dims(640, 360), &bucket), Ok(None));
    }

    #[test]
    fn test_fit_lanes_handles_missing_side() {
        let buckets = LaneBuckets {
            left: vec![Segment::new(200, 355, 280, 260)],
            right: Vec::new(),
        };
        let lanes = fit_lanes(dims(640, 360), &buckets).unwrap();
        assert!(lanes.left.is_some());
        assert!(lanes.right.is_none());
        assert_eq!(lanes.count(), 1);
    }

    #[test]
    fn test_fit_lanes_propagates_degenerate_side() {
        let buckets = LaneBuckets {
            left: vec![Segment::new(200, 355, 280, 260)],
            right: vec![Segment::new(630, 300, 700, 350)],
        };
        assert!(matches!(
            fit_lanes(dims(640, 360), &buckets),
            Err(Error::DegenerateFit { .. })
        ));
    }
}
