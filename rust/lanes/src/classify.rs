// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Slope-and-position partition of raw segments into left/right buckets

use crate::segment::Segment;
use crate::types::{ImageDims, LaneBuckets, LaneSide};

/// Side a single segment belongs to, or `None` when it is discarded
///
/// Near-horizontal segments (`|slope| < slope_threshold`) never qualify. A
/// left candidate has negative slope with both endpoints strictly left of
/// `center_x`; a right candidate has positive slope with both endpoints
/// strictly right of it. Vertical segments carry `+inf` slope and can only
/// land on the right.
pub fn classify_segment(
    segment: &Segment,
    center_x: i32,
    slope_threshold: f64,
) -> Option<LaneSide> {
    let slope = segment.slope();

    if slope.abs() < slope_threshold {
        return None;
    }

    if slope < 0.0 && segment.x1 < center_x && segment.x2 < center_x {
        Some(LaneSide::Left)
    } else if slope > 0.0 && segment.x1 > center_x && segment.x2 > center_x {
        Some(LaneSide::Right)
    } else {
        None
    }
}

/// Separate detected segments into left and right lane candidates
///
/// Empty input yields two empty buckets. Input order is preserved within
/// each bucket.
pub fn classify_segments(
    dims: ImageDims,
    segments: &[Segment],
    slope_threshold: f64,
) -> LaneBuckets {
    let center_x = dims.center_x();
    let mut buckets = LaneBuckets::default();

    for segment in segments {
        match classify_segment(segment, center_x, slope_threshold) {
            Some(LaneSide::Left) => buckets.left.push(*segment),
            Some(LaneSide::Right) => buckets.right.push(*segment),
            None => {}
        }
    }

    tracing::debug!(
        total = segments.len(),
        left = buckets.left.len(),
        right = buckets.right.len(),
        discarded = segments.len() - buckets.left.len() - buckets.right.len(),
        "Classified segments"
    );

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_SLOPE_THRESHOLD;

    fn dims() -> ImageDims {
        ImageDims::new(640, 360).unwrap()
    }

    #[test]
    fn test_empty_input_gives_empty_buckets() {
        let buckets = classify_segments(dims(), &[], DEFAULT_SLOPE_THRESHOLD);
        assert!(buckets.left.is_empty());
        assert!(buckets.right.is_empty());
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_left_and_right_assignment() {
        let left = Segment::new(200, 355, 280, 260);
        let right = Segment::new(440, 355, 360, 260);
        let buckets = classify_segments(dims(), &[left, right], DEFAULT_SLOPE_THRESHOLD);

        assert_eq!(buckets.left, vec![left]);
        assert_eq!(buckets.right, vec![right]);
    }

    #[test]
    fn test_near_horizontal_segments_are_dropped() {
        // slope 0.1
        let flat = Segment::new(10, 100, 110, 110);
        let buckets = classify_segments(dims(), &[flat], DEFAULT_SLOPE_THRESHOLD);
        assert!(buckets.is_empty());

        // Kept once the threshold allows it
        let buckets = classify_segments(dims(), &[flat], 0.05);
        assert!(buckets.left.is_empty());
        assert!(buckets.right.is_empty());
        assert_eq!(
            classify_segment(&Segment::new(400, 100, 500, 110), 320, 0.05),
            Some(LaneSide::Right)
        );
    }

    #[test]
    fn test_center_crossing_segments_are_dropped() {
        // Negative slope but ends right of center
        let crossing = Segment::new(300, 300, 340, 200);
        assert_eq!(classify_segment(&crossing, 320, 0.4), None);

        // Touching the center line is not strictly left
        let touching = Segment::new(280, 300, 320, 200);
        assert_eq!(classify_segment(&touching, 320, 0.4), None);
    }

    #[test]
    fn test_wrong_sign_for_side_is_dropped() {
        // Positive slope on the left half
        let segment = Segment::new(100, 100, 200, 300);
        assert_eq!(classify_segment(&segment, 320, 0.4), None);

        // Negative slope on the right half
        let segment = Segment::new(400, 300, 500, 100);
        assert_eq!(classify_segment(&segment, 320, 0.4), None);
    }

    #[test]
    fn test_vertical_segments_only_go_right() {
        let right = Segment::new(500, 100, 500, 300);
        let left = Segment::new(100, 100, 100, 300);
        assert_eq!(classify_segment(&right, 320, 0.4), Some(LaneSide::Right));
        assert_eq!(classify_segment(&left, 320, 0.4), None);
    }

    #[test]
    fn test_partition_properties() {
        let mut segments = Vec::new();
        for x in (0..640).step_by(37) {
            for dy in [-200, -90, -30, -5, 0, 5, 30, 90, 200] {
                segments.push(Segment::new(x, 180, x + 40, 180 + dy));
                segments.push(Segment::new(x, 180, x, 180 + dy));
            }
        }

        for threshold in [0.0, 0.4, 0.5, 1.0, 3.0] {
            let buckets = classify_segments(dims(), &segments, threshold);
            for segment in buckets.left.iter().chain(&buckets.right) {
                assert!(segment.slope().abs() >= threshold);
            }
            for segment in &buckets.left {
                assert!(!buckets.right.contains(segment));
                assert!(segment.slope() < 0.0);
            }
            for segment in &buckets.right {
                assert!(segment.slope() > 0.0);
            }
        }
    }
}
