// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Probabilistic-style Hough transform producing finite line segments

use image::GrayImage;
use lane_lite_lanes::Segment;
use serde::{Deserialize, Serialize};

/// Edge pixels must be brighter than this to vote
const EDGE_LEVEL: u8 = 128;

/// Maximum distance (px) from a peak line for a pixel to belong to it
const LINE_BAND: f64 = 2.0;

/// Hough transform parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HoughParams {
    /// Distance resolution of the accumulator in pixels
    pub rho: f64,
    /// Angular resolution of the accumulator in degrees
    pub theta_deg: f64,
    /// Minimum number of votes for an accumulator cell to be a line
    pub threshold: u32,
    /// Shorter runs are discarded (pixels)
    pub min_line_length: f64,
    /// Largest gap between consecutive pixels of one segment (pixels)
    pub max_line_gap: f64,
    /// Strongest accumulator cells examined, at most
    pub max_peaks: usize,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            rho: 1.0,
            theta_deg: 1.0,
            threshold: 30,
            min_line_length: 50.0,
            max_line_gap: 15.0,
            max_peaks: 500,
        }
    }
}

/// Detect line segments in a binary edge map
///
/// Every edge pixel votes over `theta` in `[0, pi)`. Cells with at least
/// `threshold` votes are visited strongest first; the still-unused pixels
/// near each cell's line are ordered along it and split wherever the gap
/// exceeds `max_line_gap`. Runs of at least `min_line_length` become
/// segments and their pixels are consumed. The result is deterministic.
pub fn detect_segments(edges: &GrayImage, params: &HoughParams) -> Vec<Segment> {
    let rho_resolution = params.rho.max(f64::EPSILON);
    let theta_resolution = params.theta_deg.max(f64::EPSILON).to_radians();
    let num_thetas = ((std::f64::consts::PI / theta_resolution) as usize).max(1);

    // Precompute sin/cos tables
    let (cos_table, sin_table): (Vec<f64>, Vec<f64>) = (0..num_thetas)
        .map(|i| {
            let theta = i as f64 * theta_resolution;
            (theta.cos(), theta.sin())
        })
        .unzip();

    let max_rho = diagonal_length(edges.width(), edges.height());
    let num_rhos = (2.0 * max_rho / rho_resolution) as usize + 1;
    let rho_offset = max_rho;

    let edge_points: Vec<(i32, i32)> = edges
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0[0] > EDGE_LEVEL)
        .map(|(x, y, _)| (x as i32, y as i32))
        .collect();

    if edge_points.is_empty() {
        return Vec::new();
    }

    // Vote in Hough space
    let mut accumulator = vec![0u32; num_thetas * num_rhos];
    for &(x, y) in &edge_points {
        for theta_idx in 0..num_thetas {
            let rho = x as f64 * cos_table[theta_idx] + y as f64 * sin_table[theta_idx];
            let rho_idx = ((rho + rho_offset) / rho_resolution) as usize;
            if rho_idx < num_rhos {
                accumulator[theta_idx * num_rhos + rho_idx] += 1;
            }
        }
    }

    let mut peaks: Vec<(usize, usize, u32)> = Vec::new();
    for theta_idx in 0..num_thetas {
        for rho_idx in 0..num_rhos {
            let votes = accumulator[theta_idx * num_rhos + rho_idx];
            if votes >= params.threshold {
                peaks.push((theta_idx, rho_idx, votes));
            }
        }
    }

    // Strongest first; stable so ties keep accumulator order
    peaks.sort_by(|a, b| b.2.cmp(&a.2));

    let mut segments = Vec::new();
    let mut used_points = vec![false; edge_points.len()];

    for &(theta_idx, rho_idx, _votes) in peaks.iter().take(params.max_peaks) {
        let rho = rho_idx as f64 * rho_resolution - rho_offset;
        let cos_t = cos_table[theta_idx];
        let sin_t = sin_table[theta_idx];

        let mut line_points: Vec<(i32, i32, usize)> = edge_points
            .iter()
            .enumerate()
            .filter(|&(i, &(x, y))| {
                !used_points[i] && (x as f64 * cos_t + y as f64 * sin_t - rho).abs() < LINE_BAND
            })
            .map(|(i, &(x, y))| (x, y, i))
            .collect();

        if line_points.len() < 2 {
            continue;
        }

        // Order along the line direction
        line_points.sort_by(|a, b| {
            let proj_a = a.0 as f64 * (-sin_t) + a.1 as f64 * cos_t;
            let proj_b = b.0 as f64 * (-sin_t) + b.1 as f64 * cos_t;
            proj_a.total_cmp(&proj_b)
        });

        let mut run_start = 0;
        for i in 1..=line_points.len() {
            let split = i == line_points.len() || {
                let dx = (line_points[i].0 - line_points[i - 1].0) as f64;
                let dy = (line_points[i].1 - line_points[i - 1].1) as f64;
                (dx * dx + dy * dy).sqrt() > params.max_line_gap
            };
            if !split {
                continue;
            }

            let run = &line_points[run_start..i];
            if let Some(segment) = accept_run(run, params.min_line_length) {
                segments.push(segment);
                for &(_, _, idx) in run {
                    used_points[idx] = true;
                }
            }
            run_start = i;
        }
    }

    tracing::debug!(
        edge_pixels = edge_points.len(),
        peaks = peaks.len(),
        segments = segments.len(),
        "Hough segment detection"
    );

    segments
}

/// Largest `|rho|` any pixel of a `width x height` image can produce
fn diagonal_length(width: u32, height: u32) -> f64 {
    (width as f64).hypot(height as f64)
}

/// Segment spanning a run of ordered pixels, if the run is long enough
fn accept_run(run: &[(i32, i32, usize)], min_line_length: f64) -> Option<Segment> {
    if run.len() < 2 {
        return None;
    }
    let (x1, y1, _) = run[0];
    let (x2, y2, _) = run[run.len() - 1];
    let segment = Segment::new(x1, y1, x2, y2);
    let length = segment.length();
    if length < min_line_length {
        return None;
    }

    tracing::trace!(
        midpoint = ?segment.midpoint(),
        length,
        pixels = run.len(),
        "Accepted segment"
    );
    Some(segment)
}
