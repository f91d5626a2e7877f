// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod common;

use common::synthetic_road::{edge_map, road_image, scratch_dir, two_lane_edges};
use image::RgbImage;
use lane_lite_vision::lanes::{self, ImageDims};
use lane_lite_vision::{
    triangle_vertices, ChannelOrder, Error, Frame, LanePipeline, LaneReport, PipelineConfig,
    RoiShape, Stroke,
};
use std::fs;

fn default_pipeline() -> LanePipeline {
    LanePipeline::new(&PipelineConfig::default()).unwrap()
}

#[test]
fn two_lane_edge_map_yields_both_lines() {
    let frame = Frame::new(RgbImage::new(640, 360), ChannelOrder::Bgr).unwrap();
    let edges = two_lane_edges();

    let detection = default_pipeline().detect_from_edges(&frame, &edges).unwrap();

    let left = detection.lanes.left.expect("left lane");
    let right = detection.lanes.right.expect("right lane");

    assert_eq!((left.y_start, left.y_end), (360, 234));
    assert_eq!((right.y_start, right.y_end), (360, 234));
    assert!(left.x_start < 320 && left.x_end < 320);
    assert!(right.x_start > 320 && right.x_end > 320);

    // Left lane leans right going up, right lane leans left
    assert!(left.x_end > left.x_start);
    assert!(right.x_end < right.x_start);

    // Overlay shape is 360 x 640 x 3
    assert_eq!(detection.image.dimensions(), (640, 360));
    assert_eq!(detection.image.as_raw().len(), 360 * 640 * 3);
}

#[test]
fn fitted_lines_follow_the_drawn_edges() {
    let frame = Frame::new(RgbImage::new(640, 360), ChannelOrder::Bgr).unwrap();
    let detection = default_pipeline()
        .detect_from_edges(&frame, &two_lane_edges())
        .unwrap();

    // x = 200 + (355 - y) * 80 / 95 extrapolated to the bottom and horizon rows
    let left = detection.lanes.left.unwrap();
    assert!((left.x_start - 195).abs() <= 3, "x_start = {}", left.x_start);
    assert!((left.x_end - 301).abs() <= 3, "x_end = {}", left.x_end);

    let right = detection.lanes.right.unwrap();
    assert!((right.x_start - 444).abs() <= 3, "x_start = {}", right.x_start);
    assert!((right.x_end - 338).abs() <= 3, "x_end = {}", right.x_end);
}

#[test]
fn roi_triangle_matches_reference_geometry() {
    let dims = ImageDims::new(800, 400).unwrap();
    assert_eq!(triangle_vertices(dims), [(40, 400), (760, 400), (400, 240)]);
}

#[test]
fn roi_triangle_is_well_formed_for_many_sizes() {
    for (width, height) in [(20, 5), (64, 48), (320, 180), (641, 361), (1280, 720), (1920, 1080)] {
        let dims = ImageDims::new(width, height).unwrap();
        let [bl, br, apex] = triangle_vertices(dims);

        assert_eq!(bl.1, height as i32);
        assert_eq!(br.1, height as i32);
        assert!(apex.1 < bl.1);
        assert!(bl.0 < apex.0 && apex.0 < br.0);

        // Not degenerate
        let area2 = (br.0 - bl.0) * (apex.1 - bl.1) - (apex.0 - bl.0) * (br.1 - bl.1);
        assert!(area2 != 0);
    }
}

#[test]
fn out_of_frame_fit_aborts_the_frame() {
    let config = PipelineConfig {
        roi: RoiShape::Rectangle {
            start: (0, 0),
            end: (639, 359),
            stroke: Stroke::Filled,
        },
        ..Default::default()
    };
    let pipeline = LanePipeline::new(&config).unwrap();

    // Shallow left candidate far from the bottom-left corner
    let edges = edge_map(640, 360, &[((10.0, 300.0), (100.0, 250.0))]);
    let frame = Frame::new(RgbImage::new(640, 360), ChannelOrder::Bgr).unwrap();

    let err = pipeline.detect_from_edges(&frame, &edges).unwrap_err();
    assert!(matches!(
        err,
        Error::Lanes(lanes::Error::DegenerateFit { .. })
    ));
}

#[test]
fn process_route_detects_and_persists() {
    let dir = scratch_dir("route");
    let input = dir.join("road.png");
    road_image().save(&input).unwrap();
    let output = dir.join("out/road_lanes.png");

    let route = default_pipeline()
        .process_route(&input, Some(&output))
        .unwrap();

    assert_eq!(route.persisted, Some(true));
    assert!(output.is_file());
    assert_eq!(route.detection.image.dimensions(), (640, 360));
    assert!(route.detection.lanes.left.is_some());
    assert!(route.detection.lanes.right.is_some());

    let saved = image::open(&output).unwrap().to_rgb8();
    assert_eq!(saved, route.detection.image);

    let report: LaneReport = route.report();
    assert_eq!(report.width, 640);
    assert_eq!(report.left, route.detection.lanes.left);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["persisted"], serde_json::json!(true));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn failed_save_does_not_abort() {
    let dir = scratch_dir("blocked");
    let input = dir.join("road.png");
    road_image().save(&input).unwrap();

    // The output's parent is a regular file, so the save must fail
    let blocker = dir.join("blocker");
    fs::write(&blocker, b"not a directory").unwrap();
    let output = blocker.join("road_lanes.png");

    let route = default_pipeline()
        .process_route(&input, Some(&output))
        .unwrap();
    assert_eq!(route.persisted, Some(false));
    assert_eq!(route.detection.image.dimensions(), (640, 360));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn no_output_path_means_nothing_persisted() {
    let dir = scratch_dir("no-output");
    let input = dir.join("road.png");
    road_image().save(&input).unwrap();

    let route = default_pipeline().process_route(&input, None).unwrap();
    assert_eq!(route.persisted, None);

    let _ = fs::remove_dir_all(&dir);
}
