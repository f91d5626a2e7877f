// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for image and pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, transforming or persisting frames
#[derive(Error, Debug)]
pub enum Error {
    #[error("Image file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to decode image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode image {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image is empty")]
    EmptyImage,

    #[error("Invalid kernel size: {0}")]
    InvalidKernel(String),

    #[error("Invalid sigma: {0}")]
    InvalidSigma(String),

    #[error("Invalid transform: {0}")]
    InvalidTransform(String),

    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("Invalid scale: {0}")]
    InvalidScale(String),

    #[error("Invalid crop: {0}")]
    InvalidCrop(String),

    #[error("A mask polygon needs at least 3 vertices, got {0}")]
    InvalidMaskVertices(usize),

    #[error("Size mismatch: {0}")]
    SizeMismatch(String),

    #[error("Lane geometry error: {0}")]
    Lanes(#[from] lane_lite_lanes::Error),
}
