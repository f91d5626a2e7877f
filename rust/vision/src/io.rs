// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! File I/O for frames and JSON reports
//!
//! - `load_frame`: decode PNG/JPEG into a BGR frame
//! - `save_frame` / `save_rgb`: encode to disk in RGB order
//! - `write_json_file`: pretty-print a serializable value

use crate::error::{Error, Result};
use crate::frame::{ChannelOrder, Frame};
use image::RgbImage;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Read an image from disk into the pipeline's native BGR order
pub fn load_frame(path: &Path) -> Result<Frame> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let rgb = image::open(path)
        .map_err(|source| Error::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgb8();

    let frame = Frame::new(rgb, ChannelOrder::Rgb)?.to_order(ChannelOrder::Bgr);
    tracing::debug!(path = %path.display(), width = frame.width(), height = frame.height(), "Loaded frame");
    Ok(frame)
}

/// Encode a frame, converting to RGB first so colors are correct on disk
pub fn save_frame(frame: &Frame, path: &Path) -> Result<()> {
    save_rgb(frame.to_order(ChannelOrder::Rgb).buffer(), path)
}

/// Encode an RGB buffer; the format follows the file extension
pub fn save_rgb(image: &RgbImage, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    image.save(path).map_err(|source| Error::Encode {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a value as pretty JSON to `path`, creating parent directories
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}
