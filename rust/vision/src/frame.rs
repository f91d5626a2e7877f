// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Three-channel frames that remember their channel order
//!
//! The detection pipeline works on BGR frames; display and persistence use
//! RGB. A `Frame` carries its order explicitly so conversions happen once,
//! at the boundaries, and channel lookups never guess.

use crate::error::{Error, Result};
use image::{GrayImage, Luma, RgbImage};
use lane_lite_lanes::ImageDims;
use serde::{Deserialize, Serialize};

/// Byte order of the three color channels in a frame buffer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    Bgr,
    Rgb,
}

/// A single color channel, independent of storage order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Blue,
    Green,
    Red,
}

impl ChannelOrder {
    /// Position of `channel` inside a pixel stored in this order
    pub fn index_of(self, channel: Channel) -> usize {
        match (self, channel) {
            (_, Channel::Green) => 1,
            (ChannelOrder::Bgr, Channel::Blue) | (ChannelOrder::Rgb, Channel::Red) => 0,
            (ChannelOrder::Bgr, Channel::Red) | (ChannelOrder::Rgb, Channel::Blue) => 2,
        }
    }
}

/// Non-empty 8-bit, 3-channel image
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    buffer: RgbImage,
    order: ChannelOrder,
}

impl Frame {
    pub fn new(buffer: RgbImage, order: ChannelOrder) -> Result<Self> {
        if buffer.width() == 0 || buffer.height() == 0 {
            return Err(Error::EmptyImage);
        }
        Ok(Self { buffer, order })
    }

    /// Wrap a buffer that is already known to be non-empty, keeping this
    /// frame's channel order
    pub(crate) fn with_buffer(&self, buffer: RgbImage) -> Self {
        debug_assert!(buffer.width() > 0 && buffer.height() > 0);
        Self {
            buffer,
            order: self.order,
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dims(&self) -> ImageDims {
        ImageDims {
            width: self.width(),
            height: self.height(),
        }
    }

    /// `(height, width, channels)`
    pub fn shape(&self) -> (u32, u32, usize) {
        (self.height(), self.width(), 3)
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    pub fn buffer(&self) -> &RgbImage {
        &self.buffer
    }

    pub fn into_buffer(self) -> RgbImage {
        self.buffer
    }

    /// Same pixels with the channels rearranged into `order`
    pub fn to_order(&self, order: ChannelOrder) -> Frame {
        if order == self.order {
            return self.clone();
        }
        let mut buffer = self.buffer.clone();
        for pixel in buffer.pixels_mut() {
            pixel.0.swap(0, 2);
        }
        Frame { buffer, order }
    }

    /// RGB buffer suitable for display or encoding
    pub fn into_rgb(self) -> RgbImage {
        self.to_order(ChannelOrder::Rgb).buffer
    }

    /// Extract one color channel as a grayscale image
    pub fn channel(&self, channel: Channel) -> GrayImage {
        let idx = self.order.index_of(channel);
        GrayImage::from_fn(self.width(), self.height(), |x, y| {
            Luma([self.buffer.get_pixel(x, y).0[idx]])
        })
    }

    /// Pixel as `[blue, green, red]` regardless of storage order
    pub fn bgr_at(&self, x: u32, y: u32) -> [u8; 3] {
        let p = self.buffer.get_pixel(x, y).0;
        match self.order {
            ChannelOrder::Bgr => p,
            ChannelOrder::Rgb => [p[2], p[1], p[0]],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn bgr_frame() -> Frame {
        let mut buffer = RgbImage::new(2, 1);
        buffer.put_pixel(0, 0, Rgb([10, 20, 30]));
        buffer.put_pixel(1, 0, Rgb([200, 100, 0]));
        Frame::new(buffer, ChannelOrder::Bgr).unwrap()
    }

    #[test]
    fn test_empty_buffer_is_rejected() {
        assert!(matches!(
            Frame::new(RgbImage::new(0, 5), ChannelOrder::Rgb),
            Err(Error::EmptyImage)
        ));
    }

    #[test]
    fn test_shape() {
        let frame = bgr_frame();
        assert_eq!(frame.shape(), (1, 2, 3));
        assert_eq!(frame.dims().width, 2);
    }

    #[test]
    fn test_order_conversion_swaps_outer_channels() {
        let frame = bgr_frame();
        let rgb = frame.to_order(ChannelOrder::Rgb);
        assert_eq!(rgb.buffer().get_pixel(0, 0).0, [30, 20, 10]);
        assert_eq!(rgb.bgr_at(0, 0), frame.bgr_at(0, 0));

        let back = rgb.to_order(ChannelOrder::Bgr);
        assert_eq!(back, frame);
    }

    #[test]
    fn test_channel_extraction_respects_order() {
        let frame = bgr_frame();
        assert_eq!(frame.channel(Channel::Blue).get_pixel(0, 0).0[0], 10);
        assert_eq!(frame.channel(Channel::Red).get_pixel(1, 0).0[0], 0);

        let rgb = frame.to_order(ChannelOrder::Rgb);
        assert_eq!(rgb.channel(Channel::Blue).get_pixel(0, 0).0[0], 10);
        assert_eq!(rgb.channel(Channel::Green).get_pixel(1, 0).0[0], 100);
    }
}
