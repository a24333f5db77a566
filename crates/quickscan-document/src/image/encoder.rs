// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame encoder: turns raw RGB camera frames into JPEG captures, and
// validates JPEG captures before they are embedded in a PDF.

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage, imageops};
use quickscan_core::config::DEFAULT_JPEG_QUALITY;
use quickscan_core::error::{QuickscanError, Result};
use quickscan_core::types::{EncodedImage, RawFrame};
use tracing::{debug, instrument};

/// Encodes raw frames as baseline JPEG at a fixed quality.
#[derive(Debug, Clone, Copy)]
pub struct FrameEncoder {
    /// JPEG quality (1-100).
    quality: u8,
}

impl FrameEncoder {
    /// Create an encoder. `quality` is clamped to 1..=100.
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode `frame` at its native size. The returned image records the
    /// frame's width and height.
    #[instrument(skip_all, fields(width = frame.width(), height = frame.height(), quality = self.quality))]
    pub fn encode(&self, frame: &RawFrame) -> Result<EncodedImage> {
        let rgb = to_rgb(frame)?;
        let buffer = self.write_jpeg(&rgb)?;
        debug!(bytes = buffer.len(), "frame encoded");
        Ok(EncodedImage::jpeg(buffer, frame.width(), frame.height()))
    }

    /// Encode a downsized copy of `frame` no wider than `max_width`, keeping
    /// the aspect ratio. Frames that already fit are encoded as they are.
    #[instrument(skip_all, fields(width = frame.width(), height = frame.height(), max_width))]
    pub fn encode_preview(&self, frame: &RawFrame, max_width: u32) -> Result<EncodedImage> {
        let rgb = to_rgb(frame)?;
        let max_width = max_width.max(1);
        let rgb = if rgb.width() > max_width {
            let height = (u64::from(rgb.height()) * u64::from(max_width) / u64::from(rgb.width()))
                .max(1) as u32;
            imageops::thumbnail(&rgb, max_width, height)
        } else {
            rgb
        };

        let buffer = self.write_jpeg(&rgb)?;
        debug!(
            bytes = buffer.len(),
            width = rgb.width(),
            height = rgb.height(),
            "preview encoded"
        );
        Ok(EncodedImage::jpeg(buffer, rgb.width(), rgb.height()))
    }

    fn write_jpeg(&self, rgb: &RgbImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
        rgb.write_with_encoder(encoder).map_err(|err| {
            QuickscanError::ImageProcessing(format!("JPEG encoding failed: {}", err))
        })?;
        Ok(buffer)
    }
}

fn to_rgb(frame: &RawFrame) -> Result<RgbImage> {
    let (width, height) = (frame.width(), frame.height());
    RgbImage::from_raw(width, height, frame.pixels().to_vec()).ok_or_else(|| {
        QuickscanError::InvalidFrame(format!("buffer does not fit {width}x{height}"))
    })
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

/// What a PDF embedder needs to know about a JPEG stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegInfo {
    pub width: u32,
    pub height: u32,
    /// Colour components declared in the frame header (1, 3 or 4).
    pub components: u8,
}

/// Fully decode `bytes` as JPEG and report its geometry.
///
/// Decoding the whole image (rather than only the header) catches truncated
/// or corrupt captures before anything is written.
#[instrument(skip_all, fields(bytes_len = bytes.len()))]
pub fn inspect_jpeg(bytes: &[u8]) -> Result<JpegInfo> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg).map_err(|err| {
        QuickscanError::ImageProcessing(format!("failed to decode JPEG: {}", err))
    })?;

    let components = match frame_components(bytes) {
        Some(n @ (1 | 3 | 4)) => n,
        Some(n) => {
            return Err(QuickscanError::ImageProcessing(format!(
                "unsupported JPEG component count {n}"
            )));
        }
        None if decoded.color().has_color() => 3,
        None => 1,
    };

    Ok(JpegInfo {
        width: decoded.width(),
        height: decoded.height(),
        components,
    })
}

/// Component count from the first SOFn segment, if one can be found.
fn frame_components(bytes: &[u8]) -> Option<u8> {
    if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
        return None;
    }
    let mut i = 2;
    while i + 4 <= bytes.len() {
        if bytes[i] != 0xFF {
            return None;
        }
        let marker = bytes[i + 1];
        // Fill bytes.
        if marker == 0xFF {
            i += 1;
            continue;
        }
        let is_sof = (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            return bytes.get(i + 9).copied();
        }
        // Start of scan: no frame header before entropy-coded data.
        if marker == 0xDA {
            return None;
        }
        let len = u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]) as usize;
        i += 2 + len;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RawFrame {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x * 4) as u8, (y * 4) as u8, 128]);
            }
        }
        RawFrame::new(width, height, pixels).unwrap()
    }

    #[test]
    fn encode_keeps_native_dimensions() {
        let encoded = FrameEncoder::default().encode(&gradient(40, 30)).unwrap();
        assert_eq!((encoded.width(), encoded.height()), (40, 30));
        assert_eq!(&encoded.bytes()[..2], &[0xFF, 0xD8]);
        assert_eq!(encoded.mime_type(), "image/jpeg");
    }

    #[test]
    fn default_quality_is_ninety() {
        assert_eq!(FrameEncoder::default().quality(), 90);
        assert_eq!(FrameEncoder::new(0).quality(), 1);
        assert_eq!(FrameEncoder::new(255).quality(), 100);
    }

    #[test]
    fn preview_is_downsized_to_max_width() {
        let preview = FrameEncoder::new(60)
            .encode_preview(&gradient(1920, 1080), 640)
            .unwrap();
        assert_eq!((preview.width(), preview.height()), (640, 360));

        let info = inspect_jpeg(preview.bytes()).unwrap();
        assert_eq!((info.width, info.height), (640, 360));
    }

    #[test]
    fn small_frames_are_not_upscaled_for_preview() {
        let preview = FrameEncoder::default()
            .encode_preview(&gradient(40, 30), 640)
            .unwrap();
        assert_eq!((preview.width(), preview.height()), (40, 30));
    }

    #[test]
    fn inspect_reports_rgb_geometry() {
        let encoded = FrameEncoder::default().encode(&gradient(17, 9)).unwrap();
        let info = inspect_jpeg(encoded.bytes()).unwrap();
        assert_eq!(
            info,
            JpegInfo {
                width: 17,
                height: 9,
                components: 3
            }
        );
    }

    #[test]
    fn inspect_rejects_garbage() {
        let err = inspect_jpeg(b"definitely not a jpeg").unwrap_err();
        assert!(matches!(err, QuickscanError::ImageProcessing(_)));
    }

    #[test]
    fn higher_quality_is_not_smaller() {
        let frame = gradient(64, 64);
        let low = FrameEncoder::new(10).encode(&frame).unwrap();
        let high = FrameEncoder::new(95).encode(&frame).unwrap();
        assert!(high.len() >= low.len());
    }
}
