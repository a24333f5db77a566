// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for QuickScan.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::error::{QuickscanError, Result};

/// Which way the requested camera should face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacingMode {
    /// Rear camera, pointing away from the user (document capture).
    Environment,
    /// Front camera, pointing at the user.
    User,
}

impl FacingMode {
    /// Keywords that device names commonly carry for this facing direction.
    pub fn name_hints(&self) -> &'static [&'static str] {
        match self {
            Self::Environment => &["back", "rear", "environment", "world"],
            Self::User => &["front", "user", "facetime", "integrated"],
        }
    }
}

/// What to ask the camera backend for when opening a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConstraints {
    pub facing: FacingMode,
    /// Audio is never captured; kept explicit so backends can assert it.
    pub audio: bool,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            facing: FacingMode::Environment,
            audio: false,
        }
    }
}

/// Output document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Pdf,
    Jpeg,
}

impl DocumentType {
    /// MIME type string.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// An uncompressed RGB8 video frame as delivered by a camera stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RawFrame {
    /// Wrap a tightly packed RGB8 buffer. The buffer length must be exactly
    /// `width * height * 3`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(QuickscanError::InvalidFrame(format!(
                "frame has no pixels ({width}x{height})"
            )));
        }
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(QuickscanError::InvalidFrame(format!(
                "expected {expected} bytes for {width}x{height} RGB8, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// A JPEG-encoded capture together with the pixel dimensions recorded when it
/// was encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl EncodedImage {
    pub fn jpeg(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            bytes,
            width,
            height,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mime_type(&self) -> &'static str {
        DocumentType::Jpeg.mime_type()
    }

    /// Size of the encoded payload in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:` URL suitable for an `<img src>` preview.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), BASE64.encode(&self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_frame_rejects_short_buffer() {
        let err = RawFrame::new(4, 4, vec![0; 10]).unwrap_err();
        assert!(matches!(err, QuickscanError::InvalidFrame(_)));
    }

    #[test]
    fn raw_frame_rejects_zero_dimensions() {
        assert!(RawFrame::new(0, 10, Vec::new()).is_err());
    }

    #[test]
    fn raw_frame_accepts_exact_buffer() {
        let frame = RawFrame::new(2, 3, vec![7; 18]).unwrap();
        assert_eq!((frame.width(), frame.height()), (2, 3));
        assert_eq!(frame.pixels().len(), 18);
    }

    #[test]
    fn data_url_has_jpeg_prefix() {
        let img = EncodedImage::jpeg(vec![0xFF, 0xD8, 0xFF], 1, 1);
        assert_eq!(img.to_data_url(), "data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn default_constraints_are_rear_without_audio() {
        let c = CameraConstraints::default();
        assert_eq!(c.facing, FacingMode::Environment);
        assert!(!c.audio);
    }
}
