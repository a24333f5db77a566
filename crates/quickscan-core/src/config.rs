// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{CameraConstraints, FacingMode};

/// Name of the exported document.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "quickscan_document.pdf";

/// JPEG quality used for captures (0.9 on a 0..1 scale).
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Where camera frames come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraSource {
    /// The platform camera backend.
    Default,
    /// Built-in test pattern, no hardware needed.
    Synthetic { width: u32, height: u32 },
}

/// Application settings, loaded from `config.json` in the data directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// JPEG quality for captured frames (1-100).
    pub jpeg_quality: u8,
    /// File name given to exported documents.
    pub export_file_name: String,
    /// Title written into the PDF /Info dictionary.
    pub pdf_title: String,
    /// Requested camera direction.
    pub facing_mode: FacingMode,
    pub camera_source: CameraSource,
    /// Overrides the platform download directory.
    pub download_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Quality clamped into the range the JPEG encoder accepts.
    pub fn effective_jpeg_quality(&self) -> u8 {
        self.jpeg_quality.clamp(1, 100)
    }

    pub fn camera_constraints(&self) -> CameraConstraints {
        CameraConstraints {
            facing: self.facing_mode,
            audio: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            pdf_title: "QuickScan Document".to_string(),
            facing_mode: FacingMode::Environment,
            camera_source: CameraSource::Default,
            download_dir: None,
        }
    }
}
