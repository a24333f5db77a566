// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for QuickScan.

use thiserror::Error;

/// Top-level error type for all QuickScan operations.
#[derive(Debug, Error)]
pub enum QuickscanError {
    // -- Camera errors --
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("no active camera stream")]
    NoActiveStream,

    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    // -- Document errors --
    #[error("nothing to export")]
    EmptyExport,

    #[error("image processing failed: {0}")]
    ImageProcessing(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- Storage --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, QuickscanError>;
