// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages shown in alerts and the status line.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity picks the level of the dialog the UI shows it in.

use crate::error::QuickscanError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational; nothing went wrong, there was simply nothing to do.
    Notice,
    /// User must do something (grant permission, connect a camera).
    ActionRequired,
    /// Cannot be fixed by retrying, e.g. a corrupt image.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (alert text).
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    pub severity: Severity,
}

impl HumanError {
    /// Message and suggestion joined for a single-line alert body.
    pub fn alert_text(&self) -> String {
        if self.suggestion.is_empty() {
            self.message.clone()
        } else {
            format!("{} {}", self.message, self.suggestion)
        }
    }
}

/// Convert a `QuickscanError` into a `HumanError`.
pub fn humanize_error(err: &QuickscanError) -> HumanError {
    match err {
        // -- Camera --
        QuickscanError::CameraUnavailable(reason) => HumanError {
            message: "Camera unavailable or permission denied.".into(),
            suggestion: reason.clone(),
            severity: Severity::ActionRequired,
        },

        QuickscanError::NoActiveStream => HumanError {
            message: "The camera isn't running.".into(),
            suggestion: "Press Start Camera first, then Capture.".into(),
            severity: Severity::Notice,
        },

        QuickscanError::InvalidFrame(_) => HumanError {
            message: "The camera sent a broken frame.".into(),
            suggestion: "Try capturing again.".into(),
            severity: Severity::Permanent,
        },

        // -- Document --
        QuickscanError::EmptyExport => HumanError {
            message: "No pages to export".into(),
            suggestion: String::new(),
            severity: Severity::Notice,
        },

        QuickscanError::ImageProcessing(detail) => HumanError {
            message: "A captured page couldn't be processed.".into(),
            suggestion: format!("Clear the pages and capture them again. ({detail})"),
            severity: Severity::Permanent,
        },

        QuickscanError::PdfError(detail) => HumanError {
            message: "The PDF couldn't be created.".into(),
            suggestion: format!("No file was saved. ({detail})"),
            severity: Severity::Permanent,
        },

        // -- Storage --
        QuickscanError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app doesn't have permission to save there.".into(),
                    suggestion: "Choose a different download folder in the settings file.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem writing the file.".into(),
                    suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                    severity: Severity::ActionRequired,
                }
            }
        }

        QuickscanError::Serialization(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Default settings are being used instead.".into(),
            severity: Severity::Notice,
        },

        // -- Platform --
        QuickscanError::PlatformUnavailable => HumanError {
            message: "Camera unavailable or permission denied.".into(),
            suggestion: "This build has no camera support for your platform.".into(),
            severity: Severity::Permanent,
        },
    }
}
