// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// quickscan-capture: the capture-and-export unit.
//
// `CaptureSession` holds the pending capture and committed pages,
// `ScanController` owns the camera stream and drives capture and export, and
// the `DocumentSink` implementations deliver the finished PDF.

pub mod controller;
pub mod session;
pub mod sink;

pub use controller::{ExportReceipt, PREVIEW_MAX_WIDTH, PreviewJob, ScanController, export_images};
pub use session::CaptureSession;
pub use sink::{DirectorySink, DocumentSink, MemorySink};
