// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// quickscan-document: Document processing for QuickScan.
//
// Provides JPEG encoding of raw camera frames and assembly of encoded images
// into a PDF with one full-bleed page per image, plus a small reader for
// inspecting the result.

pub mod image;
pub mod pdf;

// Re-export the primary structs so callers can use `quickscan_document::PdfWriter` etc.
pub use image::encoder::FrameEncoder;
pub use pdf::reader::PdfReader;
pub use pdf::writer::PdfWriter;
