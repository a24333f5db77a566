// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: JPEG encoding and decoding of captured frames.

pub mod encoder;

pub use encoder::{FrameEncoder, JpegInfo, inspect_jpeg};
