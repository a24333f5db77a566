// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// quickscan-bridge: camera abstractions and platform dispatch.
//
// The capture controller only ever talks to `NativeCamera` / `CameraStream`.
// Which backend sits behind them is decided here from the build features and
// the configured camera source.

pub mod stub;
pub mod synthetic;
pub mod traits;

#[cfg(feature = "webcam")]
pub mod webcam;

use quickscan_core::config::CameraSource;

pub use synthetic::{SyntheticCamera, SyntheticProbe};
pub use traits::{CameraStream, NativeCamera, TrackState};

/// Build the camera backend for the configured source.
///
/// `CameraSource::Default` resolves to the `nokhwa` webcam backend when the
/// `webcam` feature is enabled and to the stub (which always reports the
/// camera as unavailable) otherwise.
pub fn platform_camera(source: CameraSource) -> Box<dyn NativeCamera> {
    match source {
        CameraSource::Synthetic { width, height } => Box::new(SyntheticCamera::new(width, height)),
        CameraSource::Default => default_camera(),
    }
}

#[cfg(feature = "webcam")]
fn default_camera() -> Box<dyn NativeCamera> {
    Box::new(webcam::WebcamCamera::new())
}

#[cfg(not(feature = "webcam"))]
fn default_camera() -> Box<dyn NativeCamera> {
    Box::new(stub::StubCamera)
}
