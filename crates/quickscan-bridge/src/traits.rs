// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic camera traits.

use quickscan_core::error::Result;
use quickscan_core::types::{CameraConstraints, RawFrame};

/// A camera device that can be asked for a live video stream.
pub trait NativeCamera {
    /// Human-readable backend name (e.g. "Webcam (nokhwa)").
    fn backend_name(&self) -> &str;

    /// Acquire a video stream matching `constraints`.
    ///
    /// Permission refusal, missing hardware and unsupported environments are
    /// all reported as `QuickscanError::CameraUnavailable` with the
    /// underlying reason.
    fn open_stream(&self, constraints: &CameraConstraints) -> Result<Box<dyn CameraStream>>;
}

/// State of a single media track inside a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Live,
    Ended,
}

/// A live video stream owned by exactly one consumer.
pub trait CameraStream {
    /// Native frame size, or `None` while it is not yet known (or after the
    /// stream has stopped).
    fn natural_size(&self) -> Option<(u32, u32)>;

    /// Copy the current frame at native resolution.
    fn grab_frame(&mut self) -> Result<RawFrame>;

    /// State of every track in the stream.
    fn tracks(&self) -> Vec<TrackState>;

    /// Halt every track and release the device. Must be idempotent.
    fn stop(&mut self);

    /// True while at least one track is live.
    fn is_live(&self) -> bool {
        self.tracks().iter().any(|t| *t == TrackState::Live)
    }
}
