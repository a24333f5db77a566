// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub camera for builds without a camera backend.

use quickscan_core::error::{QuickscanError, Result};
use quickscan_core::types::CameraConstraints;

use crate::traits::{CameraStream, NativeCamera};

/// Camera that is never available.
pub struct StubCamera;

impl NativeCamera for StubCamera {
    fn backend_name(&self) -> &str {
        "Unavailable (stub)"
    }

    fn open_stream(&self, _constraints: &CameraConstraints) -> Result<Box<dyn CameraStream>> {
        tracing::warn!("NativeCamera::open_stream called on stub camera");
        Err(QuickscanError::CameraUnavailable(
            "no camera backend in this build (enable the `webcam` feature or use the synthetic source)"
                .into(),
        ))
    }
}
