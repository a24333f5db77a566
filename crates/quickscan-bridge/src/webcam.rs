// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Webcam backend built on `nokhwa` (V4L2 / AVFoundation / Media Foundation).
//
// Desktop cameras do not advertise a facing direction, so the requested
// `FacingMode` is matched against device names ("Rear Camera", "Back
// Camera", ...). When nothing matches, the first enumerated device is used.

use nokhwa::Camera;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, CameraInfo, RequestedFormat, RequestedFormatType};
use quickscan_core::error::{QuickscanError, Result};
use quickscan_core::types::{CameraConstraints, FacingMode, RawFrame};
use tracing::{debug, info, warn};

use crate::traits::{CameraStream, NativeCamera, TrackState};

/// Camera backed by the operating system's video capture API.
pub struct WebcamCamera {
    backend: ApiBackend,
}

impl WebcamCamera {
    pub fn new() -> Self {
        Self {
            backend: ApiBackend::Auto,
        }
    }
}

impl Default for WebcamCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeCamera for WebcamCamera {
    fn backend_name(&self) -> &str {
        "Webcam (nokhwa)"
    }

    fn open_stream(&self, constraints: &CameraConstraints) -> Result<Box<dyn CameraStream>> {
        if constraints.audio {
            return Err(QuickscanError::CameraUnavailable(
                "audio capture is not supported".into(),
            ));
        }

        let devices = nokhwa::query(self.backend)
            .map_err(|e| QuickscanError::CameraUnavailable(e.to_string()))?;
        let index = pick_device(&devices, constraints.facing).ok_or_else(|| {
            QuickscanError::CameraUnavailable("no camera devices found".into())
        })?;

        let format =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
        let mut camera = Camera::new(index.clone(), format)
            .map_err(|e| QuickscanError::CameraUnavailable(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| QuickscanError::CameraUnavailable(e.to_string()))?;

        let resolution = camera.resolution();
        info!(
            device = %index,
            width = resolution.width(),
            height = resolution.height(),
            "webcam stream opened"
        );

        Ok(Box::new(WebcamStream {
            camera,
            live: true,
        }))
    }
}

/// Prefer a device whose name matches the facing hints, else the first one.
fn pick_device(devices: &[CameraInfo], facing: FacingMode) -> Option<CameraIndex> {
    let hinted = devices.iter().find(|info| {
        let name = info.human_name().to_ascii_lowercase();
        facing.name_hints().iter().any(|hint| name.contains(hint))
    });
    if hinted.is_none() && !devices.is_empty() {
        debug!(?facing, "no device name matches facing mode, using first camera");
    }
    hinted.or(devices.first()).map(|info| info.index().clone())
}

struct WebcamStream {
    camera: Camera,
    live: bool,
}

impl CameraStream for WebcamStream {
    fn natural_size(&self) -> Option<(u32, u32)> {
        if !self.live {
            return None;
        }
        let resolution = self.camera.resolution();
        let size = (resolution.width(), resolution.height());
        (size.0 > 0 && size.1 > 0).then_some(size)
    }

    fn grab_frame(&mut self) -> Result<RawFrame> {
        if !self.live {
            return Err(QuickscanError::NoActiveStream);
        }
        let buffer = self
            .camera
            .frame()
            .map_err(|e| QuickscanError::ImageProcessing(format!("frame grab failed: {e}")))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| QuickscanError::ImageProcessing(format!("frame decode failed: {e}")))?;
        let (width, height) = (decoded.width(), decoded.height());
        RawFrame::new(width, height, decoded.into_raw())
    }

    fn tracks(&self) -> Vec<TrackState> {
        if self.live {
            vec![TrackState::Live]
        } else {
            vec![TrackState::Ended]
        }
    }

    fn stop(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;
        match self.camera.stop_stream() {
            Ok(()) => info!("webcam stream stopped"),
            Err(e) => warn!(error = %e, "webcam did not stop cleanly"),
        }
    }
}

impl Drop for WebcamStream {
    fn drop(&mut self) {
        self.stop();
    }
}
