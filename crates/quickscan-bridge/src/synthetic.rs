// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic camera: renders a moving test pattern instead of reading
// hardware. Used for demos on machines without a camera and by the capture
// tests, which inspect track state through `SyntheticProbe`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use quickscan_core::error::{QuickscanError, Result};
use quickscan_core::types::{CameraConstraints, RawFrame};
use tracing::{debug, info};

use crate::traits::{CameraStream, NativeCamera, TrackState};

type TrackRegistry = Arc<Mutex<Vec<Arc<AtomicBool>>>>;

/// Test-pattern camera producing `width` x `height` RGB frames.
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    denial: Option<String>,
    tracks: TrackRegistry,
}

impl SyntheticCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            denial: None,
            tracks: Arc::default(),
        }
    }

    /// A camera whose permission prompt is always refused with `reason`.
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            denial: Some(reason.into()),
            ..Self::new(1, 1)
        }
    }

    /// Handle for observing the tracks of every stream this camera opened.
    pub fn probe(&self) -> SyntheticProbe {
        SyntheticProbe {
            tracks: Arc::clone(&self.tracks),
        }
    }
}

impl NativeCamera for SyntheticCamera {
    fn backend_name(&self) -> &str {
        "Synthetic test pattern"
    }

    fn open_stream(&self, constraints: &CameraConstraints) -> Result<Box<dyn CameraStream>> {
        if let Some(reason) = &self.denial {
            return Err(QuickscanError::CameraUnavailable(reason.clone()));
        }
        if constraints.audio {
            return Err(QuickscanError::CameraUnavailable(
                "audio capture is not supported".into(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(QuickscanError::CameraUnavailable(format!(
                "synthetic source has no pixels ({}x{})",
                self.width, self.height
            )));
        }

        let live = Arc::new(AtomicBool::new(true));
        if let Ok(mut tracks) = self.tracks.lock() {
            tracks.push(Arc::clone(&live));
        }

        info!(
            width = self.width,
            height = self.height,
            facing = ?constraints.facing,
            "synthetic stream opened"
        );

        Ok(Box::new(SyntheticStream {
            width: self.width,
            height: self.height,
            tick: 0,
            live,
        }))
    }
}

/// Read-only view of the tracks opened by a `SyntheticCamera`.
#[derive(Clone)]
pub struct SyntheticProbe {
    tracks: TrackRegistry,
}

impl SyntheticProbe {
    /// Number of tracks that are still live.
    pub fn live_tracks(&self) -> usize {
        self.tracks
            .lock()
            .map(|t| t.iter().filter(|live| live.load(Ordering::SeqCst)).count())
            .unwrap_or(0)
    }

    /// Number of tracks ever opened.
    pub fn opened_tracks(&self) -> usize {
        self.tracks.lock().map(|t| t.len()).unwrap_or(0)
    }
}

struct SyntheticStream {
    width: u32,
    height: u32,
    tick: u32,
    live: Arc<AtomicBool>,
}

impl CameraStream for SyntheticStream {
    fn natural_size(&self) -> Option<(u32, u32)> {
        self.live
            .load(Ordering::SeqCst)
            .then_some((self.width, self.height))
    }

    fn grab_frame(&mut self) -> Result<RawFrame> {
        if !self.live.load(Ordering::SeqCst) {
            return Err(QuickscanError::NoActiveStream);
        }
        self.tick = self.tick.wrapping_add(1);
        let pixels = render_pattern(self.width, self.height, self.tick);
        debug!(tick = self.tick, "synthetic frame rendered");
        RawFrame::new(self.width, self.height, pixels)
    }

    fn tracks(&self) -> Vec<TrackState> {
        if self.live.load(Ordering::SeqCst) {
            vec![TrackState::Live]
        } else {
            vec![TrackState::Ended]
        }
    }

    fn stop(&mut self) {
        if self.live.swap(false, Ordering::SeqCst) {
            info!("synthetic stream stopped");
        }
    }
}

/// Diagonal colour gradient that shifts by `tick` so consecutive frames differ.
fn render_pattern(width: u32, height: u32, tick: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            let b = (tick.wrapping_mul(16) & 0xFF) as u8;
            pixels.extend_from_slice(&[r, g, b]);
        }
    }
    pixels
}
