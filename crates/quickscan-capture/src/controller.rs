// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan controller: owns the camera stream and the capture session, and
// drives start/stop, capture, page collection and PDF export.
//
// The live stream sits inside an `ActiveStream` guard whose `Drop` halts every
// track, so the camera is released on stop, on restart, and whenever the
// controller itself goes away (including while unwinding).

use std::path::PathBuf;

use quickscan_bridge::traits::{CameraStream, NativeCamera, TrackState};
use quickscan_core::AppConfig;
use quickscan_core::error::{QuickscanError, Result};
use quickscan_core::types::{CameraConstraints, DocumentType, EncodedImage, RawFrame};
use quickscan_document::{FrameEncoder, PdfWriter};
use tracing::{debug, info, instrument, warn};

use crate::session::CaptureSession;
use crate::sink::DocumentSink;

/// Live view frames only need to be recognisable.
const PREVIEW_JPEG_QUALITY: u8 = 60;

/// Live view frames are downsized to at most this width before encoding.
pub const PREVIEW_MAX_WIDTH: u32 = 640;

/// A started stream. Dropping the guard stops it.
struct ActiveStream {
    stream: Box<dyn CameraStream>,
}

impl ActiveStream {
    fn stop(&mut self) {
        self.stream.stop();
    }
}

impl Drop for ActiveStream {
    fn drop(&mut self) {
        self.stream.stop();
    }
}

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    /// Where the sink put the document.
    pub location: PathBuf,
    pub page_count: usize,
    pub byte_len: usize,
}

/// A grabbed live view frame waiting to be encoded.
///
/// Owns everything it needs, so `render` can run on a worker thread while the
/// controller stays with the UI.
#[derive(Debug)]
pub struct PreviewJob {
    frame: RawFrame,
    encoder: FrameEncoder,
}

impl PreviewJob {
    /// Downsize and encode the frame.
    pub fn render(self) -> Result<EncodedImage> {
        self.encoder.encode_preview(&self.frame, PREVIEW_MAX_WIDTH)
    }
}

/// Export settings pulled out of `AppConfig`.
#[derive(Debug, Clone)]
struct ExportSettings {
    file_name: String,
    title: String,
}

/// The capture-and-export unit: one camera, one session.
pub struct ScanController {
    camera: Box<dyn NativeCamera>,
    constraints: CameraConstraints,
    stream: Option<ActiveStream>,
    session: CaptureSession,
    encoder: FrameEncoder,
    preview_encoder: FrameEncoder,
    export: ExportSettings,
}

impl ScanController {
    pub fn new(camera: Box<dyn NativeCamera>, config: &AppConfig) -> Self {
        info!(backend = camera.backend_name(), "scan controller created");
        Self {
            camera,
            constraints: config.camera_constraints(),
            stream: None,
            session: CaptureSession::new(),
            encoder: FrameEncoder::new(config.effective_jpeg_quality()),
            preview_encoder: FrameEncoder::new(PREVIEW_JPEG_QUALITY),
            export: ExportSettings {
                file_name: config.export_file_name.clone(),
                title: config.pdf_title.clone(),
            },
        }
    }

    // -- Camera ---------------------------------------------------------------

    /// Whether a live stream is bound to the controller.
    pub fn stream_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Name of the camera backend in use.
    pub fn camera_name(&self) -> &str {
        self.camera.backend_name()
    }

    /// Track states of the current stream (empty when stopped).
    pub fn tracks(&self) -> Vec<TrackState> {
        self.stream
            .as_ref()
            .map(|s| s.stream.tracks())
            .unwrap_or_default()
    }

    /// Open the camera with the configured constraints.
    ///
    /// An already running stream is stopped first. On failure the controller
    /// is left without a stream and the error carries the backend's reason.
    #[instrument(skip(self), fields(backend = self.camera.backend_name()))]
    pub fn start_camera(&mut self) -> Result<()> {
        if self.stream.is_some() {
            debug!("restarting camera, releasing previous stream");
            self.stop_camera();
        }

        match self.camera.open_stream(&self.constraints) {
            Ok(stream) => {
                info!(size = ?stream.natural_size(), "camera started");
                self.stream = Some(ActiveStream { stream });
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "camera start failed");
                Err(match err {
                    QuickscanError::CameraUnavailable(reason) => {
                        QuickscanError::CameraUnavailable(reason)
                    }
                    QuickscanError::PlatformUnavailable => QuickscanError::CameraUnavailable(
                        "camera not supported on this platform".into(),
                    ),
                    other => QuickscanError::CameraUnavailable(other.to_string()),
                })
            }
        }
    }

    /// Halt every track of the active stream. Returns `false` when there was
    /// nothing to stop.
    pub fn stop_camera(&mut self) -> bool {
        match self.stream.take() {
            Some(mut active) => {
                active.stop();
                info!("camera stopped");
                true
            }
            None => false,
        }
    }

    // -- Capture --------------------------------------------------------------

    /// Snapshot the current frame at native resolution and keep it as the
    /// pending capture, replacing any earlier one.
    ///
    /// Fails with `NoActiveStream` (leaving the session untouched) when no
    /// stream is running or its frame size is not known yet.
    #[instrument(skip(self))]
    pub fn capture_frame(&mut self) -> Result<&EncodedImage> {
        let active = self.stream.as_mut().ok_or(QuickscanError::NoActiveStream)?;
        let (width, height) = active
            .stream
            .natural_size()
            .ok_or(QuickscanError::NoActiveStream)?;

        let frame = active.stream.grab_frame()?;
        if (frame.width(), frame.height()) != (width, height) {
            debug!(
                expected = ?(width, height),
                got = ?(frame.width(), frame.height()),
                "frame size changed since stream start"
            );
        }
        let encoded = self.encoder.encode(&frame)?;
        info!(
            width = encoded.width(),
            height = encoded.height(),
            bytes = encoded.len(),
            "frame captured"
        );

        self.session.set_captured(encoded);
        self.session
            .captured()
            .ok_or_else(|| QuickscanError::ImageProcessing("capture was not stored".into()))
    }

    /// Grab the current frame for the live view without touching the
    /// session. Encoding is left to the returned job.
    pub fn grab_preview(&mut self) -> Result<PreviewJob> {
        let active = self.stream.as_mut().ok_or(QuickscanError::NoActiveStream)?;
        let frame = active.stream.grab_frame()?;
        Ok(PreviewJob {
            frame,
            encoder: self.preview_encoder,
        })
    }

    /// Grab and encode a live view frame in one step.
    pub fn preview_frame(&mut self) -> Result<EncodedImage> {
        self.grab_preview()?.render()
    }

    // -- Pages ----------------------------------------------------------------

    /// Commit the pending capture as the next page.
    pub fn add_page(&mut self) -> bool {
        let added = self.session.add_page();
        if added {
            info!(pages = self.session.page_count(), "page added");
        } else {
            debug!("add page ignored, nothing captured");
        }
        added
    }

    /// Forget every page and the pending capture. The camera keeps running.
    pub fn clear_all(&mut self) {
        self.session.clear_all();
        info!("session cleared");
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    // -- Export ---------------------------------------------------------------

    /// Images an export would contain right now: committed pages, then the
    /// pending capture.
    pub fn export_set(&self) -> Result<Vec<EncodedImage>> {
        self.session.export_set()
    }

    /// A writer configured with this controller's document settings.
    pub fn pdf_writer(&self) -> PdfWriter {
        let mut writer = PdfWriter::new();
        writer.set_title(self.export.title.clone());
        writer
    }

    /// File name exported documents are delivered under.
    pub fn export_file_name(&self) -> &str {
        &self.export.file_name
    }

    /// Build the PDF from the current export set and hand it to `sink`.
    ///
    /// Nothing reaches the sink unless every page was embedded.
    #[instrument(skip_all)]
    pub fn export_pdf(&self, sink: &dyn DocumentSink) -> Result<ExportReceipt> {
        let images = self.export_set()?;
        export_images(&self.pdf_writer(), &images, &self.export.file_name, sink)
    }
}

impl Drop for ScanController {
    fn drop(&mut self) {
        if self.stop_camera() {
            debug!("camera released on teardown");
        }
    }
}

/// Assemble `images` into a PDF and deliver it as `file_name`.
///
/// Split out from `ScanController::export_pdf` so the UI can run it off the
/// event loop with an owned copy of the export set.
pub fn export_images(
    writer: &PdfWriter,
    images: &[EncodedImage],
    file_name: &str,
    sink: &dyn DocumentSink,
) -> Result<ExportReceipt> {
    let bytes = writer.create_from_images(images)?;
    let location = sink.deliver(file_name, DocumentType::Pdf.mime_type(), &bytes)?;
    info!(
        location = %location.display(),
        pages = images.len(),
        bytes = bytes.len(),
        "export complete"
    );
    Ok(ExportReceipt {
        location,
        page_count: images.len(),
        byte_len: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{DirectorySink, MemorySink};
    use quickscan_bridge::{SyntheticCamera, SyntheticProbe};
    use quickscan_core::config::DEFAULT_EXPORT_FILE_NAME;
    use quickscan_document::PdfReader;

    fn controller(width: u32, height: u32) -> (ScanController, SyntheticProbe) {
        let camera = SyntheticCamera::new(width, height);
        let probe = camera.probe();
        (
            ScanController::new(Box::new(camera), &AppConfig::default()),
            probe,
        )
    }

    fn exported_pdf(sink: &MemorySink) -> PdfReader {
        let files = sink.files();
        assert_eq!(files.len(), 1);
        PdfReader::from_bytes(&files[0].bytes).unwrap()
    }

    #[test]
    fn starts_idle() {
        let (scan, probe) = controller(64, 48);
        assert!(!scan.stream_active());
        assert!(scan.tracks().is_empty());
        assert!(scan.session().captured().is_none());
        assert_eq!(scan.session().page_count(), 0);
        assert_eq!(probe.opened_tracks(), 0);
    }

    #[test]
    fn start_and_stop_release_every_track() {
        let (mut scan, probe) = controller(64, 48);
        scan.start_camera().unwrap();
        assert!(scan.stream_active());
        assert_eq!(scan.tracks(), vec![TrackState::Live]);
        assert_eq!(probe.live_tracks(), 1);

        assert!(scan.stop_camera());
        assert!(!scan.stream_active());
        assert_eq!(probe.live_tracks(), 0);

        // Second stop is a no-op.
        assert!(!scan.stop_camera());
        assert!(!scan.stream_active());
    }

    #[test]
    fn denied_camera_stays_inactive() {
        let camera = SyntheticCamera::denied("Permission denied by user");
        let mut scan = ScanController::new(Box::new(camera), &AppConfig::default());
        match scan.start_camera() {
            Err(QuickscanError::CameraUnavailable(reason)) => {
                assert!(reason.contains("Permission denied by user"))
            }
            other => panic!("expected CameraUnavailable, got {other:?}"),
        }
        assert!(!scan.stream_active());
    }

    #[test]
    fn restart_releases_previous_stream() {
        let (mut scan, probe) = controller(32, 32);
        scan.start_camera().unwrap();
        scan.start_camera().unwrap();
        assert_eq!(probe.opened_tracks(), 2);
        assert_eq!(probe.live_tracks(), 1);
    }

    #[test]
    fn dropping_controller_releases_camera() {
        let (mut scan, probe) = controller(32, 32);
        scan.start_camera().unwrap();
        drop(scan);
        assert_eq!(probe.live_tracks(), 0);
    }

    #[test]
    fn unwinding_releases_camera() {
        let (mut scan, probe) = controller(32, 32);
        scan.start_camera().unwrap();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _owned = scan;
            panic!("component blew up");
        }));
        assert!(result.is_err());
        assert_eq!(probe.live_tracks(), 0);
    }

    #[test]
    fn capture_without_stream_is_rejected() {
        let (mut scan, _probe) = controller(32, 32);
        assert!(matches!(
            scan.capture_frame(),
            Err(QuickscanError::NoActiveStream)
        ));
        scan.start_camera().unwrap();
        scan.stop_camera();
        assert!(matches!(
            scan.capture_frame(),
            Err(QuickscanError::NoActiveStream)
        ));
        assert!(scan.session().captured().is_none());
    }

    #[test]
    fn capture_uses_native_resolution() {
        let (mut scan, _probe) = controller(320, 240);
        scan.start_camera().unwrap();
        let captured = scan.capture_frame().unwrap();
        assert_eq!((captured.width(), captured.height()), (320, 240));
        assert_eq!(captured.mime_type(), "image/jpeg");
    }

    #[test]
    fn capture_add_pairs_grow_pages_in_order() {
        let (mut scan, _probe) = controller(16, 16);
        scan.start_camera().unwrap();
        let mut expected = Vec::new();
        for n in 1..=4 {
            expected.push(scan.capture_frame().unwrap().clone());
            assert!(scan.add_page());
            assert_eq!(scan.session().page_count(), n);
        }
        assert_eq!(scan.session().pages(), expected.as_slice());
    }

    #[test]
    fn preview_does_not_touch_session() {
        let (mut scan, _probe) = controller(24, 16);
        assert!(matches!(
            scan.preview_frame(),
            Err(QuickscanError::NoActiveStream)
        ));
        scan.start_camera().unwrap();
        let preview = scan.preview_frame().unwrap();
        assert_eq!((preview.width(), preview.height()), (24, 16));
        assert!(scan.session().captured().is_none());
        assert_eq!(scan.session().page_count(), 0);
    }

    #[test]
    fn preview_is_downsized_and_renders_off_thread() {
        let (mut scan, _probe) = controller(1920, 1080);
        scan.start_camera().unwrap();

        let job = scan.grab_preview().unwrap();
        let preview = std::thread::spawn(move || job.render())
            .join()
            .unwrap()
            .unwrap();
        assert_eq!(
            (preview.width(), preview.height()),
            (PREVIEW_MAX_WIDTH, 360)
        );
        assert!(scan.session().captured().is_none());

        // Captures stay at native resolution.
        let capture = scan.capture_frame().unwrap();
        assert_eq!((capture.width(), capture.height()), (1920, 1080));
    }

    #[test]
    fn add_page_without_capture_is_noop() {
        let (mut scan, _probe) = controller(16, 16);
        assert!(!scan.add_page());
        assert_eq!(scan.session().page_count(), 0);
    }

    #[test]
    fn clear_all_keeps_camera_running() {
        let (mut scan, probe) = controller(16, 16);
        scan.start_camera().unwrap();
        scan.capture_frame().unwrap();
        scan.add_page();
        scan.capture_frame().unwrap();

        scan.clear_all();
        assert_eq!(scan.session().page_count(), 0);
        assert!(scan.session().captured().is_none());
        assert!(scan.stream_active());
        assert_eq!(probe.live_tracks(), 1);
    }

    #[test]
    fn empty_export_delivers_nothing() {
        let (scan, _probe) = controller(16, 16);
        let sink = MemorySink::new();
        assert!(matches!(
            scan.export_pdf(&sink),
            Err(QuickscanError::EmptyExport)
        ));
        assert!(sink.files().is_empty());
    }

    #[test]
    fn single_committed_page_exports_one_page_at_frame_size() {
        let (mut scan, _probe) = controller(200, 150);
        scan.start_camera().unwrap();
        scan.capture_frame().unwrap();
        scan.add_page();

        let sink = MemorySink::new();
        let receipt = scan.export_pdf(&sink).unwrap();
        assert_eq!(receipt.page_count, 1);
        assert_eq!(receipt.location, PathBuf::from(DEFAULT_EXPORT_FILE_NAME));

        let files = sink.files();
        assert_eq!(files[0].name, "quickscan_document.pdf");
        assert_eq!(files[0].mime_type, "application/pdf");
        assert_eq!(receipt.byte_len, files[0].bytes.len());

        let pdf = exported_pdf(&sink);
        assert_eq!(pdf.page_count(), 1);
        assert_eq!(pdf.page_sizes().unwrap(), vec![(200.0, 150.0)]);
    }

    #[test]
    fn export_to_directory_is_readable_from_disk() {
        let (mut scan, _probe) = controller(120, 90);
        scan.start_camera().unwrap();
        scan.capture_frame().unwrap();
        scan.add_page();

        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("Downloads"));
        let receipt = scan.export_pdf(&sink).unwrap();
        assert_eq!(receipt.location, sink.dir().join(DEFAULT_EXPORT_FILE_NAME));

        let pdf = PdfReader::open(&receipt.location).unwrap();
        assert_eq!(pdf.page_count(), 1);
        assert_eq!(pdf.page_sizes().unwrap(), vec![(120.0, 90.0)]);
    }

    #[test]
    fn uncommitted_capture_is_exported_as_last_page() {
        let (mut scan, _probe) = controller(48, 36);
        scan.start_camera().unwrap();
        let first = scan.capture_frame().unwrap().clone();
        scan.add_page();
        let second = scan.capture_frame().unwrap().clone();
        scan.add_page();
        let third = scan.capture_frame().unwrap().clone();

        let sink = MemorySink::new();
        scan.export_pdf(&sink).unwrap();

        let pdf = exported_pdf(&sink);
        assert_eq!(pdf.page_count(), 3);
        let embedded: Vec<Vec<u8>> = (1..=3)
            .map(|n| pdf.image_data(n).unwrap().remove(0))
            .collect();
        assert_eq!(
            embedded,
            vec![
                first.bytes().to_vec(),
                second.bytes().to_vec(),
                third.bytes().to_vec()
            ]
        );
        // The pending capture stays pending after export.
        assert_eq!(scan.session().page_count(), 2);
        assert!(scan.session().captured().is_some());
    }

    #[test]
    fn page_size_round_trips_for_various_resolutions() {
        for (w, h) in [(1, 1), (640, 480), (480, 640), (1280, 720)] {
            let (mut scan, _probe) = controller(w, h);
            scan.start_camera().unwrap();
            scan.capture_frame().unwrap();

            let sink = MemorySink::new();
            scan.export_pdf(&sink).unwrap();
            let pdf = exported_pdf(&sink);
            assert_eq!(pdf.page_sizes().unwrap(), vec![(w as f32, h as f32)]);
        }
    }

    #[test]
    fn corrupt_page_fails_without_output() {
        let sink = MemorySink::new();
        let images = vec![EncodedImage::jpeg(b"not a jpeg".to_vec(), 4, 4)];
        let err = export_images(&PdfWriter::new(), &images, "x.pdf", &sink).unwrap_err();
        assert!(matches!(err, QuickscanError::ImageProcessing(_)));
        assert!(sink.files().is_empty());
    }

    #[test]
    fn configured_title_and_file_name_are_used() {
        let config = AppConfig {
            export_file_name: "receipts.pdf".into(),
            pdf_title: "Receipts".into(),
            ..AppConfig::default()
        };
        let mut scan = ScanController::new(Box::new(SyntheticCamera::new(8, 8)), &config);
        scan.start_camera().unwrap();
        scan.capture_frame().unwrap();

        let sink = MemorySink::new();
        scan.export_pdf(&sink).unwrap();
        assert_eq!(sink.files()[0].name, "receipts.pdf");
        assert_eq!(exported_pdf(&sink).title().as_deref(), Some("Receipts"));
    }
}
