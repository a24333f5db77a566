// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner page: live camera view, capture, page list and PDF export.
//
// The camera is owned by a `ScanController` held in a signal, so it is
// released when the page unmounts even if nobody pressed Stop. The render
// never reads that signal: what the page shows lives in small signals that
// the handlers update, so the live view ticking does not re-render the page.

use std::time::Duration;

use dioxus::prelude::*;

use quickscan_capture::{ScanController, export_images};
use quickscan_core::error::QuickscanError;
use quickscan_core::human_errors::{Severity, humanize_error};

use crate::services::app_services::AppServices;

/// How often the live view pulls a new frame.
const PREVIEW_INTERVAL: Duration = Duration::from_millis(150);

/// Dialog level for an error of the given severity.
fn message_level(severity: Severity) -> rfd::MessageLevel {
    match severity {
        Severity::Notice => rfd::MessageLevel::Info,
        Severity::ActionRequired => rfd::MessageLevel::Warning,
        Severity::Permanent => rfd::MessageLevel::Error,
    }
}

/// Blocking alert for failures the user has to acknowledge.
fn alert(err: &QuickscanError) {
    let human = humanize_error(err);
    tracing::warn!(error = %err, severity = ?human.severity, "showing alert");
    rfd::MessageDialog::new()
        .set_level(message_level(human.severity))
        .set_title("QuickScan")
        .set_description(human.alert_text())
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

/// Data URLs for the preview panel. Updated by the handlers that change the
/// session, never rebuilt on render.
#[derive(Debug, Clone, Default, PartialEq)]
struct SessionView {
    captured: Option<String>,
    pages: Vec<String>,
}

impl SessionView {
    fn of(ctrl: &ScanController) -> Self {
        let session = ctrl.session();
        Self {
            captured: session.captured().map(|c| c.to_data_url()),
            pages: session.pages().iter().map(|p| p.to_data_url()).collect(),
        }
    }

    /// Mirror a successful `add_page`.
    fn commit_capture(&mut self) {
        if let Some(url) = self.captured.take() {
            self.pages.push(url);
        }
    }
}

#[component]
pub fn Scanner() -> Element {
    let svc = use_context::<AppServices>();
    let mut controller = use_signal({
        let svc = svc.clone();
        move || ScanController::new(svc.camera(), &svc.config())
    });
    let camera_name = use_hook(|| controller.peek().camera_name().to_string());
    let mut streaming = use_signal(|| false);
    let mut live_frame = use_signal(|| Option::<String>::None);
    let mut session_view = use_signal(SessionView::default);
    let mut status_msg = use_signal(|| Option::<String>::None);
    let mut exporting = use_signal(|| false);

    // Live view: grab on the event loop, encode on a worker.
    use_future(move || async move {
        loop {
            tokio::time::sleep(PREVIEW_INTERVAL).await;
            if !controller.peek().stream_active() {
                if live_frame.peek().is_some() {
                    live_frame.set(None);
                }
                continue;
            }
            let grabbed = controller.write().grab_preview();
            let job = match grabbed {
                Ok(job) => job,
                Err(e) => {
                    tracing::debug!(error = %e, "preview frame skipped");
                    continue;
                }
            };
            let rendered =
                tokio::task::spawn_blocking(move || job.render().map(|i| i.to_data_url())).await;
            match rendered {
                // The camera may have been stopped while the frame was encoding.
                Ok(Ok(url)) if controller.peek().stream_active() => live_frame.set(Some(url)),
                Ok(Ok(_)) => {}
                Ok(Err(e)) => tracing::debug!(error = %e, "preview frame skipped"),
                Err(e) => tracing::warn!(error = %e, "preview task failed"),
            }
        }
    });

    // Release the camera when the page goes away.
    use_drop(move || {
        if let Ok(mut ctrl) = controller.try_write() {
            if ctrl.stop_camera() {
                tracing::info!("camera released on unmount");
            }
        }
    });

    let is_streaming = *streaming.read();
    let view = session_view.read();
    let page_count = view.pages.len();

    rsx! {
        div { style: "display: flex; gap: 24px; flex-wrap: wrap;",

            // -- Camera panel --
            div { style: "flex: 2; min-width: 320px;",
                LiveView { frame: live_frame }
                p { style: "color: #888; font-size: 12px; margin: 4px 0;", "Source: {camera_name}" }

                div { style: "display: flex; gap: 8px; flex-wrap: wrap; margin-top: 12px;",
                    button {
                        style: "padding: 10px 16px; border-radius: 8px; border: 1px solid #007aff; color: #007aff; background: white;",
                        onclick: move |_| {
                            if controller.peek().stream_active() {
                                controller.write().stop_camera();
                                streaming.set(false);
                                live_frame.set(None);
                                status_msg.set(Some("Camera stopped.".into()));
                            } else {
                                let started = controller.write().start_camera();
                                match started {
                                    Ok(()) => {
                                        streaming.set(true);
                                        status_msg.set(Some("Camera started.".into()));
                                    }
                                    Err(e) => {
                                        streaming.set(false);
                                        alert(&e);
                                    }
                                }
                            }
                        },
                        if is_streaming { "Stop Camera" } else { "Start Camera" }
                    }
                    button {
                        style: "padding: 10px 16px; border-radius: 8px; border: none; background: #007aff; color: white;",
                        disabled: !is_streaming,
                        onclick: move |_| {
                            let captured = controller
                                .write()
                                .capture_frame()
                                .map(|c| (c.width(), c.height(), c.to_data_url()));
                            match captured {
                                Ok((w, h, url)) => {
                                    session_view.write().captured = Some(url);
                                    status_msg.set(Some(format!("Captured {w}x{h}.")));
                                }
                                Err(QuickscanError::NoActiveStream) => {
                                    tracing::info!("capture ignored, camera not running");
                                    status_msg.set(Some(humanize_error(&QuickscanError::NoActiveStream).message));
                                }
                                Err(e) => alert(&e),
                            }
                        },
                        "Capture"
                    }
                    button {
                        style: "padding: 10px 16px; border-radius: 8px; border: 1px solid #ccc; background: white;",
                        onclick: move |_| {
                            if controller.write().add_page() {
                                session_view.write().commit_capture();
                                let n = controller.peek().session().page_count();
                                status_msg.set(Some(format!("Page {n} added.")));
                            }
                        },
                        "Add Page"
                    }
                    button {
                        style: "padding: 10px 16px; border-radius: 8px; border: none; background: #34c759; color: white;",
                        disabled: *exporting.read(),
                        onclick: {
                            let svc = svc.clone();
                            move |_| {
                                let prepared = {
                                    let ctrl = controller.peek();
                                    ctrl.export_set().map(|images| {
                                        (images, ctrl.pdf_writer(), ctrl.export_file_name().to_string())
                                    })
                                };
                                let (images, writer, file_name) = match prepared {
                                    Ok(prepared) => prepared,
                                    Err(e) => {
                                        alert(&e);
                                        return;
                                    }
                                };
                                let sink = svc.download_sink();
                                exporting.set(true);
                                status_msg.set(Some("Building PDF...".into()));

                                spawn(async move {
                                    let result = tokio::task::spawn_blocking(move || {
                                        export_images(&writer, &images, &file_name, &sink)
                                    })
                                    .await;
                                    exporting.set(false);
                                    match result {
                                        Ok(Ok(receipt)) => {
                                            status_msg.set(Some(format!(
                                                "Saved {} page(s) to {} ({} KB)",
                                                receipt.page_count,
                                                receipt.location.display(),
                                                receipt.byte_len / 1024,
                                            )));
                                        }
                                        Ok(Err(e)) => {
                                            status_msg.set(None);
                                            alert(&e);
                                        }
                                        Err(e) => {
                                            tracing::error!(error = %e, "export task failed");
                                            status_msg.set(Some("Export failed.".into()));
                                        }
                                    }
                                });
                            }
                        },
                        if *exporting.read() { "Exporting..." } else { "Export PDF" }
                    }
                    button {
                        style: "padding: 10px 16px; border-radius: 8px; border: 1px solid #ff3b30; color: #ff3b30; background: white;",
                        onclick: move |_| {
                            controller.write().clear_all();
                            session_view.set(SessionView::default());
                            status_msg.set(Some("All pages cleared.".into()));
                        },
                        "Clear"
                    }
                }

                if let Some(ref msg) = *status_msg.read() {
                    p { style: "margin-top: 12px; color: #666; font-size: 14px;", "{msg}" }
                }
            }

            // -- Preview panel --
            div { style: "flex: 1; min-width: 240px;",
                h3 { "Capture" }
                if let Some(ref url) = view.captured {
                    img { src: "{url}", style: "width: 100%; border: 1px solid #ccc; border-radius: 4px;" }
                } else {
                    p { style: "color: #aaa;", "No capture" }
                }

                h3 { "Pages ({page_count})" }
                div { style: "display: grid; grid-template-columns: repeat(auto-fill, minmax(72px, 1fr)); gap: 8px;",
                    for (i, url) in view.pages.iter().enumerate() {
                        div { key: "{i}", style: "display: flex; flex-direction: column; align-items: center; font-size: 12px;",
                            img { src: "{url}", style: "width: 72px; height: 96px; object-fit: cover; border: 1px solid #ccc; border-radius: 4px;" }
                            span { "P{i + 1}" }
                        }
                    }
                }

                p { style: "color: #888; font-size: 12px; margin-top: 16px;",
                    "Capture a frame, then Add Page to keep it. Export PDF includes an unsaved capture as the last page."
                }
            }
        }
    }
}

/// The live camera surface. Only this component re-renders per frame.
#[component]
fn LiveView(frame: Signal<Option<String>>) -> Element {
    rsx! {
        div { style: "background: #111; border-radius: 8px; aspect-ratio: 4 / 3; display: flex; align-items: center; justify-content: center; overflow: hidden;",
            if let Some(ref url) = *frame.read() {
                img { src: "{url}", style: "width: 100%; height: 100%; object-fit: contain;" }
            } else {
                span { style: "color: #888;", "Camera off" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickscan_bridge::SyntheticCamera;
    use quickscan_core::AppConfig;

    fn controller() -> ScanController {
        ScanController::new(Box::new(SyntheticCamera::new(32, 24)), &AppConfig::default())
    }

    #[test]
    fn severity_picks_dialog_level() {
        let notice = humanize_error(&QuickscanError::EmptyExport);
        assert!(matches!(message_level(notice.severity), rfd::MessageLevel::Info));

        let denied = humanize_error(&QuickscanError::CameraUnavailable("denied".into()));
        assert!(matches!(message_level(denied.severity), rfd::MessageLevel::Warning));

        let corrupt = humanize_error(&QuickscanError::ImageProcessing("page 1".into()));
        assert!(matches!(message_level(corrupt.severity), rfd::MessageLevel::Error));
    }

    #[test]
    fn incremental_view_matches_session() {
        let mut scan = controller();
        let mut view = SessionView::default();
        scan.start_camera().unwrap();

        for _ in 0..3 {
            view.captured = Some(scan.capture_frame().unwrap().to_data_url());
            assert_eq!(view, SessionView::of(&scan));
            assert!(scan.add_page());
            view.commit_capture();
            assert_eq!(view, SessionView::of(&scan));
        }
        assert_eq!(view.pages.len(), 3);
        assert!(view.captured.is_none());

        // Nothing pending: the view stays as it is.
        assert!(!scan.add_page());
        view.commit_capture();
        assert_eq!(view, SessionView::of(&scan));

        scan.clear_all();
        assert_eq!(SessionView::of(&scan), SessionView::default());
    }
}
