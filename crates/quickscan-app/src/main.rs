// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// QuickScan: capture camera frames and export them as a PDF
//
// Entry point. Initialises logging and backend services, and launches the
// Dioxus UI.

mod pages;
mod services;

use dioxus::prelude::*;

use pages::scanner::Scanner;
use services::app_services::AppServices;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("QuickScan starting");

    dioxus::launch(app);
}

/// Root component.
fn app() -> Element {
    let svc = use_hook(|| match AppServices::init() {
        Ok(s) => {
            tracing::info!("backend services initialised");
            s
        }
        Err(e) => {
            tracing::error!(error = %e, "data directory unavailable, using temp dir");
            AppServices::fallback()
        }
    });

    use_context_provider(|| svc.clone());

    rsx! {
        div { class: "app-container",
            style: "display: flex; flex-direction: column; min-height: 100vh; font-family: system-ui, -apple-system, sans-serif;",

            header { style: "padding: 12px 16px; border-bottom: 1px solid #e0e0e0; background: #fafafa;",
                h1 { style: "margin: 0; font-size: 20px;", "QuickScan Prototype" }
            }

            main { style: "flex: 1; padding: 16px;",
                Scanner {}
            }

            footer { style: "padding: 8px 16px; border-top: 1px solid #e0e0e0; color: #888; font-size: 12px;",
                "Pages stay on this device until you export them."
            }
        }
    }
}
