// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer: loads configuration and hands the UI its camera
// backend and download sink.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use quickscan_bridge::NativeCamera;
use quickscan_capture::DirectorySink;
use quickscan_core::AppConfig;
use quickscan_core::error::Result;
use tracing::{info, warn};

use super::data_dir;

/// Shared application services accessible from all Dioxus components via
/// `use_context::<AppServices>()`.
#[derive(Clone)]
pub struct AppServices {
    data_dir: PathBuf,
    config: Arc<Mutex<AppConfig>>,
}

impl AppServices {
    /// Initialise services. Call once at app startup.
    ///
    /// Creates the data directory and loads `config.json`, writing the
    /// defaults on first launch so they can be edited.
    pub fn init() -> Result<Self> {
        let dir = data_dir::data_dir()?;
        info!(path = %dir.display(), "initialising app services");
        Self::with_data_dir(dir)
    }

    /// Services rooted in the system temp directory, for when the data
    /// directory cannot be created.
    pub fn fallback() -> Self {
        Self {
            data_dir: std::env::temp_dir(),
            config: Arc::new(Mutex::new(AppConfig::default())),
        }
    }

    fn with_data_dir(dir: PathBuf) -> Result<Self> {
        let config = match load_config(&dir) {
            Some(config) => config,
            None => {
                let config = AppConfig::default();
                if let Err(e) = persist_config(&dir, &config) {
                    warn!(error = %e, "could not write default config");
                }
                config
            }
        };

        Ok(Self {
            data_dir: dir,
            config: Arc::new(Mutex::new(config)),
        })
    }

    // -- Config ---------------------------------------------------------------

    /// Get a clone of the current config.
    pub fn config(&self) -> AppConfig {
        self.config
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    // -- Capture plumbing -----------------------------------------------------

    /// Camera backend selected by the configured source.
    pub fn camera(&self) -> Box<dyn NativeCamera> {
        quickscan_bridge::platform_camera(self.config().camera_source)
    }

    /// Directory exported documents are written to.
    pub fn download_dir(&self) -> PathBuf {
        let config = self.config();
        data_dir::download_dir(config.download_dir.as_deref(), &self.data_dir)
    }

    /// Sink that saves exports into the download directory.
    pub fn download_sink(&self) -> DirectorySink {
        DirectorySink::new(self.download_dir())
    }
}

// -- Config file persistence -------------------------------------------------

const CONFIG_FILE: &str = "config.json";

fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}
