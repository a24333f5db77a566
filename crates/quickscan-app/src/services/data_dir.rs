// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data and download directory resolution.

use std::path::{Path, PathBuf};

/// Return the application data directory, creating it if needed.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = dirs_fallback().join("quickscan");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Where exported documents go: the configured override, else
/// `$XDG_DOWNLOAD_DIR`, else `~/Downloads` if it exists, else `fallback`.
pub fn download_dir(configured: Option<&Path>, fallback: &Path) -> PathBuf {
    resolve_download_dir(
        configured,
        std::env::var_os("XDG_DOWNLOAD_DIR").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
        fallback,
    )
}

fn resolve_download_dir(
    configured: Option<&Path>,
    xdg_download: Option<PathBuf>,
    home: Option<PathBuf>,
    fallback: &Path,
) -> PathBuf {
    if let Some(dir) = configured {
        return dir.to_path_buf();
    }
    if let Some(dir) = xdg_download.filter(|d| !d.as_os_str().is_empty()) {
        return dir;
    }
    if let Some(downloads) = home.map(|h| h.join("Downloads")).filter(|d| d.is_dir()) {
        return downloads;
    }
    fallback.to_path_buf()
}

fn dirs_fallback() -> PathBuf {
    // Try XDG data dir, then fallback to home
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    // Last resort
    std::env::temp_dir()
}
