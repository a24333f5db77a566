// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture session: the pending capture plus the committed page list.

use quickscan_core::error::{QuickscanError, Result};
use quickscan_core::types::EncodedImage;

/// Pages committed so far and at most one uncommitted capture.
///
/// `pages` only grows (in call order) until `clear_all`; nothing reorders or
/// deduplicates it.
#[derive(Debug, Clone, Default)]
pub struct CaptureSession {
    captured: Option<EncodedImage>,
    pages: Vec<EncodedImage>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent uncommitted capture.
    pub fn captured(&self) -> Option<&EncodedImage> {
        self.captured.as_ref()
    }

    /// Committed pages in document order.
    pub fn pages(&self) -> &[EncodedImage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Replace the pending capture, discarding any previous one.
    pub fn set_captured(&mut self, image: EncodedImage) {
        self.captured = Some(image);
    }

    /// Move the pending capture to the end of `pages`. Returns `false` (and
    /// changes nothing) when there is no pending capture.
    pub fn add_page(&mut self) -> bool {
        match self.captured.take() {
            Some(image) => {
                self.pages.push(image);
                true
            }
            None => false,
        }
    }

    /// Drop every page and the pending capture.
    pub fn clear_all(&mut self) {
        self.pages.clear();
        self.captured = None;
    }

    /// What an export would contain: committed pages, then the pending
    /// capture (if any) as the last page.
    pub fn export_set(&self) -> Result<Vec<EncodedImage>> {
        let mut set: Vec<EncodedImage> = self.pages.clone();
        if let Some(pending) = &self.captured {
            set.push(pending.clone());
        }
        if set.is_empty() {
            return Err(QuickscanError::EmptyExport);
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(tag: u8) -> EncodedImage {
        EncodedImage::jpeg(vec![0xFF, 0xD8, tag], 10 + tag as u32, 20)
    }

    #[test]
    fn starts_empty() {
        let session = CaptureSession::new();
        assert!(session.captured().is_none());
        assert_eq!(session.page_count(), 0);
        assert!(matches!(session.export_set(), Err(QuickscanError::EmptyExport)));
    }

    #[test]
    fn capture_then_add_grows_by_one_in_order() {
        let mut session = CaptureSession::new();
        for tag in 0..5u8 {
            session.set_captured(image(tag));
            assert!(session.add_page());
            assert_eq!(session.page_count(), tag as usize + 1);
            assert!(session.captured().is_none());
        }
        let tags: Vec<u8> = session.pages().iter().map(|p| p.bytes()[2]).collect();
        assert_eq!(tags, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn add_without_capture_changes_nothing() {
        let mut session = CaptureSession::new();
        session.set_captured(image(1));
        session.add_page();

        assert!(!session.add_page());
        assert!(!session.add_page());
        assert_eq!(session.page_count(), 1);
    }

    #[test]
    fn new_capture_replaces_pending_one() {
        let mut session = CaptureSession::new();
        session.set_captured(image(1));
        session.set_captured(image(2));
        assert_eq!(session.captured().map(|c| c.bytes()[2]), Some(2));
        session.add_page();
        assert_eq!(session.page_count(), 1);
    }

    #[test]
    fn clear_all_resets_everything() {
        let mut session = CaptureSession::new();
        session.set_captured(image(1));
        session.add_page();
        session.set_captured(image(2));

        session.clear_all();
        assert_eq!(session.page_count(), 0);
        assert!(session.captured().is_none());

        // Clearing an empty session is fine too.
        session.clear_all();
        assert_eq!(session.page_count(), 0);
    }

    #[test]
    fn pending_capture_is_exported_last() {
        let mut session = CaptureSession::new();
        session.set_captured(image(1));
        session.add_page();
        session.set_captured(image(2));
        session.add_page();
        session.set_captured(image(3));

        let tags: Vec<u8> = session
            .export_set()
            .unwrap()
            .iter()
            .map(|p| p.bytes()[2])
            .collect();
        assert_eq!(tags, vec![1, 2, 3]);
        // Exporting does not commit the pending capture.
        assert_eq!(session.page_count(), 2);
        assert!(session.captured().is_some());
    }

    #[test]
    fn pending_capture_alone_is_exportable() {
        let mut session = CaptureSession::new();
        session.set_captured(image(7));
        assert_eq!(session.export_set().unwrap().len(), 1);
    }
}
