// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: inspect exported documents using the `lopdf` crate.

use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};
use quickscan_core::error::{QuickscanError, Result};
use tracing::{debug, info, instrument};

/// Read-only view over an existing PDF.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            QuickscanError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");
        Ok(Self { document })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            QuickscanError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// `(width, height)` of every page's MediaBox, in page order.
    pub fn page_sizes(&self) -> Result<Vec<(f32, f32)>> {
        self.document
            .get_pages()
            .values()
            .map(|id| self.media_box_size(*id))
            .collect()
    }

    /// `/Title` from the document information dictionary.
    pub fn title(&self) -> Option<String> {
        let info = self.document.trailer.get(b"Info").ok()?;
        let info = self.resolve(info).ok()?.as_dict().ok()?;
        match info.get(b"Title").ok()? {
            Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }

    /// `/Filter` names of the image XObjects on page `page_number` (1-indexed).
    pub fn image_filters(&self, page_number: u32) -> Result<Vec<String>> {
        self.page_images(page_number)?
            .into_iter()
            .map(|stream_dict| {
                let filter = stream_dict.get(b"Filter").map_err(pdf_err)?;
                let name = filter.as_name().map_err(pdf_err)?;
                Ok(String::from_utf8_lossy(name).into_owned())
            })
            .collect()
    }

    /// Raw (still encoded) bytes of the image XObjects on page `page_number`.
    pub fn image_data(&self, page_number: u32) -> Result<Vec<Vec<u8>>> {
        let page_id = self.page_id(page_number)?;
        let mut data = Vec::new();
        for id in self.image_ids(page_id)? {
            let stream = self
                .document
                .get_object(id)
                .and_then(Object::as_stream)
                .map_err(pdf_err)?;
            data.push(stream.content.clone());
        }
        Ok(data)
    }

    // -- Helpers --------------------------------------------------------------

    fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        let pages = self.document.get_pages();
        pages.get(&page_number).copied().ok_or_else(|| {
            QuickscanError::PdfError(format!(
                "page {} out of range (document has {} pages)",
                page_number,
                pages.len()
            ))
        })
    }

    fn media_box_size(&self, page_id: ObjectId) -> Result<(f32, f32)> {
        let page = self.document.get_dictionary(page_id).map_err(pdf_err)?;
        let media_box = match page.get(b"MediaBox") {
            Ok(obj) => obj,
            // Inherited from the parent page tree node.
            Err(_) => {
                let parent = page.get(b"Parent").and_then(Object::as_reference).map_err(pdf_err)?;
                self.document
                    .get_dictionary(parent)
                    .and_then(|d| d.get(b"MediaBox"))
                    .map_err(pdf_err)?
            }
        };
        let values = self.resolve(media_box)?.as_array().map_err(pdf_err)?;
        if values.len() != 4 {
            return Err(QuickscanError::PdfError(format!(
                "MediaBox has {} entries",
                values.len()
            )));
        }
        let nums = values
            .iter()
            .map(number)
            .collect::<Result<Vec<f32>>>()?;
        Ok((nums[2] - nums[0], nums[3] - nums[1]))
    }

    fn image_ids(&self, page_id: ObjectId) -> Result<Vec<ObjectId>> {
        let page = self.document.get_dictionary(page_id).map_err(pdf_err)?;
        let resources = self
            .resolve(page.get(b"Resources").map_err(pdf_err)?)?
            .as_dict()
            .map_err(pdf_err)?;
        let xobjects = match resources.get(b"XObject") {
            Ok(obj) => self.resolve(obj)?.as_dict().map_err(pdf_err)?,
            Err(_) => return Ok(Vec::new()),
        };

        let mut ids = Vec::new();
        for (_, obj) in xobjects.iter() {
            let id = obj.as_reference().map_err(pdf_err)?;
            let stream = self
                .document
                .get_object(id)
                .and_then(Object::as_stream)
                .map_err(pdf_err)?;
            let is_image = stream
                .dict
                .get(b"Subtype")
                .and_then(Object::as_name)
                .map(|n| n == b"Image")
                .unwrap_or(false);
            if is_image {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    fn page_images(&self, page_number: u32) -> Result<Vec<&Dictionary>> {
        let page_id = self.page_id(page_number)?;
        self.image_ids(page_id)?
            .into_iter()
            .map(|id| {
                self.document
                    .get_object(id)
                    .and_then(Object::as_stream)
                    .map(|s| &s.dict)
                    .map_err(pdf_err)
            })
            .collect()
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object> {
        match obj {
            Object::Reference(id) => self.document.get_object(*id).map_err(pdf_err),
            other => Ok(other),
        }
    }
}

fn number(obj: &Object) -> Result<f32> {
    match obj {
        Object::Integer(i) => Ok(*i as f32),
        Object::Real(r) => Ok(*r as f32),
        other => Err(QuickscanError::PdfError(format!(
            "expected a number, found {:?}",
            other
        ))),
    }
}

fn pdf_err(err: lopdf::Error) -> QuickscanError {
    QuickscanError::PdfError(err.to_string())
}
