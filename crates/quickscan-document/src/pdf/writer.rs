// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer: assemble JPEG captures into a document using `lopdf`.
//
// Each capture becomes one page whose MediaBox equals the image's pixel size
// (one PDF unit per pixel), with the image drawn full-bleed from the origin.
// JPEG bytes are embedded verbatim as `/DCTDecode` image XObjects, so the only
// compression in the output is the one applied at capture time.

use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use quickscan_core::error::{QuickscanError, Result};
use quickscan_core::types::EncodedImage;
use tracing::{debug, info, instrument, warn};

use crate::image::encoder::{JpegInfo, inspect_jpeg};

/// Name under which each page's image is registered in its resources.
const IMAGE_RESOURCE: &str = "Im0";

/// Builds multi-page image PDFs.
pub struct PdfWriter {
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfWriter {
    pub fn new() -> Self {
        Self { title: None }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Create a PDF with one full-bleed page per image, in order.
    ///
    /// Every image is decoded before it is embedded. The first image that
    /// fails to decode aborts the whole document; no partial output is
    /// returned.
    #[instrument(skip_all, fields(images = images.len()))]
    pub fn create_from_images(&self, images: &[EncodedImage]) -> Result<Vec<u8>> {
        if images.is_empty() {
            return Err(QuickscanError::EmptyExport);
        }
        let title = self.title.as_deref().unwrap_or("QuickScan Document");
        info!(title, pages = images.len(), "Creating image PDF");

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::with_capacity(images.len());

        for (index, image) in images.iter().enumerate() {
            let jpeg = inspect_jpeg(image.bytes()).map_err(|err| match err {
                QuickscanError::ImageProcessing(detail) => {
                    QuickscanError::ImageProcessing(format!("page {}: {}", index + 1, detail))
                }
                other => other,
            })?;
            if (jpeg.width, jpeg.height) != (image.width(), image.height()) {
                warn!(
                    page = index + 1,
                    recorded = ?(image.width(), image.height()),
                    decoded = ?(jpeg.width, jpeg.height),
                    "recorded size differs from JPEG header, using decoded size"
                );
            }
            let page_id = add_image_page(&mut doc, pages_id, image.bytes(), &jpeg)?;
            kids.push(page_id.into());
            debug!(page = index + 1, width = jpeg.width, height = jpeg.height, "page added");
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Producer" => Object::string_literal("QuickScan"),
            "CreationDate" => Object::string_literal(Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()),
        });
        doc.trailer.set("Info", info_id);

        let mut output = Vec::new();
        doc.save_to(&mut output).map_err(|err| {
            QuickscanError::PdfError(format!("failed to serialise document: {}", err))
        })?;

        debug!(bytes = output.len(), "PDF serialised");
        Ok(output)
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Embed `jpeg_bytes` and add a page that shows it edge to edge.
fn add_image_page(
    doc: &mut Document,
    pages_id: ObjectId,
    jpeg_bytes: &[u8],
    jpeg: &JpegInfo,
) -> Result<ObjectId> {
    let width = i64::from(jpeg.width);
    let height = i64::from(jpeg.height);

    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width,
        "Height" => height,
        "BitsPerComponent" => 8_i64,
        "Filter" => "DCTDecode",
    };
    match jpeg.components {
        1 => image_dict.set("ColorSpace", "DeviceGray"),
        4 => {
            // Adobe-style CMYK JPEGs are stored inverted.
            image_dict.set("ColorSpace", "DeviceCMYK");
            let decode: Vec<Object> = [1_i64, 0, 1, 0, 1, 0, 1, 0]
                .into_iter()
                .map(Object::from)
                .collect();
            image_dict.set("Decode", decode);
        }
        _ => image_dict.set("ColorSpace", "DeviceRGB"),
    }
    let image_id =
        doc.add_object(Stream::new(image_dict, jpeg_bytes.to_vec()).with_compression(false));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    width.into(),
                    0_i64.into(),
                    0_i64.into(),
                    height.into(),
                    0_i64.into(),
                    0_i64.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_RESOURCE.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content.encode().map_err(|err| {
        QuickscanError::PdfError(format!("failed to encode page content: {}", err))
    })?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0_i64.into(), 0_i64.into(), width.into(), height.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                IMAGE_RESOURCE => image_id,
            },
        },
    });
    Ok(page_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::encoder::FrameEncoder;
    use crate::pdf::reader::PdfReader;
    use quickscan_core::types::RawFrame;

    fn capture(width: u32, height: u32, shade: u8) -> EncodedImage {
        let pixels = vec![shade; width as usize * height as usize * 3];
        let frame = RawFrame::new(width, height, pixels).unwrap();
        FrameEncoder::default().encode(&frame).unwrap()
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = PdfWriter::new().create_from_images(&[]).unwrap_err();
        assert!(matches!(err, QuickscanError::EmptyExport));
    }

    #[test]
    fn single_page_matches_pixel_size() {
        let bytes = PdfWriter::new()
            .create_from_images(&[capture(640, 480, 200)])
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let reader = PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.page_count(), 1);
        assert_eq!(reader.page_sizes().unwrap(), vec![(640.0, 480.0)]);
    }

    #[test]
    fn pages_follow_input_order() {
        let images = [capture(30, 20, 10), capture(20, 30, 90), capture(50, 50, 250)];
        let bytes = PdfWriter::new().create_from_images(&images).unwrap();

        let reader = PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.page_count(), 3);
        assert_eq!(
            reader.page_sizes().unwrap(),
            vec![(30.0, 20.0), (20.0, 30.0), (50.0, 50.0)]
        );
    }

    #[test]
    fn jpeg_is_embedded_without_recompression() {
        let image = capture(16, 16, 128);
        let bytes = PdfWriter::new()
            .create_from_images(std::slice::from_ref(&image))
            .unwrap();

        let reader = PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.image_filters(1).unwrap(), vec!["DCTDecode".to_string()]);
        assert_eq!(reader.image_data(1).unwrap(), vec![image.bytes().to_vec()]);
    }

    #[test]
    fn corrupt_page_fails_whole_document() {
        let good = capture(8, 8, 1);
        let bad = EncodedImage::jpeg(vec![0xFF, 0xD8, 0x00, 0x01], 8, 8);
        let err = PdfWriter::new().create_from_images(&[good, bad]).unwrap_err();
        match err {
            QuickscanError::ImageProcessing(detail) => assert!(detail.starts_with("page 2:")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decoded_size_wins_over_recorded_size() {
        let real = capture(64, 48, 77);
        let mislabelled = EncodedImage::jpeg(real.bytes().to_vec(), 1000, 10);
        let bytes = PdfWriter::new().create_from_images(&[mislabelled]).unwrap();

        let reader = PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.page_sizes().unwrap(), vec![(64.0, 48.0)]);
    }

    #[test]
    fn title_is_written_to_info() {
        let mut writer = PdfWriter::new();
        writer.set_title("Receipts");
        let bytes = writer.create_from_images(&[capture(4, 4, 0)]).unwrap();
        let reader = PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.title().as_deref(), Some("Receipts"));
    }
}
