// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open and inspect produced PDF documents using the `lopdf`
// crate.

use std::path::Path;

use bildwerk_core::error::{BildwerkError, Result};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, info, instrument};

/// An image XObject found on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    pub width: u32,
    pub height: u32,
    /// First stream filter, e.g. `DCTDecode` for an embedded JPEG.
    pub filter: Option<String>,
    /// Stream content exactly as stored in the file.
    pub data: Vec<u8>,
}

/// Read-only view of a PDF file, used to check what the writer produced.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            BildwerkError::PdfRead(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");
        Ok(Self { document })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            BildwerkError::PdfRead(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Width and height of a page (1-indexed) in points, from its MediaBox.
    ///
    /// Falls back to the parent page-tree node when the page inherits it.
    pub fn page_size_pt(&self, page_number: u32) -> Result<(f32, f32)> {
        let page_id = self.page_id(page_number)?;
        let media_box = self.inherited_entry(page_id, b"MediaBox")?;
        let values = media_box
            .as_array()
            .map_err(|err| BildwerkError::PdfRead(format!("MediaBox is not an array: {}", err)))?
            .iter()
            .map(|value| self.resolve(value).and_then(as_number))
            .collect::<Result<Vec<f32>>>()?;

        match values[..] {
            [x0, y0, x1, y1] => Ok((x1 - x0, y1 - y0)),
            _ => Err(BildwerkError::PdfRead(format!(
                "MediaBox has {} entries, expected 4",
                values.len()
            ))),
        }
    }

    /// Operands of every `cm` (transformation matrix) operator in the page's
    /// content stream, in order.
    ///
    /// For a page written by [`crate::PdfWriter`] these describe where the
    /// image is drawn.
    pub fn placement_matrices(&self, page_number: u32) -> Result<Vec<[f32; 6]>> {
        let page_id = self.page_id(page_number)?;
        let raw = self.document.get_page_content(page_id).map_err(|err| {
            BildwerkError::PdfRead(format!("failed to read page {} content: {}", page_number, err))
        })?;
        let content = Content::decode(&raw).map_err(|err| {
            BildwerkError::PdfRead(format!("failed to decode page {} content: {}", page_number, err))
        })?;

        content
            .operations
            .iter()
            .filter(|op| op.operator == "cm")
            .map(|op| {
                let numbers = op
                    .operands
                    .iter()
                    .map(as_number)
                    .collect::<Result<Vec<f32>>>()?;
                <[f32; 6]>::try_from(numbers.as_slice()).map_err(|_| {
                    BildwerkError::PdfRead(format!("cm operator with {} operands", numbers.len()))
                })
            })
            .collect()
    }

    /// Image XObjects referenced from the page's resources.
    pub fn embedded_images(&self, page_number: u32) -> Result<Vec<EmbeddedImage>> {
        let page_id = self.page_id(page_number)?;
        let images = self.document.get_page_images(page_id).map_err(|err| {
            BildwerkError::PdfRead(format!("failed to list images on page {}: {}", page_number, err))
        })?;

        images
            .into_iter()
            .map(|image| {
                let dimension = |value: i64| {
                    u32::try_from(value).map_err(|_| {
                        BildwerkError::PdfRead(format!("image dimension {} out of range", value))
                    })
                };
                Ok(EmbeddedImage {
                    width: dimension(image.width)?,
                    height: dimension(image.height)?,
                    filter: image.filters.and_then(|filters| filters.into_iter().next()),
                    data: image.content.to_vec(),
                })
            })
            .collect()
    }

    // -- Helpers --------------------------------------------------------------

    fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        let pages = self.document.get_pages();
        pages.get(&page_number).copied().ok_or_else(|| {
            BildwerkError::PdfRead(format!(
                "page {} out of range (document has {} pages)",
                page_number,
                pages.len()
            ))
        })
    }

    /// Look a key up on a page dictionary, walking `/Parent` links.
    fn inherited_entry(&self, mut node_id: ObjectId, key: &[u8]) -> Result<&Object> {
        loop {
            let dict = self.document.get_dictionary(node_id).map_err(|err| {
                BildwerkError::PdfRead(format!("page tree node {:?}: {}", node_id, err))
            })?;
            if let Ok(value) = dict.get(key) {
                return self.resolve(value);
            }
            node_id = dict
                .get(b"Parent")
                .and_then(Object::as_reference)
                .map_err(|_| {
                    BildwerkError::PdfRead(format!(
                        "{} not found in page tree",
                        String::from_utf8_lossy(key)
                    ))
                })?;
        }
    }

    fn resolve<'a>(&'a self, value: &'a Object) -> Result<&'a Object> {
        match value {
            Object::Reference(id) => self
                .document
                .get_object(*id)
                .map_err(|err| BildwerkError::PdfRead(format!("dangling reference: {}", err))),
            other => Ok(other),
        }
    }
}

fn as_number(value: &Object) -> Result<f32> {
    match value {
        Object::Integer(i) => Ok(*i as f32),
        Object::Real(r) => Ok(*r),
        other => Err(BildwerkError::PdfRead(format!(
            "expected a number, found {:?}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    /// Build a minimal one-page document whose MediaBox lives on the page tree
    /// root, as some producers write it.
    fn inherited_media_box_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 300.into(), 400.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn media_box_is_inherited_from_page_tree() {
        let reader = PdfReader::from_bytes(&inherited_media_box_pdf()).unwrap();
        assert_eq!(reader.page_count(), 1);
        assert_eq!(reader.page_size_pt(1).unwrap(), (300.0, 400.0));
    }

    #[test]
    fn out_of_range_page_is_an_error() {
        let reader = PdfReader::from_bytes(&inherited_media_box_pdf()).unwrap();
        assert!(matches!(reader.page_size_pt(2), Err(BildwerkError::PdfRead(_))));
    }

    #[test]
    fn garbage_is_not_a_pdf() {
        assert!(PdfReader::from_bytes(b"not a pdf").is_err());
    }
}
