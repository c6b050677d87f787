//! PDF documents: open, count pages, append, save.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{dictionary, Document, Object, ObjectId};

use crate::error::{Error, Result};

/// An opened PDF.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    inner: Document,
}

impl PdfDocument {
    /// Open a PDF file.
    pub fn open(path: &Path) -> Result<Self> {
        let inner = Document::load(path)?;
        Ok(Self { inner })
    }

    /// Parse a PDF held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(bytes)?;
        Ok(Self { inner })
    }

    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }
}

/// A document assembled from the pages of other documents.
///
/// Pages keep the order in which their sources were appended.
#[derive(Debug)]
pub struct MergedDocument {
    next_id: u32,
    pages: Vec<(ObjectId, Object)>,
    objects: BTreeMap<ObjectId, Object>,
}

impl Default for MergedDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MergedDocument {
    /// Create an empty destination document.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            pages: Vec::new(),
            objects: BTreeMap::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append every page of `source`. Returns the number of pages added.
    pub fn append(&mut self, source: &PdfDocument) -> usize {
        let mut doc = source.inner.clone();
        doc.renumber_objects_with(self.next_id);
        self.next_id = doc.max_id + 1;

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        for id in &page_ids {
            if let Ok(page) = doc.get_object(*id) {
                self.pages.push((*id, page.clone()));
            }
        }

        // Page tree nodes and outlines are rebuilt on save.
        for (id, object) in doc.objects {
            match type_name(&object) {
                Some(b"Catalog" | b"Pages" | b"Page" | b"Outlines" | b"Outline") => {}
                _ => {
                    self.objects.insert(id, object);
                }
            }
        }

        page_ids.len()
    }

    /// Write the document to `path`. Returns the number of pages written.
    pub fn save(self, path: &Path) -> Result<usize> {
        if self.pages.is_empty() {
            return Err(Error::EmptyResult("no pages to save".to_string()));
        }

        let mut doc = Document::with_version("1.5");
        doc.objects = self.objects;
        doc.max_id = self.next_id;

        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());

        for (id, page) in self.pages {
            if let Object::Dictionary(mut dict) = page {
                dict.set("Parent", pages_id);
                doc.objects.insert(id, Object::Dictionary(dict));
                kids.push(id.into());
            }
        }
        let page_count = kids.len();

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        doc.renumber_objects();
        doc.compress();
        doc.save(path).map_err(|e| {
            Error::filesystem(path, std::io::Error::other(e.to_string()))
        })?;

        Ok(page_count)
    }
}

fn type_name(object: &Object) -> Option<&[u8]> {
    object.as_dict().ok()?.get(b"Type").ok()?.as_name().ok()
}
