//! Document assembler: concatenate single-page OCR documents with `lopdf`.
//!
//! Each source page is deep-copied into a fresh document, together with
//! every object it references (fonts, image XObjects, content streams). A
//! per-source map from old to new object ids keeps shared objects shared
//! and makes reference cycles terminate. The source `/Parent` link is not
//! followed; inheritable attributes found there are copied onto the page
//! instead, and the page is re-parented under the new page tree.

use crate::error::StageError;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Outcome of an assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Pages in the written document.
    pub pages_written: usize,
    /// 0-based indices of page documents left out because they were empty.
    pub empty_pages: Vec<usize>,
}

/// Build the composite document from `pages` (already in page order) and
/// save it to `dest`.
///
/// A page document with zero pages is skipped with a warning. The composite
/// is written next to `dest` first and renamed into place, so a failed save
/// never leaves a truncated output behind.
pub(crate) fn assemble(
    pages: &[PathBuf],
    dest: &Path,
    mut on_empty: impl FnMut(usize),
) -> Result<AssemblyReport, StageError> {
    let mut target = Document::with_version("1.5");
    let pages_id = target.new_object_id();
    let mut kids: Vec<Object> = Vec::new();
    let mut empty_pages = Vec::new();

    for (idx, path) in pages.iter().enumerate() {
        let source = Document::load(path)?;
        let source_pages = source.get_pages();
        if source_pages.is_empty() {
            warn!("OCR produced an empty document for page {}, skipping", idx + 1);
            empty_pages.push(idx);
            on_empty(idx + 1);
            continue;
        }

        let mut copier = PageCopier::new(&source, &mut target);
        // get_pages is keyed by 1-based page number, so values come out in order.
        for page_id in source_pages.values() {
            let new_id = copier.copy_page(*page_id, pages_id)?;
            kids.push(Object::Reference(new_id));
        }
    }

    let pages_written = kids.len();
    target.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages_written as i64,
        }),
    );
    let catalog_id = target.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    target.trailer.set("Root", catalog_id);

    save_atomically(&mut target, dest)?;
    info!("Assembled {} pages into {}", pages_written, dest.display());

    Ok(AssemblyReport {
        pages_written,
        empty_pages,
    })
}

/// Save `doc` to a sibling temp file, then rename it over `dest`.
pub(crate) fn save_atomically(doc: &mut Document, dest: &Path) -> Result<(), StageError> {
    let tmp = dest.with_extension("pdf.tmp");
    if let Err(e) = doc.save(&tmp) {
        let _ = std::fs::remove_file(&tmp);
        return Err(StageError::Pdf(format!("Cannot write {}: {e}", dest.display())));
    }
    std::fs::rename(&tmp, dest).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        StageError::io(format!("Cannot move output into place at {}", dest.display()), e)
    })
}

/// Copies objects from one source document into the target.
struct PageCopier<'a> {
    source: &'a Document,
    target: &'a mut Document,
    mapped: BTreeMap<ObjectId, ObjectId>,
}

impl<'a> PageCopier<'a> {
    fn new(source: &'a Document, target: &'a mut Document) -> Self {
        Self {
            source,
            target,
            mapped: BTreeMap::new(),
        }
    }

    fn copy_page(&mut self, page_id: ObjectId, parent: ObjectId) -> Result<ObjectId, StageError> {
        let page = self.source.get_dictionary(page_id)?.clone();
        let new_id = self.reserve(page_id);

        let mut copied = self.copy_dict(&page)?;
        for key in INHERITABLE {
            if !copied.has(key) {
                if let Some(value) = self.inherited(&page, key) {
                    let value = self.copy_object(&value)?;
                    copied.set(key.to_vec(), value);
                }
            }
        }
        copied.set("Parent", Object::Reference(parent));

        self.target.objects.insert(new_id, Object::Dictionary(copied));
        debug!("Copied page {:?} → {:?}", page_id, new_id);
        Ok(new_id)
    }

    /// Walk `/Parent` links looking for `key`.
    fn inherited(&self, page: &Dictionary, key: &[u8]) -> Option<Object> {
        let mut node = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut hops = 0;
        while let Some(id) = node {
            let dict = self.source.get_dictionary(id).ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(value.clone());
            }
            node = dict.get(b"Parent").and_then(Object::as_reference).ok();
            hops += 1;
            if hops > 64 {
                return None;
            }
        }
        None
    }

    fn reserve(&mut self, old: ObjectId) -> ObjectId {
        let new_id = self.target.new_object_id();
        self.mapped.insert(old, new_id);
        new_id
    }

    fn copy_reference(&mut self, old: ObjectId) -> Result<Object, StageError> {
        if let Some(new_id) = self.mapped.get(&old) {
            return Ok(Object::Reference(*new_id));
        }
        let object = match self.source.get_object(old) {
            Ok(object) => object.clone(),
            Err(e) => {
                warn!(?old, %e, "Cannot resolve reference, using Null");
                return Ok(Object::Null);
            }
        };
        let new_id = self.reserve(old);
        let copied = self.copy_object(&object)?;
        self.target.objects.insert(new_id, copied);
        Ok(Object::Reference(new_id))
    }

    fn copy_dict(&mut self, dict: &Dictionary) -> Result<Dictionary, StageError> {
        let mut out = Dictionary::new();
        for (key, value) in dict.iter() {
            if key == b"Parent" {
                continue;
            }
            out.set(key.clone(), self.copy_object(value)?);
        }
        Ok(out)
    }

    fn copy_object(&mut self, object: &Object) -> Result<Object, StageError> {
        Ok(match object {
            Object::Reference(id) => self.copy_reference(*id)?,
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dict(dict)?),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.copy_object(item))
                    .collect::<Result<_, _>>()?,
            ),
            Object::Stream(stream) => {
                let mut copied = stream.clone();
                copied.dict = self.copy_dict(&stream.dict)?;
                Object::Stream(copied)
            }
            other => other.clone(),
        })
    }
}
