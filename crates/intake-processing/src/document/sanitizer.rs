//! PDF sanitizer
//!
//! Pages are copied one by one into a new document. Only objects reachable from a
//! page survive, so the catalog (OpenAction, AcroForm, Names and its embedded files
//! and scripts) and the document info dictionary are left behind. Action, annotation
//! and metadata entries are also dropped from every copied dictionary.

use anyhow::{Context, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;
use std::path::Path;

use crate::fs::replace_with;
use crate::metadata::DocumentMetadata;

const STRIPPED_KEYS: &[&[u8]] = &[
    b"Parent",
    b"AA",
    b"A",
    b"JS",
    b"JavaScript",
    b"OpenAction",
    b"Annots",
    b"AcroForm",
    b"EmbeddedFiles",
    b"EmbeddedFile",
    b"Metadata",
    b"PieceInfo",
];

/// Action types that run code or open other resources.
const ACTIVE_ACTIONS: &[&[u8]] = &[
    b"JavaScript",
    b"Launch",
    b"SubmitForm",
    b"ImportData",
    b"Rendition",
];

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: &[&[u8]] = &[b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

const MAX_PAGE_TREE_DEPTH: usize = 64;

/// US Letter, used when neither the page nor its ancestors declare a MediaBox
const DEFAULT_MEDIA_BOX: [i64; 4] = [0, 0, 612, 792];

pub struct PdfSanitizer;

impl PdfSanitizer {
    /// Rebuild the PDF at `path` and atomically replace it.
    pub fn sanitize(path: &Path) -> Result<DocumentMetadata> {
        let source = Document::load(path).context("Failed to parse PDF")?;
        let mut rebuilt = Self::rebuild(&source)?;
        let page_count = rebuilt.get_pages().len();

        replace_with(path, |file| {
            rebuilt.save_to(file).context("Failed to write PDF")?;
            Ok(())
        })?;

        let size_bytes = std::fs::metadata(path).ok().map(|m| m.len());

        tracing::debug!(
            path = %path.display(),
            pages = page_count,
            objects_before = source.objects.len(),
            objects_after = rebuilt.objects.len(),
            "PDF rebuilt from page copies"
        );

        Ok(DocumentMetadata {
            page_count,
            format: "pdf".to_string(),
            size_bytes,
        })
    }

    /// Copy every page of `source` into a new document.
    pub fn rebuild(source: &Document) -> Result<Document> {
        let pages = source.get_pages();
        if pages.is_empty() {
            anyhow::bail!("PDF has no pages");
        }

        let mut copier = PageCopier::new(source);
        let pages_id = copier.target.new_object_id();

        let mut kids = Vec::with_capacity(pages.len());
        for page_id in pages.values() {
            let copied = copier.copy_page(*page_id, pages_id)?;
            kids.push(Object::Reference(copied));
        }

        let mut target = copier.target;
        let count = kids.len() as i64;

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set("Kids", Object::Array(kids));
        pages_dict.set("Count", Object::Integer(count));
        target
            .objects
            .insert(pages_id, Object::Dictionary(pages_dict));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = target.add_object(Object::Dictionary(catalog));

        target.trailer.set("Root", Object::Reference(catalog_id));

        Ok(target)
    }
}

/// Copies objects from one document into another, renumbering as it goes.
struct PageCopier<'a> {
    source: &'a Document,
    target: Document,
    copied: HashMap<ObjectId, ObjectId>,
}

impl<'a> PageCopier<'a> {
    fn new(source: &'a Document) -> Self {
        Self {
            source,
            target: Document::with_version("1.5"),
            copied: HashMap::new(),
        }
    }

    fn copy_page(&mut self, page_id: ObjectId, parent: ObjectId) -> Result<ObjectId> {
        let source = self.source;
        let page = source
            .get_dictionary(page_id)
            .with_context(|| format!("Page object {} {} is not a dictionary", page_id.0, page_id.1))?;

        let new_id = self.target.new_object_id();
        self.copied.insert(page_id, new_id);

        let mut dict = self.copy_dictionary(page);
        for key in INHERITABLE_KEYS {
            if dict.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(source, page, key) {
                let value = self.copy_object(value);
                dict.set(key.to_vec(), value);
            }
        }

        if !dict.has(b"MediaBox") {
            let media_box = DEFAULT_MEDIA_BOX.iter().map(|v| Object::Integer(*v)).collect();
            dict.set("MediaBox", Object::Array(media_box));
        }
        dict.set("Type", Object::Name(b"Page".to_vec()));
        dict.set("Parent", Object::Reference(parent));

        self.target.objects.insert(new_id, Object::Dictionary(dict));
        Ok(new_id)
    }

    fn copy_reference(&mut self, id: ObjectId) -> ObjectId {
        if let Some(copied) = self.copied.get(&id) {
            return *copied;
        }

        let new_id = self.target.new_object_id();
        self.copied.insert(id, new_id);

        let source = self.source;
        let object = match source.get_object(id) {
            Ok(object) => self.copy_object(object),
            Err(e) => {
                tracing::debug!(object = ?id, error = %e, "Dangling PDF reference replaced with null");
                Object::Null
            }
        };

        self.target.objects.insert(new_id, object);
        new_id
    }

    fn copy_object(&mut self, object: &Object) -> Object {
        match object {
            Object::Reference(id) => Object::Reference(self.copy_reference(*id)),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.copy_object(item)).collect())
            }
            Object::Dictionary(dict) if is_active_action(dict) => Object::Null,
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(dict)),
            Object::Stream(stream) => {
                let dict = self.copy_dictionary(&stream.dict);
                Object::Stream(Stream::new(dict, stream.content.clone()))
            }
            other => other.clone(),
        }
    }

    fn copy_dictionary(&mut self, dict: &Dictionary) -> Dictionary {
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            if STRIPPED_KEYS.contains(&key.as_slice()) {
                continue;
            }
            let value = self.copy_object(value);
            copy.set(key.clone(), value);
        }
        copy
    }
}

fn is_active_action(dict: &Dictionary) -> bool {
    match dict.get(b"S") {
        Ok(Object::Name(action)) => ACTIVE_ACTIONS.contains(&action.as_slice()),
        _ => false,
    }
}

/// Walk up the page tree looking for an inheritable attribute.
fn inherited_attribute<'a>(
    source: &'a Document,
    page: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    for _ in 0..MAX_PAGE_TREE_DEPTH {
        let node = source.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_pdf, sample_pdf_with_script};

    fn catalog(doc: &Document) -> &Dictionary {
        let root = doc
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .unwrap();
        doc.get_dictionary(root).unwrap()
    }

    #[test]
    fn test_rebuild_drops_document_level_script() {
        let source = Document::load_mem(&sample_pdf_with_script()).unwrap();
        assert!(catalog(&source).has(b"OpenAction"));

        let rebuilt = PdfSanitizer::rebuild(&source).unwrap();

        assert_eq!(rebuilt.get_pages().len(), 1);
        assert!(!catalog(&rebuilt).has(b"OpenAction"));
        assert!(!rebuilt.trailer.has(b"Info"));
    }

    #[test]
    fn test_rebuild_resolves_inherited_attributes() {
        let source = Document::load_mem(&sample_pdf()).unwrap();
        let rebuilt = PdfSanitizer::rebuild(&source).unwrap();

        let page_id = *rebuilt.get_pages().values().next().unwrap();
        let page = rebuilt.get_dictionary(page_id).unwrap();
        assert!(page.has(b"Resources"));
        assert!(page.has(b"MediaBox"));
        assert!(page.has(b"Contents"));
    }

    #[test]
    fn test_sanitize_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evil.pdf");
        std::fs::write(&path, sample_pdf_with_script()).unwrap();

        let metadata = PdfSanitizer::sanitize(&path).unwrap();
        assert_eq!(metadata.page_count, 1);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(!text.contains("app.alert"));
        assert!(!text.contains("/JavaScript"));
    }

    #[test]
    fn test_sanitize_rejects_garbage_and_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"definitely not a pdf").unwrap();

        assert!(PdfSanitizer::sanitize(&path).is_err());
        assert_eq!(std::fs::read(&path).unwrap(), b"definitely not a pdf");
    }
}
