use crate::core::region::{locate_regions, PlaceholderRegion};
use crate::core::replacer::ContentReplacer;
use crate::core::xml::{Node, XmlPart};
use crate::utils::error::{DocGenError, Result};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read, Write};
use std::sync::LazyLock;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

static CONTENT_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^word/(document|header\d*|footer\d*|footnotes|endnotes|glossary/document)\.xml$")
        .expect("content part pattern is valid")
});

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Content types of package parts that hold document markup.
const CONTENT_PART_TYPES: [&str; 9] = [
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml",
    "application/vnd.ms-word.document.macroEnabled.main+xml",
    "application/vnd.ms-word.template.macroEnabledTemplate.main+xml",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footnotes+xml",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.endnotes+xml",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.glossary+xml",
];

/// Placeholder key -> replacer for one generation.
///
/// A key mapped to `None` is declared but intentionally left as it is in the template.
#[derive(Debug, Clone, Default)]
pub struct ReplacerMapping {
    entries: HashMap<String, Option<ContentReplacer>>,
}

impl ReplacerMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, replacer: ContentReplacer) {
        self.entries.insert(key.into(), Some(replacer));
    }

    /// Declares `key` without a replacement; matching regions pass through untouched.
    pub fn insert_empty(&mut self, key: impl Into<String>) {
        self.entries.insert(key.into(), None);
    }

    pub fn get(&self, key: &str) -> Option<&ContentReplacer> {
        self.entries.get(key).and_then(Option::as_ref)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ContentReplacer)> for ReplacerMapping {
    fn from_iter<I: IntoIterator<Item = (String, ContentReplacer)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(key, replacer)| (key, Some(replacer))).collect(),
        }
    }
}

/// Reads content controls out of a `.docx` package and rewrites them.
///
/// Both operations work on their own copy of the package; the input buffer is
/// never touched. Every content part is handled on its own, so a key used in the
/// body and in a header is replaced in both.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentMerger;

impl DocumentMerger {
    pub fn new() -> Self {
        Self
    }

    /// Whether the package entry `name` is one of the conventionally named
    /// document parts (`word/document.xml`, `word/header1.xml`, ...).
    pub fn is_content_part(name: &str) -> bool {
        CONTENT_PART.is_match(name)
    }

    /// Entry names (lowercased) that `[Content_Types].xml` declares as document
    /// markup. Empty when the package has no content types part.
    fn declared_content_parts<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>) -> Result<HashSet<String>> {
        let mut xml = Vec::new();
        match archive.by_name(CONTENT_TYPES_PART) {
            Ok(mut entry) => {
                entry.read_to_end(&mut xml)?;
            }
            Err(zip::result::ZipError::FileNotFound) => return Ok(HashSet::new()),
            Err(e) => return Err(e.into()),
        }

        let types = XmlPart::parse(CONTENT_TYPES_PART, &xml)?;
        let declared = types
            .nodes()
            .iter()
            .filter_map(|node| match node {
                Node::Element(root) => Some(root),
                _ => None,
            })
            .flat_map(|root| root.child_elements())
            .filter(|el| el.local_name() == "Override")
            .filter(|el| {
                el.attribute("ContentType")
                    .is_some_and(|kind| CONTENT_PART_TYPES.contains(&kind.trim()))
            })
            .filter_map(|el| el.attribute("PartName"))
            .map(|name| name.trim_start_matches('/').to_ascii_lowercase())
            .collect();
        Ok(declared)
    }

    fn content_part_filter<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>) -> Result<impl Fn(&str) -> bool> {
        let declared = Self::declared_content_parts(archive)?;
        Ok(move |name: &str| Self::is_content_part(name) || declared.contains(&name.to_ascii_lowercase()))
    }

    /// Every placeholder of the package, in document order part by part.
    pub fn scan(&self, document: &[u8]) -> Result<Vec<PlaceholderRegion>> {
        let mut archive = ZipArchive::new(Cursor::new(document))?;
        let is_content = Self::content_part_filter(&mut archive)?;
        let mut regions = Vec::new();
        let mut content_parts = 0;

        for index in 0..archive.len() {
            let name = archive.by_index_raw(index)?.name().to_string();
            if !is_content(&name) {
                continue;
            }
            content_parts += 1;

            let mut xml = Vec::new();
            archive.by_index(index)?.read_to_end(&mut xml)?;
            regions.extend(self.scan_part(&name, &xml)?);
        }

        if content_parts == 0 {
            return Err(DocGenError::malformed("[package]", "no document content part found"));
        }
        tracing::debug!("Scanned {} content parts, found {} placeholders", content_parts, regions.len());
        Ok(regions)
    }

    pub fn scan_part(&self, part_name: &str, xml: &[u8]) -> Result<Vec<PlaceholderRegion>> {
        let part = XmlPart::parse(part_name, xml)?;
        locate_regions(part_name, &part)?
            .into_iter()
            .map(|located| {
                let content = part.element_at(&located.content_path).cloned().ok_or_else(|| {
                    DocGenError::malformed(part_name, format!("lost content of '{}'", located.key))
                })?;
                Ok(PlaceholderRegion::new(located.key, part_name.to_string(), content))
            })
            .collect()
    }

    /// Distinct placeholder keys in order of first appearance.
    pub fn placeholder_keys(&self, document: &[u8]) -> Result<Vec<String>> {
        let mut keys: Vec<String> = Vec::new();
        for region in self.scan(document)? {
            if !keys.iter().any(|key| key == region.key()) {
                keys.push(region.key().to_string());
            }
        }
        Ok(keys)
    }

    /// Applies `mapping` to every content part and returns the new package.
    ///
    /// Entries that are not content parts are copied raw, in their original order.
    pub fn merge(&self, document: &[u8], mapping: &ReplacerMapping) -> Result<Vec<u8>> {
        let mut archive = ZipArchive::new(Cursor::new(document))?;
        let is_content = Self::content_part_filter(&mut archive)?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let mut content_parts = 0;

        for index in 0..archive.len() {
            let name = archive.by_index_raw(index)?.name().to_string();
            if !is_content(&name) {
                writer.raw_copy_file(archive.by_index_raw(index)?)?;
                continue;
            }
            content_parts += 1;

            let (xml, options) = {
                let mut entry = archive.by_index(index)?;
                let method = match entry.compression() {
                    CompressionMethod::Stored => CompressionMethod::Stored,
                    _ => CompressionMethod::Deflated,
                };
                let mut xml = Vec::new();
                entry.read_to_end(&mut xml)?;
                (xml, SimpleFileOptions::default().compression_method(method))
            };

            let merged = self.merge_part(&name, &xml, mapping)?;
            writer.start_file(name, options)?;
            writer.write_all(&merged)?;
        }

        if content_parts == 0 {
            return Err(DocGenError::malformed("[package]", "no document content part found"));
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }

    pub fn merge_part(&self, part_name: &str, xml: &[u8], mapping: &ReplacerMapping) -> Result<Vec<u8>> {
        let mut part = XmlPart::parse(part_name, xml)?;
        let located = locate_regions(part_name, &part)?;
        let mut replaced = 0;

        // 反向處理：巢狀或後面的區塊先改，前面的路徑不受影響
        for region in located.iter().rev() {
            let Some(replacer) = mapping.get(&region.key) else {
                tracing::debug!("Leaving placeholder '{}' in {} untouched", region.key, part_name);
                continue;
            };

            let element = part.element_at_mut(&region.content_path).ok_or_else(|| {
                DocGenError::malformed(part_name, format!("lost content of '{}'", region.key))
            })?;
            let mut placeholder = PlaceholderRegion::new(region.key.clone(), part_name.to_string(), element.clone());
            placeholder.apply(replacer)?;
            *element = placeholder.into_content();
            replaced += 1;
        }

        tracing::debug!("{}: replaced {} of {} placeholders", part_name, replaced, located.len());
        part.to_bytes()
    }
}
