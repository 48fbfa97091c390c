use crate::core::replacer::ContentReplacer;
use crate::core::xml::{Element, Node, XmlPart};
use crate::utils::error::{DocGenError, Result};

/// A content control found in a content part: its declared key and the content
/// element it owns.
#[derive(Debug, Clone)]
pub struct PlaceholderRegion {
    key: String,
    part: String,
    content: Element,
}

impl PlaceholderRegion {
    pub(crate) fn new(key: String, part: String, content: Element) -> Self {
        Self { key, part, content }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Name of the content part the region lives in, e.g. `word/document.xml`.
    pub fn part(&self) -> &str {
        &self.part
    }

    pub fn content(&self) -> &Element {
        &self.content
    }

    pub(crate) fn into_content(self) -> Element {
        self.content
    }

    /// Text of the region, every text leaf concatenated in document order.
    pub fn text(&self) -> String {
        self.content
            .wordml_descendant_paths("t")
            .iter()
            .filter_map(|path| self.content.element_at(path))
            .map(Element::text)
            .collect()
    }

    pub fn text_leaf_count(&self) -> usize {
        self.content.wordml_descendant_paths("t").len()
    }

    /// Rows of cell texts for tabular regions; empty when the region holds no rows.
    pub fn table(&self) -> Vec<Vec<String>> {
        self.content
            .wordml_descendant_paths("tr")
            .iter()
            .filter_map(|path| self.content.element_at(path))
            .map(|row| {
                row.child_elements()
                    .filter(|el| el.is_wordml("tc"))
                    .map(|cell| {
                        cell.wordml_descendant_paths("t")
                            .iter()
                            .filter_map(|path| cell.element_at(path))
                            .map(Element::text)
                            .collect()
                    })
                    .collect()
            })
            .collect()
    }

    pub fn apply(&mut self, replacer: &ContentReplacer) -> Result<()> {
        replacer.replace(&self.key, &mut self.content)
    }
}

/// Where a region sits inside a parsed part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocatedRegion {
    pub key: String,
    /// Path of the `sdtContent` element, see [`XmlPart::element_at`].
    pub content_path: Vec<usize>,
}

/// Finds every `sdt` of the part in document order (outer controls before the ones
/// nested in their content). Building-block gallery controls (page numbers, cover
/// pages, ...) are not placeholders; only the controls nested inside them are looked at.
pub(crate) fn locate_regions(part_name: &str, part: &XmlPart) -> Result<Vec<LocatedRegion>> {
    let mut found = Vec::new();
    let mut path = Vec::new();
    for (index, node) in part.nodes().iter().enumerate() {
        if let Node::Element(el) = node {
            path.push(index);
            walk(part_name, el, &mut path, &mut found)?;
            path.pop();
        }
    }
    Ok(found)
}

fn walk(part_name: &str, element: &Element, path: &mut Vec<usize>, found: &mut Vec<LocatedRegion>) -> Result<()> {
    if element.is_wordml("sdt") && !is_gallery_control(element) {
        let key = declared_key(element).ok_or_else(|| {
            DocGenError::malformed(part_name, "content control without an alias or tag")
        })?;
        let content_index = element
            .children()
            .iter()
            .position(|node| matches!(node, Node::Element(el) if el.is_wordml("sdtContent")))
            .ok_or_else(|| {
                DocGenError::malformed(part_name, format!("content control '{}' has no content", key))
            })?;

        path.push(content_index);
        found.push(LocatedRegion {
            key,
            content_path: path.clone(),
        });
        if let Some(content) = element.element_at(&[content_index]) {
            walk_children(part_name, content, path, found)?;
        }
        path.pop();
        return Ok(());
    }

    walk_children(part_name, element, path, found)
}

fn walk_children(part_name: &str, element: &Element, path: &mut Vec<usize>, found: &mut Vec<LocatedRegion>) -> Result<()> {
    for (index, node) in element.children().iter().enumerate() {
        if let Node::Element(child) = node {
            path.push(index);
            walk(part_name, child, path, found)?;
            path.pop();
        }
    }
    Ok(())
}

fn is_gallery_control(sdt: &Element) -> bool {
    sdt.find_wordml_child("sdtPr").is_some_and(|props| {
        props.find_wordml_child("docPartObj").is_some() || props.find_wordml_child("docPartList").is_some()
    })
}

/// `w:alias/@w:val` wins over `w:tag/@w:val`; blank values count as missing.
fn declared_key(sdt: &Element) -> Option<String> {
    let properties = sdt.find_wordml_child("sdtPr")?;
    ["alias", "tag"]
        .iter()
        .filter_map(|name| properties.find_wordml_child(name))
        .filter_map(|el| el.attribute("val"))
        .map(|val| val.trim().to_string())
        .find(|val| !val.is_empty())
}
