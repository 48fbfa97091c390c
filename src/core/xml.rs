use crate::utils::error::{DocGenError, Result};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::borrow::Cow;

/// WordprocessingML main namespace (transitional).
pub const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// WordprocessingML main namespace (strict).
pub const WORDML_STRICT_NS: &str = "http://purl.oclc.org/ooxml/wordprocessingml/main";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    /// Raw, still escaped character data.
    Text(BytesText<'static>),
    /// Declaration, comments, CDATA, processing instructions, doctype.
    Other(Event<'static>),
}

/// An element of a parsed content part.
///
/// The start tag is kept as read so that an element nobody touches writes back
/// exactly the bytes it was parsed from (attribute order, quoting, whitespace).
#[derive(Debug, Clone)]
pub struct Element {
    start: BytesStart<'static>,
    local: String,
    namespace: Option<String>,
    self_closing: bool,
    children: Vec<Node>,
}

impl Element {
    fn from_start(start: BytesStart<'static>, scopes: &mut NamespaceScopes, self_closing: bool) -> Result<Self> {
        let mut declared = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = attr.key.as_ref();
            if key == b"xmlns" {
                declared.push((String::new(), attr.unescape_value()?.into_owned()));
            } else if let Some(prefix) = key.strip_prefix(b"xmlns:") {
                declared.push((
                    String::from_utf8_lossy(prefix).into_owned(),
                    attr.unescape_value()?.into_owned(),
                ));
            }
        }
        scopes.push(declared);

        let name = start.name();
        let prefix = name
            .prefix()
            .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned())
            .unwrap_or_default();
        let local = String::from_utf8_lossy(name.local_name().as_ref()).into_owned();
        let namespace = scopes.resolve(&prefix);

        Ok(Self {
            start,
            local,
            namespace,
            self_closing,
            children: Vec::new(),
        })
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn qualified_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.start.name().into_inner())
    }

    /// True when this is the WordprocessingML element `local`.
    pub fn is_wordml(&self, local: &str) -> bool {
        self.local == local
            && matches!(self.namespace.as_deref(), Some(WORDML_NS) | Some(WORDML_STRICT_NS))
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        self.self_closing = false;
        &mut self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn find_wordml_child(&self, local: &str) -> Option<&Element> {
        self.child_elements().find(|el| el.is_wordml(local))
    }

    /// Value of the first attribute with the given local name, ignoring namespace
    /// declarations.
    pub fn attribute(&self, local: &str) -> Option<String> {
        self.start
            .attributes()
            .flatten()
            .filter(|attr| {
                let key = attr.key.as_ref();
                key != b"xmlns" && !key.starts_with(b"xmlns:")
            })
            .find(|attr| attr.key.local_name().as_ref() == local.as_bytes())
            .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
    }

    fn has_raw_attribute(&self, qualified: &str) -> bool {
        self.start
            .attributes()
            .flatten()
            .any(|attr| attr.key.as_ref() == qualified.as_bytes())
    }

    /// Concatenated, unescaped character data of the direct children.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                Node::Text(text) => match text.unescape() {
                    Ok(value) => out.push_str(&value),
                    Err(_) => out.push_str(&String::from_utf8_lossy(text)),
                },
                Node::Other(Event::CData(cdata)) => out.push_str(&String::from_utf8_lossy(cdata)),
                _ => {}
            }
        }
        out
    }

    /// Replaces the character data of this element with `value`.
    pub fn set_text(&mut self, value: &str) {
        let needs_preserve = value.starts_with(char::is_whitespace) || value.ends_with(char::is_whitespace);
        if needs_preserve && !self.has_raw_attribute("xml:space") {
            self.start.push_attribute(("xml:space", "preserve"));
        }
        self.self_closing = false;
        self.children = vec![Node::Text(BytesText::new(value).into_owned())];
    }

    /// New empty element living in the same namespace and prefix as `self`.
    pub fn new_sibling_kind(&self, local: &str) -> Element {
        let qualified = self.qualified_name();
        let name = match qualified.split_once(':') {
            Some((prefix, _)) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        };
        Element {
            start: BytesStart::new(name),
            local: local.to_string(),
            namespace: self.namespace.clone(),
            self_closing: true,
            children: Vec::new(),
        }
    }

    pub fn push_element(&mut self, child: Element) {
        self.children_mut().push(Node::Element(child));
    }

    pub fn element_at(&self, path: &[usize]) -> Option<&Element> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => match self.children.get(*first)? {
                Node::Element(el) => el.element_at(rest),
                _ => None,
            },
        }
    }

    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => match self.children.get_mut(*first)? {
                Node::Element(el) => el.element_at_mut(rest),
                _ => None,
            },
        }
    }

    /// Removes the node at `path` (relative to this element) and returns it.
    pub fn remove_at(&mut self, path: &[usize]) -> Option<Node> {
        let (last, parent_path) = path.split_last()?;
        let parent = self.element_at_mut(parent_path)?;
        if *last < parent.children.len() {
            Some(parent.children.remove(*last))
        } else {
            None
        }
    }

    /// Paths (relative to this element) of every WordprocessingML descendant named
    /// `local`, in document order.
    pub fn wordml_descendant_paths(&self, local: &str) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        self.collect_paths(local, &mut path, &mut out);
        out
    }

    fn collect_paths(&self, local: &str, path: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        for (index, node) in self.children.iter().enumerate() {
            if let Node::Element(el) = node {
                path.push(index);
                if el.is_wordml(local) {
                    out.push(path.clone());
                }
                el.collect_paths(local, path, out);
                path.pop();
            }
        }
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        if self.self_closing && self.children.is_empty() {
            writer.write_event(Event::Empty(self.start.borrow()))?;
            return Ok(());
        }
        writer.write_event(Event::Start(self.start.borrow()))?;
        for node in &self.children {
            write_node(writer, node)?;
        }
        writer.write_event(Event::End(self.start.to_end()))?;
        Ok(())
    }
}

/// One parsed content part: the top-level nodes (declaration, root element and any
/// surrounding whitespace or comments).
#[derive(Debug, Clone)]
pub struct XmlPart {
    nodes: Vec<Node>,
}

impl XmlPart {
    pub fn parse(part_name: &str, bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(bytes);
        let mut scopes = NamespaceScopes::default();
        let mut stack: Vec<Element> = Vec::new();
        let mut nodes = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    stack.push(Element::from_start(start.into_owned(), &mut scopes, false)?);
                }
                Event::Empty(start) => {
                    let element = Element::from_start(start.into_owned(), &mut scopes, true)?;
                    scopes.pop();
                    attach(&mut stack, &mut nodes, Node::Element(element));
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| DocGenError::malformed(part_name, "closing tag without opening tag"))?;
                    scopes.pop();
                    attach(&mut stack, &mut nodes, Node::Element(element));
                }
                Event::Text(text) => attach(&mut stack, &mut nodes, Node::Text(text.into_owned())),
                Event::Eof => break,
                other => attach(&mut stack, &mut nodes, Node::Other(other.into_owned())),
            }
        }

        if let Some(open) = stack.last() {
            return Err(DocGenError::malformed(
                part_name,
                format!("element '{}' is never closed", open.qualified_name()),
            ));
        }

        Ok(Self { nodes })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            write_node(&mut writer, node)?;
        }
        Ok(writer.into_inner())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// `path[0]` indexes the top-level nodes, the rest descends through children.
    pub fn element_at(&self, path: &[usize]) -> Option<&Element> {
        let (first, rest) = path.split_first()?;
        match self.nodes.get(*first)? {
            Node::Element(el) => el.element_at(rest),
            _ => None,
        }
    }

    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let (first, rest) = path.split_first()?;
        match self.nodes.get_mut(*first)? {
            Node::Element(el) => el.element_at_mut(rest),
            _ => None,
        }
    }
}

fn attach(stack: &mut [Element], nodes: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => nodes.push(node),
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<()> {
    match node {
        Node::Element(el) => el.write_to(writer)?,
        Node::Text(text) => writer.write_event(Event::Text(text.clone()))?,
        Node::Other(event) => writer.write_event(event.clone())?,
    }
    Ok(())
}

#[derive(Debug, Default)]
struct NamespaceScopes {
    scopes: Vec<Vec<(String, String)>>,
}

impl NamespaceScopes {
    fn push(&mut self, declared: Vec<(String, String)>) {
        self.scopes.push(declared);
    }

    fn pop(&mut self) {
        self.scopes.pop();
    }

    fn resolve(&self, prefix: &str) -> Option<String> {
        if prefix == "xml" {
            return Some(XML_NS.to_string());
        }
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter())
            .find(|(declared, _)| declared == prefix)
            .map(|(_, uri)| uri.clone())
            .filter(|uri| !uri.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PART: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><w:body><!-- note --><w:p w:rsidR="00AB"><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Tom &amp; Jerry </w:t></w:r><a:t>drawing</a:t></w:p><w:sectPr/></w:body></w:document>"#;

    #[test]
    fn test_untouched_part_serializes_identically() {
        let part = XmlPart::parse("word/document.xml", PART.as_bytes()).unwrap();
        let bytes = part.to_bytes().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), PART);
    }

    #[test]
    fn test_namespace_resolution_distinguishes_prefixes() {
        let part = XmlPart::parse("word/document.xml", PART.as_bytes()).unwrap();
        let root = part.element_at(&[2]).unwrap();
        assert!(root.is_wordml("document"));

        let body = root.find_wordml_child("body").unwrap();
        let paths = body.wordml_descendant_paths("t");
        // a:t lives in DrawingML and is not a WordprocessingML text leaf
        assert_eq!(paths.len(), 1);
        let leaf = body.element_at(&paths[0]).unwrap();
        assert_eq!(leaf.text(), "Tom & Jerry ");
    }

    #[test]
    fn test_set_text_escapes_and_marks_whitespace() {
        let xml = r#"<w:t xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#;
        let mut part = XmlPart::parse("word/document.xml", xml.as_bytes()).unwrap();
        let leaf = part.element_at_mut(&[0]).unwrap();
        leaf.set_text(" <A&B>");
        assert_eq!(leaf.text(), " <A&B>");

        let out = String::from_utf8(part.to_bytes().unwrap()).unwrap();
        assert!(out.contains(r#"xml:space="preserve""#));
        assert!(out.contains("&lt;A&amp;B&gt;"));
        assert!(out.ends_with("</w:t>"));
    }

    #[test]
    fn test_default_namespace_is_resolved() {
        let xml = r#"<document xmlns="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><body/></document>"#;
        let part = XmlPart::parse("word/document.xml", xml.as_bytes()).unwrap();
        let root = part.element_at(&[0]).unwrap();
        assert!(root.is_wordml("document"));
        assert!(root.find_wordml_child("body").is_some());
    }

    #[test]
    fn test_unclosed_element_is_malformed() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;
        let err = XmlPart::parse("word/document.xml", xml.as_bytes()).unwrap_err();
        assert_eq!(err.category(), crate::utils::error::ErrorCategory::Template);
    }

    #[test]
    fn test_remove_at_returns_removed_node() {
        let xml = r#"<w:r xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:t>a</w:t><w:t>b</w:t></w:r>"#;
        let mut part = XmlPart::parse("word/document.xml", xml.as_bytes()).unwrap();
        let run = part.element_at_mut(&[0]).unwrap();
        let removed = run.remove_at(&[0]).unwrap();
        match removed {
            Node::Element(el) => assert_eq!(el.text(), "a"),
            _ => panic!("expected element"),
        }
        assert_eq!(run.wordml_descendant_paths("t").len(), 1);
    }
}
