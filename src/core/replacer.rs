use crate::core::xml::{Element, Node};
use crate::utils::error::{DocGenError, Result};

/// How a placeholder's content gets overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentReplacer {
    /// Collapse every text leaf of the region into one carrying this value.
    SingleLine(String),
    /// Fill the region's table, one row per entry, cells by position.
    Table(Vec<Vec<String>>),
}

impl ContentReplacer {
    pub fn single_line(value: impl Into<String>) -> Self {
        ContentReplacer::SingleLine(value.into())
    }

    pub fn table<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        ContentReplacer::Table(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    /// The single-line value, if this is a single-line replacer.
    pub fn text(&self) -> Option<&str> {
        match self {
            ContentReplacer::SingleLine(value) => Some(value),
            ContentReplacer::Table(_) => None,
        }
    }

    /// Overwrites `content` (the region's content element) in place.
    pub fn replace(&self, key: &str, content: &mut Element) -> Result<()> {
        match self {
            ContentReplacer::SingleLine(value) => replace_single_line(key, content, value),
            ContentReplacer::Table(rows) => replace_table(key, content, rows),
        }
    }
}

fn empty_region(key: &str) -> DocGenError {
    DocGenError::EmptyRegion { key: key.to_string() }
}

fn replace_single_line(key: &str, content: &mut Element, value: &str) -> Result<()> {
    let leaves = content.wordml_descendant_paths("t");
    let first = leaves.first().cloned().ok_or_else(|| empty_region(key))?;

    // 從最後一個開始刪除，前面節點的路徑才不會位移
    for path in leaves.iter().skip(1).rev() {
        content.remove_at(path);
    }
    if leaves.len() > 1 {
        tracing::debug!("Collapsed {} text runs of '{}' into one", leaves.len(), key);
    }

    content
        .element_at_mut(&first)
        .ok_or_else(|| empty_region(key))?
        .set_text(value);
    Ok(())
}

fn replace_table(key: &str, content: &mut Element, rows: &[Vec<String>]) -> Result<()> {
    let container_path = find_row_container(content, &mut Vec::new()).ok_or_else(|| empty_region(key))?;
    let container = content
        .element_at_mut(&container_path)
        .ok_or_else(|| empty_region(key))?;

    let template_index = container
        .children()
        .iter()
        .rposition(|node| matches!(node, Node::Element(el) if el.is_wordml("tr")))
        .ok_or_else(|| empty_region(key))?;
    let template = container
        .element_at(&[template_index])
        .cloned()
        .ok_or_else(|| empty_region(key))?;

    let mut filled = Vec::with_capacity(rows.len());
    for values in rows {
        let mut row = template.clone();
        fill_row(key, &mut row, values)?;
        filled.push(Node::Element(row));
    }

    let children = container.children_mut();
    children.splice(template_index..=template_index, filled);
    tracing::debug!("Filled table '{}' with {} rows", key, rows.len());
    Ok(())
}

fn fill_row(key: &str, row: &mut Element, values: &[String]) -> Result<()> {
    let cells: Vec<usize> = row
        .children()
        .iter()
        .enumerate()
        .filter(|(_, node)| matches!(node, Node::Element(el) if el.is_wordml("tc")))
        .map(|(index, _)| index)
        .collect();

    for (position, cell_index) in cells.into_iter().enumerate() {
        let value = values.get(position).map(String::as_str).unwrap_or("");
        let cell = row
            .element_at_mut(&[cell_index])
            .ok_or_else(|| empty_region(key))?;

        if cell.wordml_descendant_paths("t").is_empty() {
            write_into_empty_cell(key, cell, value)?;
        } else {
            replace_single_line(key, cell, value)?;
        }
    }
    Ok(())
}

fn write_into_empty_cell(key: &str, cell: &mut Element, value: &str) -> Result<()> {
    let paragraph_index = cell
        .children()
        .iter()
        .position(|node| matches!(node, Node::Element(el) if el.is_wordml("p")))
        .ok_or_else(|| empty_region(key))?;
    let paragraph = cell
        .element_at_mut(&[paragraph_index])
        .ok_or_else(|| empty_region(key))?;

    let mut run = paragraph.new_sibling_kind("r");
    let mut text = paragraph.new_sibling_kind("t");
    text.set_text(value);
    run.push_element(text);
    paragraph.push_element(run);
    Ok(())
}

fn find_row_container(element: &Element, path: &mut Vec<usize>) -> Option<Vec<usize>> {
    if element.child_elements().any(|child| child.is_wordml("tr")) {
        return Some(path.clone());
    }
    for (index, node) in element.children().iter().enumerate() {
        if let Node::Element(child) = node {
            path.push(index);
            if let Some(found) = find_row_container(child, path) {
                return Some(found);
            }
            path.pop();
        }
    }
    None
}
