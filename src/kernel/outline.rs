//! Document outline: a navigable structure tree for JSON and XML.
//!
//! The tree is derived and disposable. It is rebuilt from content whenever the
//! content or language changes and never mutated in place.

use memchr::{memchr_iter, memmem};
use serde_json::Value;

use crate::kernel::convert::xml::{self, XmlElement};
use crate::kernel::language::DocumentLanguage;

pub const MAX_DEPTH: usize = 8;
pub const MAX_ARRAY_CHILDREN: usize = 50;
pub const MAX_XML_CHILDREN: usize = 100;
pub const PREVIEW_CHARS: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineNode {
    /// Dot-joined path; stable within one build only.
    pub id: String,
    pub label: String,
    /// 1-based best-effort anchor.
    pub line: u32,
    pub path: Vec<String>,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    fn new(label: String, line: u32, path: Vec<String>, children: Vec<OutlineNode>) -> Self {
        Self {
            id: path.join("."),
            label,
            line,
            path,
            children,
        }
    }

    /// Number of levels in this subtree, counting the node itself.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(OutlineNode::depth).max().unwrap_or(0)
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(OutlineNode::node_count).sum::<usize>()
    }
}

/// Builds the outline, or `None` for unstructured languages and unparsable content.
pub fn build_outline(content: &str, language: DocumentLanguage) -> Option<OutlineNode> {
    if content.trim().is_empty() {
        return None;
    }
    match language {
        DocumentLanguage::Json => JsonOutline::new(content).build(),
        DocumentLanguage::Xml => XmlOutline::new(content).build(),
        DocumentLanguage::Plaintext | DocumentLanguage::Yaml => None,
    }
}

/// The last node in document order whose anchor is at or before `line`.
///
/// Its `path` is the breadcrumb trail for the cursor position.
pub fn node_at_line(root: &OutlineNode, line: u32) -> Option<&OutlineNode> {
    fn visit<'a>(node: &'a OutlineNode, line: u32, best: &mut Option<&'a OutlineNode>) {
        if node.line > line {
            return;
        }
        if best.map_or(true, |b| node.line >= b.line) {
            *best = Some(node);
        }
        for child in &node.children {
            visit(child, line, best);
        }
    }

    let mut best = None;
    visit(root, line, &mut best);
    best
}

fn line_at(text: &str, offset: usize) -> u32 {
    let end = offset.min(text.len());
    memchr_iter(b'\n', &text.as_bytes()[..end]).count() as u32 + 1
}

fn leading_whitespace(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

fn preview(value: &Value) -> String {
    match value {
        Value::String(s) => {
            if s.chars().count() > PREVIEW_CHARS {
                let head: String = s.chars().take(PREVIEW_CHARS).collect();
                format!("{head}…")
            } else {
                s.clone()
            }
        }
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

struct JsonOutline<'a> {
    text: &'a str,
}

impl<'a> JsonOutline<'a> {
    fn new(text: &'a str) -> Self {
        Self { text }
    }

    fn build(&self) -> Option<OutlineNode> {
        let value: Value = serde_json::from_str(self.text.trim()).ok()?;
        if !value.is_object() && !value.is_array() {
            return None;
        }
        let anchor = leading_whitespace(self.text);
        self.node(&value, "root", vec!["root".to_string()], anchor, 0)
    }

    /// Offset of `"key"` followed by optional whitespace and a colon, searching from `from`.
    fn find_key(&self, key: &str, from: usize) -> Option<usize> {
        let quoted = serde_json::to_string(key).ok()?;
        let haystack = self.text.as_bytes();
        let finder = memmem::Finder::new(quoted.as_bytes());
        let mut start = from;
        while start < haystack.len() {
            let pos = start + finder.find(&haystack[start..])?;
            let rest = self.text[pos + quoted.len()..].trim_start();
            if rest.starts_with(':') {
                return Some(pos);
            }
            start = pos + quoted.len();
        }
        None
    }

    fn node(
        &self,
        value: &Value,
        name: &str,
        path: Vec<String>,
        anchor: usize,
        depth: usize,
    ) -> Option<OutlineNode> {
        if depth >= MAX_DEPTH {
            return None;
        }
        let line = line_at(self.text, anchor);

        match value {
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                let children = keys
                    .into_iter()
                    .filter_map(|key| {
                        let child_anchor = self.find_key(key, anchor).unwrap_or(anchor);
                        let mut child_path = path.clone();
                        child_path.push(key.clone());
                        self.node(&map[key.as_str()], key, child_path, child_anchor, depth + 1)
                    })
                    .collect();
                Some(OutlineNode::new(name.to_string(), line, path, children))
            }
            Value::Array(items) => {
                let children = items
                    .iter()
                    .take(MAX_ARRAY_CHILDREN)
                    .enumerate()
                    .filter_map(|(i, item)| {
                        let segment = format!("[{i}]");
                        let mut child_path = path.clone();
                        child_path.push(segment.clone());
                        self.node(item, &segment, child_path, anchor, depth + 1)
                    })
                    .collect();
                let label = format!("{name} [{}]", items.len());
                Some(OutlineNode::new(label, line, path, children))
            }
            leaf => {
                let label = format!("{name}: {}", preview(leaf));
                Some(OutlineNode::new(label, line, path, Vec::new()))
            }
        }
    }
}

struct XmlOutline<'a> {
    text: &'a str,
    base: usize,
}

impl<'a> XmlOutline<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            base: leading_whitespace(text),
        }
    }

    fn build(&self) -> Option<OutlineNode> {
        let doc = xml::parse_document(self.text).ok()?;
        self.node(&doc.root, &[], 0)
    }

    fn node(&self, el: &XmlElement, parent: &[String], depth: usize) -> Option<OutlineNode> {
        if depth >= MAX_DEPTH {
            return None;
        }
        let mut path = parent.to_vec();
        path.push(el.name.clone());
        let line = line_at(self.text, self.base + el.offset);

        let children = el
            .child_elements()
            .take(MAX_XML_CHILDREN)
            .filter_map(|child| self.node(child, &path, depth + 1))
            .collect();
        Some(OutlineNode::new(el.name.clone(), line, path, children))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/outline.rs"]
mod tests;
