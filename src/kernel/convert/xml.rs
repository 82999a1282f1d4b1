use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use super::{json, yaml, ConversionError, Result};

const INDENT: &str = "  ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
    /// Everything between `<!DOCTYPE` and the closing `>`, internal subset included.
    DocType(String),
    /// Target and data of `<?target data?>`.
    ProcessingInstruction(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    /// Byte offset of the start tag within the parsed (trimmed) text.
    pub offset: usize,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            offset: 0,
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Concatenated text and CDATA of the direct children.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
                _ => {}
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    pub declaration: Option<String>,
    /// Comments, processing instructions and the doctype before the root element.
    pub prolog: Vec<XmlNode>,
    pub root: XmlElement,
    /// Comments and processing instructions after the root element.
    pub epilog: Vec<XmlNode>,
}

/// Internal general entities declared as `<!ENTITY name "value">` in a doctype.
fn internal_entities(doctype: &str) -> Vec<(String, String)> {
    let mut entities = Vec::new();
    let mut rest = doctype;
    while let Some(start) = rest.find("<!ENTITY") {
        rest = &rest[start + "<!ENTITY".len()..];
        let decl = rest.trim_start();
        if decl.starts_with('%') {
            continue;
        }
        let Some(name_end) = decl.find(char::is_whitespace) else {
            break;
        };
        let name = &decl[..name_end];
        let value = decl[name_end..].trim_start();
        let Some(quote) = value.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        let Some(len) = value[1..].find(quote) else {
            break;
        };
        entities.push((name.to_string(), value[1..1 + len].to_string()));
    }
    entities
}

fn resolve_entity<'a>(entities: &'a [(String, String)], name: &str) -> Option<&'a str> {
    entities
        .iter()
        .find(|(declared, _)| declared == name)
        .map(|(_, value)| value.as_str())
}

fn element_from_start(
    start: &BytesStart<'_>,
    offset: usize,
    entities: &[(String, String)],
) -> Result<XmlElement> {
    let mut el = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    el.offset = offset;
    for attr in start.attributes() {
        let attr = attr.map_err(ConversionError::parse)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value_with(|name| resolve_entity(entities, name))
            .map_err(ConversionError::parse)?
            .into_owned();
        el.attributes.push((key, value));
    }
    Ok(el)
}

fn declaration_text(decl: &BytesDecl<'_>) -> Result<String> {
    let version = decl.version().map_err(ConversionError::parse)?;
    let mut out = format!("<?xml version=\"{}\"", String::from_utf8_lossy(&version));
    if let Some(encoding) = decl.encoding() {
        let encoding = encoding.map_err(ConversionError::parse)?;
        out.push_str(&format!(" encoding=\"{}\"", String::from_utf8_lossy(&encoding)));
    }
    if let Some(standalone) = decl.standalone() {
        let standalone = standalone.map_err(ConversionError::parse)?;
        out.push_str(&format!(
            " standalone=\"{}\"",
            String::from_utf8_lossy(&standalone)
        ));
    }
    out.push_str("?>");
    Ok(out)
}

fn attach(el: XmlElement, stack: &mut [XmlElement], root: &mut Option<XmlElement>) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Element(el));
        Ok(())
    } else if root.is_some() {
        Err(ConversionError::parse("invalid XML: multiple root elements"))
    } else {
        *root = Some(el);
        Ok(())
    }
}

/// Parses a single-rooted XML document.
pub fn parse_document(text: &str) -> Result<XmlDocument> {
    let trimmed = text.trim();
    if !trimmed.starts_with('<') {
        return Err(ConversionError::UnrecognizedFormat);
    }

    let mut reader = Reader::from_str(trimmed);
    reader.config_mut().trim_text(false);

    let mut declaration = None;
    let mut prolog = Vec::new();
    let mut epilog = Vec::new();
    let mut entities = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let offset = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| ConversionError::parse(format!("invalid XML: {e}")))?;
        match event {
            Event::Start(start) => stack.push(element_from_start(&start, offset, &entities)?),
            Event::Empty(start) => {
                let el = element_from_start(&start, offset, &entities)?;
                attach(el, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| ConversionError::parse("invalid XML: unexpected closing tag"))?;
                attach(el, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape_with(|name| resolve_entity(&entities, name))
                    .map_err(ConversionError::parse)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Text(text.into_owned())),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(ConversionError::parse(
                            "invalid XML: text outside of the root element",
                        ))
                    }
                }
            }
            Event::CData(data) => {
                let data = String::from_utf8_lossy(&data).into_owned();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::CData(data)),
                    None => {
                        return Err(ConversionError::parse(
                            "invalid XML: CDATA outside of the root element",
                        ))
                    }
                }
            }
            Event::Comment(comment) => {
                let node = XmlNode::Comment(String::from_utf8_lossy(&comment).into_owned());
                place_misc(node, &mut stack, &root, &mut prolog, &mut epilog);
            }
            Event::PI(pi) => {
                let node =
                    XmlNode::ProcessingInstruction(String::from_utf8_lossy(&pi).into_owned());
                place_misc(node, &mut stack, &root, &mut prolog, &mut epilog);
            }
            Event::DocType(doctype) => {
                if root.is_some() || !stack.is_empty() {
                    return Err(ConversionError::parse(
                        "invalid XML: doctype after the root element",
                    ));
                }
                let doctype = String::from_utf8_lossy(&doctype).trim().to_string();
                entities = internal_entities(&doctype);
                prolog.push(XmlNode::DocType(doctype));
            }
            Event::Decl(decl) => declaration = Some(declaration_text(&decl)?),
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.last() {
        return Err(ConversionError::parse(format!(
            "invalid XML: unclosed element <{}>",
            open.name
        )));
    }
    let root = root.ok_or_else(|| ConversionError::parse("invalid XML: no root element"))?;

    Ok(XmlDocument {
        declaration,
        prolog,
        root,
        epilog,
    })
}

/// Comments and processing instructions may appear anywhere.
fn place_misc(
    node: XmlNode,
    stack: &mut [XmlElement],
    root: &Option<XmlElement>,
    prolog: &mut Vec<XmlNode>,
    epilog: &mut Vec<XmlNode>,
) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => prolog.push(node),
        None => epilog.push(node),
    }
}

fn is_blank_text(node: &XmlNode) -> bool {
    matches!(node, XmlNode::Text(t) if t.trim().is_empty())
}

fn write_open_tag(out: &mut String, el: &XmlElement) {
    out.push('<');
    out.push_str(&el.name);
    for (key, value) in &el.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }
}

fn write_leaf(out: &mut String, node: &XmlNode, trim: bool) {
    match node {
        XmlNode::Text(t) => {
            let t = if trim { t.trim() } else { t.as_str() };
            out.push_str(&partial_escape(t));
        }
        XmlNode::CData(t) => {
            out.push_str("<![CDATA[");
            out.push_str(t);
            out.push_str("]]>");
        }
        XmlNode::Comment(t) => {
            out.push_str("<!--");
            out.push_str(t);
            out.push_str("-->");
        }
        XmlNode::DocType(t) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(t);
            out.push('>');
        }
        XmlNode::ProcessingInstruction(t) => {
            out.push_str("<?");
            out.push_str(t);
            out.push_str("?>");
        }
        XmlNode::Element(_) => {}
    }
}

fn write_element(out: &mut String, el: &XmlElement, depth: usize, pretty: bool) {
    let significant: Vec<&XmlNode> = el.children.iter().filter(|n| !is_blank_text(n)).collect();

    write_open_tag(out, el);
    if significant.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    let text_only = significant
        .iter()
        .all(|n| matches!(n, XmlNode::Text(_) | XmlNode::CData(_)));
    if text_only {
        for node in &el.children {
            write_leaf(out, node, false);
        }
    } else {
        for node in significant {
            if pretty {
                out.push('\n');
                out.push_str(&INDENT.repeat(depth + 1));
            }
            match node {
                XmlNode::Element(child) => write_element(out, child, depth + 1, pretty),
                leaf => write_leaf(out, leaf, pretty),
            }
        }
        if pretty {
            out.push('\n');
            out.push_str(&INDENT.repeat(depth));
        }
    }

    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

pub fn serialize(doc: &XmlDocument, pretty: bool) -> String {
    let mut out = String::new();
    let separator = if pretty { "\n" } else { "" };

    if let Some(decl) = &doc.declaration {
        out.push_str(decl);
        out.push_str(separator);
    }
    for node in &doc.prolog {
        write_leaf(&mut out, node, pretty);
        out.push_str(separator);
    }
    write_element(&mut out, &doc.root, 0, pretty);
    for node in &doc.epilog {
        out.push_str(separator);
        write_leaf(&mut out, node, pretty);
    }
    out
}

pub fn format_xml(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Ok(text.to_string());
    }
    Ok(serialize(&parse_document(text)?, true))
}

pub fn minify_xml(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Ok(text.to_string());
    }
    Ok(serialize(&parse_document(text)?, false))
}

fn element_name_for_key(key: &str) -> String {
    if key.is_empty() {
        "_".to_string()
    } else {
        key.replace(' ', "_")
    }
}

fn fill_from_json(parent: &mut XmlElement, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                let mut child = XmlElement::new(element_name_for_key(key));
                fill_from_json(&mut child, value);
                parent.children.push(XmlNode::Element(child));
            }
        }
        Value::Array(items) => {
            for item in items {
                let mut child = XmlElement::new("item");
                fill_from_json(&mut child, item);
                parent.children.push(XmlNode::Element(child));
            }
        }
        Value::String(s) => {
            if !s.is_empty() {
                parent.children.push(XmlNode::Text(s.clone()));
            }
        }
        Value::Number(n) => parent.children.push(XmlNode::Text(n.to_string())),
        Value::Bool(b) => parent.children.push(XmlNode::Text(b.to_string())),
        Value::Null => parent.children.push(XmlNode::Text("null".to_string())),
    }
}

fn value_to_xml(value: &Value) -> String {
    let mut root = XmlElement::new("root");
    fill_from_json(&mut root, value);
    let doc = XmlDocument {
        declaration: None,
        prolog: Vec::new(),
        root,
        epilog: Vec::new(),
    };
    serialize(&doc, true)
}

/// Converts an element into JSON. Attributes are not carried over.
///
/// Repeated sibling tags coalesce into an array: the first repeat turns the
/// existing value into a two element array, later repeats append.
pub fn element_to_json(el: &XmlElement) -> Value {
    if el.child_elements().next().is_none() {
        return Value::String(el.text().trim().to_string());
    }

    let mut map = Map::new();
    for child in el.child_elements() {
        let value = element_to_json(child);
        match map.get_mut(&child.name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(child.name.clone(), value);
            }
        }
    }
    Value::Object(map)
}

pub fn json_to_xml(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Ok(text.to_string());
    }
    let value = json::parse_document(text)?;
    Ok(value_to_xml(&value))
}

pub fn xml_to_json(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Ok(text.to_string());
    }
    let doc = parse_document(text)?;
    json::to_pretty(element_to_json(&doc.root))
}

pub fn xml_to_yaml(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Ok(text.to_string());
    }
    let doc = parse_document(text)?;
    yaml::emit_json(&element_to_json(&doc.root))
}

pub fn yaml_to_xml(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Ok(text.to_string());
    }
    let value = yaml::parse_structured_as_json(text)?;
    Ok(value_to_xml(&value))
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/convert/xml.rs"]
mod tests;
