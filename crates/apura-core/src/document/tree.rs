//! Schema-less document tree built from XML.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::trace;

use crate::error::ExtractionError;

/// A node of a parsed document.
///
/// Elements with child elements or attributes become maps keyed by local
/// tag name (attributes under `@name`, mixed text under `#text`). Repeated
/// siblings collapse into a list. Anything else is a text leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Map(BTreeMap<String, Node>),
    List(Vec<Node>),
    Leaf(String),
}

impl Node {
    /// Child lookup; only maps have children.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Map(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Node::Leaf(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Node::Map(_))
    }

    /// Follow `path` from this node. Every step, the last included, must
    /// land on a map.
    pub fn resolve(&self, path: &[&str]) -> Option<&Node> {
        path.iter()
            .try_fold(self, |node, segment| node.get(segment))
            .filter(|node| node.is_map())
    }

    /// Try candidate paths in order and return the first that resolves,
    /// together with the path that matched.
    pub fn resolve_first<'p>(&self, candidates: &[&'p [&'p str]]) -> Option<(&'p [&'p str], &Node)> {
        candidates
            .iter()
            .find_map(|path| self.resolve(path).map(|node| (*path, node)))
    }
}

/// An element being assembled while its children stream in.
struct OpenElement {
    name: String,
    children: Vec<(String, Node)>,
    text: String,
}

impl OpenElement {
    fn open(start: &BytesStart<'_>) -> Result<Self, ExtractionError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut children = Vec::new();

        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let key = format!("@{}", String::from_utf8_lossy(attr.key.local_name().as_ref()));
            let value = attr.unescape_value()?.into_owned();
            children.push((key, Node::Leaf(value)));
        }

        Ok(Self {
            name,
            children,
            text: String::new(),
        })
    }

    fn close(self) -> (String, Node) {
        if self.children.is_empty() {
            return (self.name, Node::Leaf(self.text.trim().to_string()));
        }

        let mut map = BTreeMap::new();
        for (key, node) in self.children {
            match map.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(node);
                }
                Entry::Occupied(mut slot) => match slot.get_mut() {
                    Node::List(items) => items.push(node),
                    existing => {
                        let first = std::mem::replace(existing, Node::List(Vec::new()));
                        *existing = Node::List(vec![first, node]);
                    }
                },
            }
        }

        let text = self.text.trim();
        if !text.is_empty() {
            map.insert("#text".to_string(), Node::Leaf(text.to_string()));
        }

        (self.name, Node::Map(map))
    }
}

/// Parse XML bytes into a tree whose top level maps the root element name
/// to its content.
pub fn parse_xml(data: &[u8]) -> Result<Node, ExtractionError> {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<(String, Node)> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => stack.push(OpenElement::open(&e)?),
            Event::Empty(e) => {
                let element = OpenElement::open(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ExtractionError::invalid("document", "unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(ExtractionError::invalid(
            "document",
            format!("unclosed element <{}>", open.name),
        ));
    }

    let (name, node) = root.ok_or_else(|| ExtractionError::MissingNode("root element".into()))?;
    trace!("Parsed XML document with root <{}>", name);

    let mut top = BTreeMap::new();
    top.insert(name, node);
    Ok(Node::Map(top))
}

fn attach(
    stack: &mut [OpenElement],
    root: &mut Option<(String, Node)>,
    element: OpenElement,
) -> Result<(), ExtractionError> {
    let closed = element.close();
    match stack.last_mut() {
        Some(parent) => parent.children.push(closed),
        None if root.is_none() => *root = Some(closed),
        None => {
            return Err(ExtractionError::invalid(
                "document",
                format!("second root element <{}>", closed.0),
            ))
        }
    }
    Ok(())
}
