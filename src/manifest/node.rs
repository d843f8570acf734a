// src/manifest/node.rs

//! Tree nodes for the manifest document
//!
//! Parsed elements keep the exact `quick-xml` events they were read from, so
//! writing an untouched subtree reproduces its original bytes (attribute
//! order, quoting, whitespace inside tags, self-closing form).

use crate::error::Result;
use crate::namespace::{NamespaceScope, split_qname};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::borrow::Cow;
use std::io::Write;

/// A node in the document tree
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    /// Text, comments, CDATA, processing instructions, XML declaration
    Other(Event<'static>),
    /// Source bytes written back verbatim (`<!DOCTYPE ...>`)
    Raw(Vec<u8>),
}

impl Node {
    /// Whitespace-only text node
    pub fn whitespace(text: &str) -> Self {
        Node::Other(Event::Text(BytesText::from_escaped(text.to_string())))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Raw text content when this is a text node
    pub fn text(&self) -> Option<&[u8]> {
        match self {
            Node::Other(Event::Text(t)) => Some(&**t),
            _ => None,
        }
    }

    pub(crate) fn write<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            Node::Element(el) => el.write(writer),
            Node::Other(event) => {
                writer.write_event(event.borrow())?;
                Ok(())
            }
            Node::Raw(bytes) => {
                writer.get_mut().write_all(bytes)?;
                Ok(())
            }
        }
    }
}

/// An XML element with its children
#[derive(Debug, Clone)]
pub struct Element {
    start: BytesStart<'static>,
    /// Namespace URI the element was resolved to when read or built
    namespace: Option<String>,
    /// Original closing tag; `None` for self-closing or newly built elements
    end: Option<BytesEnd<'static>>,
    children: Vec<Node>,
}

impl Element {
    pub(crate) fn opened(start: BytesStart<'static>, namespace: Option<String>) -> Self {
        Self {
            start,
            namespace,
            end: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn close(&mut self, end: BytesEnd<'static>) {
        self.end = Some(end);
    }

    /// Qualified tag name as written (`iot:Capability`, `Capabilities`)
    pub fn qname(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.start.name().into_inner())
    }

    /// Tag name without its prefix
    pub fn local_name(&self) -> String {
        let qname = self.qname();
        split_qname(&qname).1.to_string()
    }

    /// Namespace URI of the element, `None` when it is in no namespace
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Unescaped value of the attribute `name`, if present
    pub fn attribute(&self, name: &str) -> Result<Option<String>> {
        match self.start.try_get_attribute(name)? {
            Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
            None => Ok(None),
        }
    }

    /// `xmlns` / `xmlns:prefix` declarations carried by this element
    pub fn namespace_declarations(&self) -> Result<Vec<(Option<String>, String)>> {
        let mut decls = Vec::new();
        for attr in self.start.attributes() {
            let attr = attr?;
            let key = attr.key.as_ref();
            let prefix = if key == b"xmlns" {
                None
            } else if let Some(prefix) = key.strip_prefix(b"xmlns:") {
                Some(String::from_utf8_lossy(prefix).into_owned())
            } else {
                continue;
            };
            decls.push((prefix, attr.unescape_value()?.into_owned()));
        }
        Ok(decls)
    }

    /// `scope` extended with this element's own declarations
    pub fn scope_within(&self, scope: &NamespaceScope) -> Result<NamespaceScope> {
        let mut inner = scope.clone();
        for (prefix, uri) in self.namespace_declarations()? {
            inner.bind(prefix.as_deref(), &uri);
        }
        Ok(inner)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Child elements, skipping text and comments
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Child elements whose local name is `local`
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.child_elements().filter(move |el| el.local_name() == local)
    }

    /// Append a child node at the end
    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    pub(crate) fn write<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        if self.children.is_empty() && self.end.is_none() {
            writer.write_event(Event::Empty(self.start.borrow()))?;
            return Ok(());
        }

        writer.write_event(Event::Start(self.start.borrow()))?;
        for child in &self.children {
            child.write(writer)?;
        }
        match &self.end {
            Some(end) => writer.write_event(Event::End(end.borrow()))?,
            None => writer.write_event(Event::End(self.start.to_end()))?,
        }
        Ok(())
    }
}

/// Indentation used when inserting new elements into an indented document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indent {
    /// Line break plus leading whitespace of the parent's own tags
    pub parent: String,
    /// One indentation level
    pub step: String,
}

impl Indent {
    fn nested(&self) -> Indent {
        Indent {
            parent: self.child(),
            step: self.step.clone(),
        }
    }

    pub(crate) fn child(&self) -> String {
        format!("{}{}", self.parent, self.step)
    }
}

/// An element to be created and inserted into the document
///
/// Names are qualified names as they will be written; `namespace` is the URI
/// the element must end up in. Declarations are added on insertion only when
/// the surrounding scope does not already bind the prefix to that URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewElement {
    qname: String,
    namespace: String,
    attributes: Vec<(String, String)>,
    children: Vec<NewElement>,
}

impl NewElement {
    pub fn new(qname: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            qname: qname.into(),
            namespace: namespace.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn qname(&self) -> &str {
        &self.qname
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[NewElement] {
        &self.children
    }

    pub fn push_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.push((key.into(), value.into()));
    }

    pub fn push_child(&mut self, child: NewElement) {
        self.children.push(child);
    }

    /// Build the tree node, declaring namespaces missing from `scope`
    pub(crate) fn into_element(self, scope: &NamespaceScope, indent: Option<&Indent>) -> Element {
        let (prefix, _) = split_qname(&self.qname);
        let mut start = BytesStart::new(self.qname.clone());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        let mut scope = scope.clone();
        let declarable = prefix.is_none() || !self.namespace.is_empty();
        if declarable && !scope.is_bound(prefix, &self.namespace) {
            let key = match prefix {
                Some(p) => format!("xmlns:{p}"),
                None => "xmlns".to_string(),
            };
            start.push_attribute((key.as_str(), self.namespace.as_str()));
            scope.bind(prefix, &self.namespace);
        }

        let namespace = Some(self.namespace).filter(|ns| !ns.is_empty());
        let mut element = Element::opened(start, namespace);
        if self.children.is_empty() {
            return element;
        }

        let nested = indent.map(Indent::nested);
        for child in self.children {
            if let Some(nested) = &nested {
                element.push(Node::whitespace(&nested.parent));
            }
            element.push(Node::Element(child.into_element(&scope, nested.as_ref())));
        }
        if let Some(indent) = indent {
            element.push(Node::whitespace(&indent.parent));
        }
        element
    }
}

/// Leading indentation of `siblings[idx]`: the trailing line break and
/// whitespace of the text node right before it
pub(crate) fn leading_indent(siblings: &[Node], idx: usize) -> Option<String> {
    let prev = siblings.get(idx.checked_sub(1)?)?.text()?;
    indent_suffix(prev)
}

/// Line break (`\n` or `\r\n`) plus trailing whitespace of a whitespace-only run
pub(crate) fn indent_suffix(text: &[u8]) -> Option<String> {
    if !text.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    let mut pos = text.iter().rposition(|&b| b == b'\n')?;
    if pos > 0 && text[pos - 1] == b'\r' {
        pos -= 1;
    }
    std::str::from_utf8(&text[pos..]).ok().map(str::to_string)
}
