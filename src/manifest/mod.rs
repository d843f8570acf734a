// src/manifest/mod.rs

//! Package manifest (`AppxManifest.xml`) document model
//!
//! A small, byte-preserving XML tree on top of `quick-xml`:
//!
//! - Parsing never resolves external resources and never expands entities.
//!   A `<!DOCTYPE>` is kept as its source bytes and entity references stay
//!   exactly as written.
//! - Untouched nodes serialize back to their original bytes, so the only
//!   difference after a mutation is the inserted content.
//! - Lookups are namespace-aware: element namespaces are resolved while
//!   reading, and [`ElementPath`] prefixes come from a
//!   [`NamespaceTable`](crate::namespace::NamespaceTable), independent of the
//!   prefixes the manifest happens to declare.
//!
//! # Example
//!
//! ```
//! use appx_content::manifest::{ElementPath, ManifestDocument, NewElement};
//! use appx_content::namespace::{NamespaceTable, FOUNDATION_NS};
//!
//! let xml = format!(r#"<Package xmlns="{FOUNDATION_NS}"><Capabilities></Capabilities></Package>"#);
//! let mut doc = ManifestDocument::parse(xml.as_bytes()).unwrap();
//!
//! let path = ElementPath::parse("/std:Package/std:Capabilities", &NamespaceTable::manifest()).unwrap();
//! let selection = doc.select(&path).unwrap().unwrap();
//!
//! let mut cap = NewElement::new("Capability", FOUNDATION_NS);
//! cap.push_attribute("Name", "internetClient");
//! doc.append_child(&selection, cap).unwrap();
//!
//! let out = String::from_utf8(doc.to_bytes().unwrap()).unwrap();
//! assert!(out.contains(r#"<Capabilities><Capability Name="internetClient"/></Capabilities>"#));
//! ```

mod node;
mod path;

pub use node::{Element, Indent, NewElement, Node};
pub use path::{ElementPath, PathStep};

use crate::error::{ContentError, Result};
use crate::namespace::NamespaceScope;
use node::leading_indent;
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::{NsReader, Writer};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the package manifest inside a content root
pub const MANIFEST_FILE_NAME: &str = "AppxManifest.xml";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Location of the manifest under `root_folder`
pub fn manifest_path(root_folder: &Path) -> PathBuf {
    root_folder.join(MANIFEST_FILE_NAME)
}

/// An element found by [`ManifestDocument::select`]
#[derive(Debug, Clone)]
pub struct Selection {
    /// Child node indices from the document element down to the target
    indices: Vec<usize>,
    /// Namespace bindings in scope inside the target element
    scope: NamespaceScope,
}

/// A parsed manifest
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    bom: bool,
    /// Declaration, comments and whitespace before the document element
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl ManifestDocument {
    /// Read and parse a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        debug!("Loaded manifest {} ({} bytes)", path.display(), bytes.len());
        Self::parse(&bytes)
    }

    /// Parse a manifest from bytes
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF]) {
            return Err(ContentError::UnsupportedEncoding(
                "UTF-16 byte order mark".to_string(),
            ));
        }
        let (bom, body) = match bytes.strip_prefix(UTF8_BOM) {
            Some(rest) => (true, rest),
            None => (false, bytes),
        };

        let mut reader = NsReader::from_reader(body);
        let mut stack: Vec<Element> = Vec::new();
        let mut nodes = Vec::new();

        loop {
            let offset = reader.buffer_position() as usize;
            let (resolved, event) = reader.read_resolved_event()?;
            let namespace = match resolved {
                ResolveResult::Bound(ns) if !ns.as_ref().is_empty() => {
                    Some(String::from_utf8_lossy(ns.as_ref()).into_owned())
                }
                _ => None,
            };

            let node = match event {
                Event::Start(start) => {
                    stack.push(Element::opened(start.into_owned(), namespace));
                    continue;
                }
                Event::End(end) => {
                    let mut element = stack.pop().ok_or_else(|| {
                        ContentError::MalformedDocument(format!(
                            "unexpected closing tag at byte {}",
                            reader.buffer_position()
                        ))
                    })?;
                    element.close(end.into_owned());
                    Node::Element(element)
                }
                Event::Empty(start) => {
                    Node::Element(Element::opened(start.into_owned(), namespace))
                }
                Event::DocType(_) => {
                    let end = reader.buffer_position() as usize;
                    let raw = body.get(offset..end).ok_or_else(|| {
                        ContentError::MalformedDocument(format!(
                            "doctype at byte {} is out of bounds",
                            offset
                        ))
                    })?;
                    Node::Raw(raw.to_vec())
                }
                Event::Eof => break,
                other => Node::Other(other.into_owned()),
            };

            match stack.last_mut() {
                Some(parent) => parent.push(node),
                None => nodes.push(node),
            }
        }

        if let Some(open) = stack.last() {
            return Err(ContentError::MalformedDocument(format!(
                "unclosed element <{}>",
                open.qname()
            )));
        }

        let roots = nodes.iter().filter(|node| node.as_element().is_some()).count();
        let mut prolog = Vec::new();
        let mut root = None;
        let mut epilog = Vec::new();
        for node in nodes {
            match node {
                Node::Element(element) if root.is_none() => root = Some(element),
                other if root.is_none() => prolog.push(other),
                other => epilog.push(other),
            }
        }
        let Some(root) = root else {
            return Err(ContentError::MalformedDocument(
                "document has no root element".to_string(),
            ));
        };
        if roots > 1 {
            return Err(ContentError::MalformedDocument(
                "document has more than one root element".to_string(),
            ));
        }

        Ok(Self {
            bom,
            prolog,
            root,
            epilog,
        })
    }

    /// The document element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Namespace URI of the document element, `None` if it has none
    pub fn root_namespace(&self) -> Option<&str> {
        self.root.namespace()
    }

    /// First element matching `path` in document order
    pub fn select(&self, path: &ElementPath) -> Result<Option<Selection>> {
        let Some((first, rest)) = path.steps().split_first() else {
            return Ok(None);
        };

        let root = self.root();
        if !first.matches(root) {
            return Ok(None);
        }
        let scope = root.scope_within(&NamespaceScope::new())?;

        let mut indices = Vec::new();
        Ok(Self::descend(root, rest, scope, &mut indices)?
            .map(|scope| Selection { indices, scope }))
    }

    fn descend(
        element: &Element,
        steps: &[PathStep],
        scope: NamespaceScope,
        indices: &mut Vec<usize>,
    ) -> Result<Option<NamespaceScope>> {
        let Some((step, rest)) = steps.split_first() else {
            return Ok(Some(scope));
        };

        for (idx, node) in element.children().iter().enumerate() {
            let Some(child) = node.as_element() else {
                continue;
            };
            if !step.matches(child) {
                continue;
            }
            let child_scope = child.scope_within(&scope)?;
            indices.push(idx);
            if let Some(found) = Self::descend(child, rest, child_scope, indices)? {
                return Ok(Some(found));
            }
            indices.pop();
        }
        Ok(None)
    }

    /// The element a selection points at
    pub fn element(&self, selection: &Selection) -> Option<&Element> {
        let mut current = self.root();
        for &idx in &selection.indices {
            current = current.children().get(idx)?.as_element()?;
        }
        Some(current)
    }

    fn element_mut(&mut self, indices: &[usize]) -> Option<&mut Element> {
        let mut current = &mut self.root;
        for &idx in indices {
            current = current.children_mut().get_mut(idx)?.as_element_mut()?;
        }
        Some(current)
    }

    /// Indentation of the element at `indices`, if the document is indented there
    fn indent_at(&self, indices: &[usize]) -> Option<Indent> {
        let mut levels =
            vec![leading_indent(&self.prolog, self.prolog.len()).unwrap_or_else(|| "\n".to_string())];
        let mut current = self.root();
        for &idx in indices {
            levels.push(leading_indent(current.children(), idx)?);
            current = current.children().get(idx)?.as_element()?;
        }
        let own = levels.last()?.clone();

        let from_children = current
            .children()
            .iter()
            .position(|node| node.as_element().is_some())
            .and_then(|idx| leading_indent(current.children(), idx))
            .and_then(|child| child.strip_prefix(own.as_str()).map(str::to_string))
            .filter(|step| !step.is_empty());
        if indices.is_empty() && from_children.is_none() {
            return None;
        }
        let from_parent = levels
            .len()
            .checked_sub(2)
            .and_then(|parent| own.strip_prefix(levels[parent].as_str()).map(str::to_string))
            .filter(|step| !step.is_empty());

        let step = from_children
            .or(from_parent)
            .unwrap_or_else(|| "  ".to_string());
        Some(Indent { parent: own, step })
    }

    /// Append `new` as the last child of the selected element
    ///
    /// In an indented document the new element is placed on its own line,
    /// indented like its siblings; existing nodes are left untouched.
    pub fn append_child(&mut self, selection: &Selection, new: NewElement) -> Result<()> {
        let indent = self.indent_at(&selection.indices);
        let own_indent = indent.as_ref().map(|indent| Indent {
            parent: indent.child(),
            step: indent.step.clone(),
        });
        let element = new.into_element(&selection.scope, own_indent.as_ref());

        let target = self.element_mut(&selection.indices).ok_or_else(|| {
            ContentError::MalformedDocument("selection does not point at an element".to_string())
        })?;
        let children = target.children_mut();

        let Some(indent) = indent else {
            children.push(Node::Element(element));
            return Ok(());
        };

        let trailing_whitespace = children
            .last()
            .and_then(Node::text)
            .is_some_and(|text| text.iter().all(u8::is_ascii_whitespace));
        if trailing_whitespace {
            let at = children.len() - 1;
            children.insert(at, Node::whitespace(&indent.child()));
            children.insert(at + 1, Node::Element(element));
        } else {
            children.push(Node::whitespace(&indent.child()));
            children.push(Node::Element(element));
            children.push(Node::whitespace(&indent.parent));
        }
        Ok(())
    }

    /// Serialize the whole document
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.prolog {
            node.write(&mut writer)?;
        }
        self.root.write(&mut writer)?;
        for node in &self.epilog {
            node.write(&mut writer)?;
        }
        let body = writer.into_inner();

        let mut out = Vec::with_capacity(body.len() + UTF8_BOM.len());
        if self.bom {
            out.extend_from_slice(UTF8_BOM);
        }
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Serialize and overwrite `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, &bytes)?;
        debug!("Wrote manifest {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}
