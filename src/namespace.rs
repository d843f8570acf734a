// src/namespace.rs

//! Manifest schema namespaces
//!
//! Two pieces live here:
//!
//! - [`NamespaceTable`]: the fixed prefix → URI table used to *query* a
//!   manifest. Prefixes in this table are independent of whatever prefixes
//!   the document itself declares; they are never written back.
//! - [`NamespaceScope`]: the `xmlns` bindings in scope at an insertion point,
//!   used to decide whether a new element needs its own declaration.
//!   Namespaces of parsed elements are resolved while reading, by
//!   `quick_xml::NsReader`.

use crate::error::{ContentError, Result};

/// Foundation schema (root `Package` element)
pub const FOUNDATION_NS: &str = "http://schemas.microsoft.com/appx/manifest/foundation/windows10";
/// Phone manifest schema
pub const PHONE_NS: &str = "http://schemas.microsoft.com/appx/2014/phone/manifest";
/// UAP manifest schema
pub const UAP_NS: &str = "http://schemas.microsoft.com/appx/manifest/uap/windows10";
/// IoT manifest schema
pub const IOT_NS: &str = "http://schemas.microsoft.com/appx/manifest/iot/windows10";
/// Build metadata schema
pub const BUILD_NS: &str = "http://schemas.microsoft.com/developer/appx/2015/build";

const REGISTERED: [(&str, &str); 5] = [
    ("std", FOUNDATION_NS),
    ("mp", PHONE_NS),
    ("uap", UAP_NS),
    ("iot", IOT_NS),
    ("build", BUILD_NS),
];

/// Immutable prefix → namespace URI table
#[derive(Debug, Clone, Copy)]
pub struct NamespaceTable {
    entries: &'static [(&'static str, &'static str)],
}

impl NamespaceTable {
    /// The registered manifest namespaces (`std`, `mp`, `uap`, `iot`, `build`)
    pub const fn manifest() -> Self {
        Self {
            entries: &REGISTERED,
        }
    }

    /// Look up the URI bound to `prefix`
    pub fn lookup(&self, prefix: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(p, _)| *p == prefix)
            .map(|(_, uri)| *uri)
    }

    /// Look up the URI bound to `prefix`, failing for unregistered prefixes
    pub fn require(&self, prefix: &str) -> Result<&'static str> {
        self.lookup(prefix)
            .ok_or_else(|| ContentError::UnknownNamespacePrefix(prefix.to_string()))
    }

    /// Iterate over `(prefix, uri)` pairs in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.entries.iter().copied()
    }
}

impl Default for NamespaceTable {
    fn default() -> Self {
        Self::manifest()
    }
}

/// Split a qualified name into `(prefix, local)`
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    }
}

/// Check that `name` is usable as an unprefixed element name (an XML NCName)
pub fn check_local_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_')
                && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '\u{B7}'))
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ContentError::InvalidElementName(name.to_string()))
    }
}

/// Namespace bindings in scope at a point in the document
///
/// `None` as prefix is the default namespace. An empty URI undeclares the
/// default namespace (`xmlns=""`).
#[derive(Debug, Clone, Default)]
pub struct NamespaceScope {
    bindings: Vec<(Option<String>, String)>,
}

impl NamespaceScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding; later bindings shadow earlier ones
    pub fn bind(&mut self, prefix: Option<&str>, uri: &str) {
        self.bindings
            .push((prefix.map(str::to_string), uri.to_string()));
    }

    /// Resolve a prefix (`None` = default namespace) to its URI
    pub fn resolve(&self, prefix: Option<&str>) -> Option<&str> {
        if prefix == Some("xml") {
            return Some("http://www.w3.org/XML/1998/namespace");
        }
        self.bindings
            .iter()
            .rev()
            .find(|(p, _)| p.as_deref() == prefix)
            .map(|(_, uri)| uri.as_str())
            .filter(|uri| !uri.is_empty())
    }

    /// Whether `prefix` is currently bound to exactly `uri`
    ///
    /// An empty `uri` on the default prefix means "no namespace", which holds
    /// when no default namespace is in scope.
    pub fn is_bound(&self, prefix: Option<&str>, uri: &str) -> bool {
        match self.resolve(prefix) {
            Some(bound) => bound == uri,
            None => uri.is_empty() && prefix.is_none(),
        }
    }
}
