// src/manifest/path.rs

//! Absolute element paths such as `/std:Package/std:Capabilities`
//!
//! Prefixes in a path are resolved against a [`NamespaceTable`], not against
//! the document, so `std:Package` matches `<Package xmlns="...foundation...">`
//! as well as `<f:Package xmlns:f="...foundation...">`. An unprefixed step
//! matches only elements in no namespace.

use crate::error::{ContentError, Result};
use crate::namespace::{NamespaceTable, split_qname};
use std::fmt;

use super::node::Element;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    namespace: Option<String>,
    local: String,
}

impl PathStep {
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    /// Whether `element` is selected by this step
    pub(crate) fn matches(&self, element: &Element) -> bool {
        element.namespace() == self.namespace.as_deref() && element.local_name() == self.local
    }
}

/// Absolute child-axis path from the document element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPath {
    source: String,
    steps: Vec<PathStep>,
}

impl ElementPath {
    /// Parse `/p:A/p:B/...` using `table` for prefixes
    pub fn parse(path: &str, table: &NamespaceTable) -> Result<Self> {
        let body = path.strip_prefix('/').ok_or_else(|| {
            ContentError::MalformedDocument(format!("element path '{}' must be absolute", path))
        })?;

        let mut steps = Vec::new();
        for segment in body.split('/') {
            if segment.is_empty() {
                return Err(ContentError::MalformedDocument(format!(
                    "element path '{}' has an empty step",
                    path
                )));
            }
            let (prefix, local) = split_qname(segment);
            let namespace = match prefix {
                Some(p) => Some(table.require(p)?.to_string()),
                None => None,
            };
            steps.push(PathStep {
                namespace,
                local: local.to_string(),
            });
        }

        Ok(Self {
            source: path.to_string(),
            steps,
        })
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
