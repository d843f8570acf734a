// src/error.rs

//! Error types for content changes and manifest handling

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while applying a content change
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed XML attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Malformed manifest document: {0}")]
    MalformedDocument(String),

    #[error("Unsupported manifest encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Manifest {manifest} is missing required node {path}")]
    MissingNode { path: String, manifest: PathBuf },

    #[error("Unknown namespace prefix '{0}' (expected one of std, mp, uap, iot, build)")]
    UnknownNamespacePrefix(String),

    #[error("Invalid element name '{0}'")]
    InvalidElementName(String),

    #[error("Invalid change plan: {0}")]
    Plan(#[from] toml::de::Error),
}

/// Result type for content operations
pub type Result<T> = std::result::Result<T, ContentError>;
