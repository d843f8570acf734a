// src/lib.rs

//! appx-content
//!
//! Structured content changes for application package content roots. The
//! main change kind edits the package manifest (`AppxManifest.xml`): it
//! appends capability declarations, optionally bound to a device and a
//! device function.
//!
//! # Architecture
//!
//! - Content changes: every edit implements [`ContentChange`] and reports
//!   whether its target existed; [`ContentChangeSet`] applies them in order
//! - Manifest model: byte-preserving XML tree on `quick-xml`, with
//!   namespace-aware lookups against a fixed prefix table
//! - Change plans: ordered lists of changes loaded from TOML
//!
//! # Example
//!
//! ```no_run
//! use appx_content::{CapabilityAddition, ContentChange};
//! use std::path::Path;
//!
//! let addition = CapabilityAddition::builder("systemManagement")
//!     .namespace("iot")
//!     .build();
//! let applied = addition.apply_to_content(Path::new("build/package"))?;
//! # Ok::<(), appx_content::ContentError>(())
//! ```

pub mod content;
mod error;
pub mod manifest;
pub mod namespace;
pub mod plan;

pub use content::{
    CapabilityAddition, CapabilityAdditionBuilder, ChangeOutcome, ChangeReport, ContentChange,
    ContentChangeSet,
};
pub use error::{ContentError, Result};
pub use manifest::{MANIFEST_FILE_NAME, ManifestDocument};
pub use namespace::NamespaceTable;
pub use plan::{ChangePlan, ChangeSpec};
