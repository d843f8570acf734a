// src/plan.rs
//! Change plans (TOML)
//!
//! A change plan lists content changes in the order they are applied:
//!
//! ```toml
//! [[change]]
//! kind = "capability"
//! name = "systemManagement"
//! namespace = "iot"
//!
//! [[change]]
//! kind = "capability"
//! name = "lowLevelDevices"
//! namespace = "iot"
//! device_id = "D1"
//! function_type = "voiceCommand"
//! ```

use crate::content::{CapabilityAddition, ContentChange, ContentChangeSet};
use crate::error::Result;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// One entry of a change plan
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ChangeSpec {
    /// Append a capability declaration to `AppxManifest.xml`
    Capability(CapabilityAddition),
}

impl ChangeSpec {
    /// Check the entry without touching any file
    pub fn validate(&self) -> Result<()> {
        match self {
            ChangeSpec::Capability(addition) => addition.validate(),
        }
    }

    pub fn into_change(self) -> Box<dyn ContentChange> {
        match self {
            ChangeSpec::Capability(addition) => Box::new(addition),
        }
    }
}

/// Root structure of a change plan file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangePlan {
    #[serde(default, rename = "change")]
    pub changes: Vec<ChangeSpec>,
}

impl ChangePlan {
    /// Load a plan from a file path
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let plan = Self::parse(&content)?;
        debug!("Loaded {} changes from {}", plan.changes.len(), path.display());
        Ok(plan)
    }

    /// Parse a plan from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let plan: ChangePlan = toml::from_str(content)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Validate every entry
    pub fn validate(&self) -> Result<()> {
        for change in &self.changes {
            change.validate()?;
        }
        Ok(())
    }

    /// Turn the plan into an ordered change set
    pub fn into_change_set(self) -> ContentChangeSet {
        self.changes.into_iter().map(ChangeSpec::into_change).collect()
    }
}
