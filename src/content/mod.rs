// src/content/mod.rs
//! Content changes applied to a package content root
//!
//! A content change is one self-contained edit of the files under a content
//! root (the directory holding `AppxManifest.xml`). Every kind of edit
//! implements [`ContentChange`], so callers can hold an ordered,
//! heterogeneous [`ContentChangeSet`] and apply it in one pass.
//!
//! Changes perform no locking. A set applies its changes strictly in order,
//! one read-modify-write cycle at a time; callers must not apply two sets to
//! the same root concurrently.

pub mod capability;

pub use capability::{CapabilityAddition, CapabilityAdditionBuilder};

use crate::error::Result;
use std::fmt;
use std::path::Path;
use tracing::{debug, error, info};

/// A transformation of the content under a root folder
pub trait ContentChange: Send + Sync {
    /// Change kind for logging and error messages
    fn name(&self) -> &str;

    /// Human readable summary of this particular change
    fn describe(&self) -> String {
        self.name().to_string()
    }

    /// Apply this change to the content under `root_folder`
    ///
    /// Returns `Ok(true)` when the target existed and the change was
    /// persisted, `Ok(false)` when the target does not exist (nothing is
    /// read, written or created). Malformed content is an error.
    fn apply_to_content(&self, root_folder: &Path) -> Result<bool>;
}

/// Result of applying a single change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Target existed and was rewritten
    Applied,
    /// Target missing, nothing done
    Skipped,
}

impl From<bool> for ChangeOutcome {
    fn from(applied: bool) -> Self {
        if applied {
            ChangeOutcome::Applied
        } else {
            ChangeOutcome::Skipped
        }
    }
}

impl fmt::Display for ChangeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeOutcome::Applied => write!(f, "applied"),
            ChangeOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

/// Report entry for one change in a set
#[derive(Debug, Clone)]
pub struct ChangeReport {
    pub description: String,
    pub outcome: ChangeOutcome,
}

/// Ordered sequence of content changes
pub struct ContentChangeSet {
    changes: Vec<Box<dyn ContentChange>>,
}

impl ContentChangeSet {
    /// Create an empty change set
    pub fn new() -> Self {
        Self {
            changes: Vec::new(),
        }
    }

    /// Add a change at the end of the set
    pub fn add(&mut self, change: Box<dyn ContentChange>) {
        self.changes.push(change);
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn ContentChange> {
        self.changes.iter().map(|change| change.as_ref())
    }

    /// Apply every change to `root_folder`, in insertion order
    ///
    /// Stops at the first error; changes before it stay applied.
    pub fn apply(&self, root_folder: &Path) -> Result<Vec<ChangeReport>> {
        let mut reports = Vec::with_capacity(self.changes.len());

        for change in &self.changes {
            let description = change.describe();
            let outcome = match change.apply_to_content(root_folder) {
                Ok(applied) => ChangeOutcome::from(applied),
                Err(e) => {
                    error!("{} failed on {}: {}", description, root_folder.display(), e);
                    return Err(e);
                }
            };
            debug!("{}: {}", description, outcome);
            reports.push(ChangeReport {
                description,
                outcome,
            });
        }

        let applied = reports
            .iter()
            .filter(|r| r.outcome == ChangeOutcome::Applied)
            .count();
        info!(
            "Applied {} of {} content changes to {}",
            applied,
            reports.len(),
            root_folder.display()
        );
        Ok(reports)
    }
}

impl Default for ContentChangeSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Box<dyn ContentChange>> for ContentChangeSet {
    fn from_iter<I: IntoIterator<Item = Box<dyn ContentChange>>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}
