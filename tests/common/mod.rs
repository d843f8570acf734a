// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use appx_content::manifest::{Element, ElementPath};
use appx_content::namespace::NamespaceTable;
use appx_content::{MANIFEST_FILE_NAME, ManifestDocument};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A typical IoT Core app manifest with one existing capability.
pub const IOT_MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Package
  xmlns="http://schemas.microsoft.com/appx/manifest/foundation/windows10"
  xmlns:mp="http://schemas.microsoft.com/appx/2014/phone/manifest"
  xmlns:uap="http://schemas.microsoft.com/appx/manifest/uap/windows10"
  xmlns:iot="http://schemas.microsoft.com/appx/manifest/iot/windows10"
  IgnorableNamespaces="uap mp iot">

  <Identity Name="HelloBlinky" Publisher="CN=Contoso" Version="1.0.0.0" />
  <mp:PhoneIdentity PhoneProductId="0d6bd3c6-3b09-4a28-9d1c-2f3d5e7a9b11" PhonePublisherId="00000000-0000-0000-0000-000000000000"/>

  <Properties>
    <DisplayName>HelloBlinky</DisplayName>
    <PublisherDisplayName>Contoso</PublisherDisplayName>
    <Logo>Assets\StoreLogo.png</Logo>
  </Properties>

  <!-- capabilities requested by the app -->
  <Capabilities>
    <Capability Name="internetClient" />
  </Capabilities>
</Package>
"#;

/// Manifest with an empty (but open/close) capabilities node.
pub const EMPTY_CAPABILITIES_MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Package xmlns="http://schemas.microsoft.com/appx/manifest/foundation/windows10" xmlns:iot="http://schemas.microsoft.com/appx/manifest/iot/windows10">
  <Identity Name="App" Publisher="CN=Contoso" Version="1.0.0.0" />
  <Capabilities>
  </Capabilities>
</Package>
"#;

/// Manifest that does not declare the iot prefix at all.
pub const NO_IOT_PREFIX_MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Package xmlns="http://schemas.microsoft.com/appx/manifest/foundation/windows10">
  <Capabilities/>
</Package>
"#;

/// Well-formed manifest without a capabilities node.
pub const NO_CAPABILITIES_MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Package xmlns="http://schemas.microsoft.com/appx/manifest/foundation/windows10">
  <Identity Name="App" Publisher="CN=Contoso" Version="1.0.0.0" />
</Package>
"#;

/// Create a content root containing `manifest` as AppxManifest.xml.
///
/// Returns (TempDir, manifest path) - keep the TempDir alive to prevent cleanup.
pub fn content_root_with(manifest: &str) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join(MANIFEST_FILE_NAME);
    std::fs::write(&path, manifest).unwrap();
    (temp_dir, path)
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

/// Child elements of Package/Capabilities, re-parsed from disk.
pub fn capability_elements(path: &Path) -> Vec<Element> {
    let doc = ManifestDocument::load(path).unwrap();
    let selection = doc
        .select(&capabilities_path())
        .unwrap()
        .expect("manifest has a Capabilities node");
    doc.element(&selection)
        .unwrap()
        .child_elements()
        .cloned()
        .collect()
}

/// Namespace URI of the last capability element, as resolved in the document.
pub fn last_capability_namespace(path: &Path) -> Option<String> {
    let doc = ManifestDocument::load(path).unwrap();
    let selection = doc.select(&capabilities_path()).unwrap().unwrap();
    let capabilities = doc.element(&selection).unwrap();
    capabilities.child_elements().last()?.namespace().map(str::to_string)
}

pub fn capabilities_path() -> ElementPath {
    ElementPath::parse("/std:Package/std:Capabilities", &NamespaceTable::manifest()).unwrap()
}

/// The bytes `after` gained over `before`, asserting everything else is unchanged.
///
/// Works for a single contiguous insertion.
pub fn inserted_span(before: &str, after: &str) -> String {
    let prefix = before
        .bytes()
        .zip(after.bytes())
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = before[prefix..]
        .bytes()
        .rev()
        .zip(after[prefix..].bytes().rev())
        .take_while(|(a, b)| a == b)
        .count();

    assert_eq!(
        prefix + suffix,
        before.len(),
        "pre-existing content was modified"
    );
    after[prefix..after.len() - suffix].to_string()
}
