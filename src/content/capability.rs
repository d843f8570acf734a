// src/content/capability.rs
//! Capability declarations in `AppxManifest.xml`
//!
//! [`CapabilityAddition`] appends one capability element to
//! `Package/Capabilities`:
//!
//! ```xml
//! <Capabilities>
//!   <iot:Capability Name="lowLevelDevices">
//!     <Device Id="D1">
//!       <Function Type="voiceCommand"/>
//!     </Device>
//!   </iot:Capability>
//! </Capabilities>
//! ```
//!
//! The element is always appended, never merged: applying the same addition
//! twice declares the capability twice.

use crate::content::ContentChange;
use crate::error::{ContentError, Result};
use crate::manifest::{ElementPath, ManifestDocument, NewElement, manifest_path};
use crate::namespace::{NamespaceTable, check_local_name};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Element name used when no explicit capability element is given
pub const DEFAULT_CAPABILITY_ELEMENT: &str = "Capability";

/// Where capability elements live, in [`NamespaceTable::manifest`] prefixes
pub const CAPABILITIES_PATH: &str = "/std:Package/std:Capabilities";

/// Adds a capability declaration to the package manifest
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilityAddition {
    /// Local element name, `Capability` when unset
    #[serde(default, rename = "element")]
    capability: Option<String>,

    /// Registered namespace prefix qualifying the element
    #[serde(default, rename = "namespace")]
    capability_namespace: Option<String>,

    /// Value of the `Name` attribute
    #[serde(rename = "name")]
    capability_name: String,

    #[serde(default)]
    device_id: Option<String>,

    /// Only used together with `device_id`
    #[serde(default)]
    function_type: Option<String>,
}

impl CapabilityAddition {
    /// A plain `<Capability Name="..."/>` in the manifest's default namespace
    pub fn new(capability_name: impl Into<String>) -> Self {
        Self {
            capability: None,
            capability_namespace: None,
            capability_name: capability_name.into(),
            device_id: None,
            function_type: None,
        }
    }

    pub fn builder(capability_name: impl Into<String>) -> CapabilityAdditionBuilder {
        CapabilityAdditionBuilder {
            inner: Self::new(capability_name),
        }
    }

    pub fn capability(&self) -> Option<&str> {
        self.capability.as_deref()
    }

    pub fn capability_namespace(&self) -> Option<&str> {
        self.capability_namespace.as_deref()
    }

    pub fn capability_name(&self) -> &str {
        &self.capability_name
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    pub fn function_type(&self) -> Option<&str> {
        self.function_type.as_deref()
    }

    fn local_name(&self) -> &str {
        self.capability
            .as_deref()
            .unwrap_or(DEFAULT_CAPABILITY_ELEMENT)
    }

    /// Qualified element name as it will be written
    pub fn element_name(&self) -> String {
        let local = self.local_name();
        match &self.capability_namespace {
            Some(prefix) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        }
    }

    /// Namespace URI of the explicit prefix, `None` when no prefix is set
    ///
    /// Unregistered prefixes are rejected rather than falling back to the
    /// document namespace.
    pub fn resolve_namespace(&self, table: &NamespaceTable) -> Result<Option<&'static str>> {
        self.capability_namespace
            .as_deref()
            .map(|prefix| table.require(prefix))
            .transpose()
    }

    /// Check the configuration without touching any file
    ///
    /// The element name must be a plain local name; qualification only
    /// comes from the namespace prefix.
    pub fn validate(&self) -> Result<()> {
        check_local_name(self.local_name())?;
        self.resolve_namespace(&NamespaceTable::manifest())?;
        Ok(())
    }

    /// The element tree to insert
    ///
    /// `namespace` is the capability element's namespace; `Device` and
    /// `Function` always go into `root_namespace`.
    pub fn build_element(&self, namespace: &str, root_namespace: &str) -> NewElement {
        let mut capability = NewElement::new(self.element_name(), namespace);
        capability.push_attribute("Name", self.capability_name.as_str());

        if let Some(device_id) = &self.device_id {
            let mut device = NewElement::new("Device", root_namespace);
            device.push_attribute("Id", device_id.as_str());

            if let Some(function_type) = &self.function_type {
                let mut function = NewElement::new("Function", root_namespace);
                function.push_attribute("Type", function_type.as_str());
                device.push_child(function);
            }

            capability.push_child(device);
        }

        capability
    }
}

impl ContentChange for CapabilityAddition {
    fn name(&self) -> &str {
        "CapabilityAddition"
    }

    fn describe(&self) -> String {
        let mut desc = format!(
            "capability <{} Name=\"{}\">",
            self.element_name(),
            self.capability_name
        );
        if let Some(device_id) = &self.device_id {
            desc.push_str(&format!(" device {}", device_id));
            if let Some(function_type) = &self.function_type {
                desc.push_str(&format!(" function {}", function_type));
            }
        }
        desc
    }

    fn apply_to_content(&self, root_folder: &Path) -> Result<bool> {
        let manifest = manifest_path(root_folder);
        if !manifest.is_file() {
            debug!("No manifest at {}, skipping {}", manifest.display(), self.name());
            return Ok(false);
        }

        check_local_name(self.local_name())?;
        let table = NamespaceTable::manifest();
        let explicit_namespace = self.resolve_namespace(&table)?;

        let mut document = ManifestDocument::load(&manifest)?;
        let path = ElementPath::parse(CAPABILITIES_PATH, &table)?;
        let selection = document
            .select(&path)?
            .ok_or_else(|| ContentError::MissingNode {
                path: CAPABILITIES_PATH.to_string(),
                manifest: manifest.clone(),
            })?;

        let root_namespace = document.root_namespace().unwrap_or_default().to_string();
        let namespace = explicit_namespace.unwrap_or(root_namespace.as_str());
        let element = self.build_element(namespace, &root_namespace);

        document.append_child(&selection, element)?;
        document.save(&manifest)?;

        info!("Added {} to {}", self.describe(), manifest.display());
        Ok(true)
    }
}

/// Builder for [`CapabilityAddition`]
#[derive(Debug, Clone)]
pub struct CapabilityAdditionBuilder {
    inner: CapabilityAddition,
}

impl CapabilityAdditionBuilder {
    /// Local element name (`Capability`, `DeviceCapability`, ...)
    pub fn capability(mut self, element: impl Into<String>) -> Self {
        self.inner.capability = Some(element.into());
        self
    }

    /// Registered namespace prefix (`iot`, `uap`, ...)
    pub fn namespace(mut self, prefix: impl Into<String>) -> Self {
        self.inner.capability_namespace = Some(prefix.into());
        self
    }

    pub fn device_id(mut self, id: impl Into<String>) -> Self {
        self.inner.device_id = Some(id.into());
        self
    }

    pub fn function_type(mut self, function_type: impl Into<String>) -> Self {
        self.inner.function_type = Some(function_type.into());
        self
    }

    pub fn build(self) -> CapabilityAddition {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{FOUNDATION_NS, IOT_NS, UAP_NS};

    #[test]
    fn test_element_name_resolution() {
        assert_eq!(CapabilityAddition::new("x").element_name(), "Capability");
        assert_eq!(
            CapabilityAddition::builder("x").namespace("iot").build().element_name(),
            "iot:Capability"
        );
        assert_eq!(
            CapabilityAddition::builder("x")
                .capability("DeviceCapability")
                .build()
                .element_name(),
            "DeviceCapability"
        );
        assert_eq!(
            CapabilityAddition::builder("x")
                .capability("Capability")
                .namespace("uap")
                .build()
                .element_name(),
            "uap:Capability"
        );
    }

    #[test]
    fn test_resolve_namespace() {
        let table = NamespaceTable::manifest();
        assert_eq!(CapabilityAddition::new("x").resolve_namespace(&table).unwrap(), None);
        assert_eq!(
            CapabilityAddition::builder("x")
                .namespace("uap")
                .build()
                .resolve_namespace(&table)
                .unwrap(),
            Some(UAP_NS)
        );

        let unknown = CapabilityAddition::builder("x").namespace("rescap").build();
        assert!(matches!(
            unknown.validate(),
            Err(ContentError::UnknownNamespacePrefix(p)) if p == "rescap"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_element_names() {
        let prefixed = CapabilityAddition::builder("x")
            .capability("uap:Foo")
            .namespace("iot")
            .build();
        assert!(matches!(
            prefixed.validate(),
            Err(ContentError::InvalidElementName(n)) if n == "uap:Foo"
        ));

        let spaced = CapabilityAddition::builder("x").capability("Bad Name").build();
        assert!(matches!(spaced.validate(), Err(ContentError::InvalidElementName(_))));

        let empty = CapabilityAddition::builder("x").capability("").build();
        assert!(matches!(empty.validate(), Err(ContentError::InvalidElementName(_))));

        assert!(CapabilityAddition::new("x").validate().is_ok());
    }

    #[test]
    fn test_build_element_with_device_and_function() {
        let addition = CapabilityAddition::builder("lowLevelDevices")
            .namespace("iot")
            .device_id("D1")
            .function_type("voiceCommand")
            .build();
        let element = addition.build_element(IOT_NS, FOUNDATION_NS);

        assert_eq!(element.qname(), "iot:Capability");
        assert_eq!(element.namespace(), IOT_NS);
        assert_eq!(
            element.attributes(),
            &[("Name".to_string(), "lowLevelDevices".to_string())]
        );

        let device = &element.children()[0];
        assert_eq!(device.qname(), "Device");
        assert_eq!(device.namespace(), FOUNDATION_NS);
        assert_eq!(device.attributes(), &[("Id".to_string(), "D1".to_string())]);

        let function = &device.children()[0];
        assert_eq!(function.qname(), "Function");
        assert_eq!(
            function.attributes(),
            &[("Type".to_string(), "voiceCommand".to_string())]
        );
    }

    #[test]
    fn test_function_type_without_device_is_ignored() {
        let addition = CapabilityAddition::builder("x").function_type("voiceCommand").build();
        let element = addition.build_element(FOUNDATION_NS, FOUNDATION_NS);
        assert!(element.children().is_empty());
    }

    #[test]
    fn test_device_without_function() {
        let addition = CapabilityAddition::builder("x").device_id("D1").build();
        let element = addition.build_element(FOUNDATION_NS, FOUNDATION_NS);
        assert_eq!(element.children().len(), 1);
        assert!(element.children()[0].children().is_empty());
    }

    #[test]
    fn test_describe() {
        let addition = CapabilityAddition::builder("systemManagement")
            .namespace("iot")
            .build();
        assert_eq!(
            addition.describe(),
            "capability <iot:Capability Name=\"systemManagement\">"
        );
    }

    #[test]
    fn test_missing_manifest_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        let addition = CapabilityAddition::new("internetClient");
        assert!(!addition.apply_to_content(dir.path()).unwrap());
        assert!(!dir.path().join("AppxManifest.xml").exists());
    }
}
