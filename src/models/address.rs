use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Address type served by both source and sink
pub const DICOM_WEB_DATA: &str = "DicomWebData";
/// Store-only address type, accepted by the sink factory
pub const DICOM_WEB_DATA_PUSH: &str = "DicomWebData-PUSH";

pub const URL: &str = "url";
pub const USERNAME: &str = "username";
pub const PASSWORD: &str = "password";
pub const NAME: &str = "name";

/// Logical part name used when the address carries no `name`
pub const DEFAULT_SOURCE_NAME: &str = "DicomWebDataSource";

/// Typed property map describing one end of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataAddress {
    #[serde(rename = "type")]
    pub address_type: String,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl DataAddress {
    pub fn new(address_type: impl Into<String>) -> Self {
        Self {
            address_type: address_type.into(),
            properties: HashMap::new(),
        }
    }

    /// Builder-style property setter
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn address_type(&self) -> &str {
        &self.address_type
    }

    pub fn string_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn string_property_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.string_property(key).unwrap_or(default)
    }

    /// Shorthand for a DICOMweb address carrying endpoint credentials
    pub fn dicom_web(
        address_type: &str,
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::new(address_type)
            .with_property(URL, url)
            .with_property(USERNAME, username)
            .with_property(PASSWORD, password)
    }
}
