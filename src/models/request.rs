use serde::{Deserialize, Serialize};

use crate::models::address::DataAddress;

/// One source-to-destination transfer to be validated and executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFlowRequest {
    pub id: String,
    #[serde(default)]
    pub source_address: Option<DataAddress>,
    #[serde(default)]
    pub destination_address: Option<DataAddress>,
}

impl DataFlowRequest {
    /// Request with a fresh v4 id and no addresses
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_address: None,
            destination_address: None,
        }
    }

    pub fn source(mut self, address: DataAddress) -> Self {
        self.source_address = Some(address);
        self
    }

    pub fn destination(mut self, address: DataAddress) -> Self {
        self.destination_address = Some(address);
        self
    }
}

impl Default for DataFlowRequest {
    fn default() -> Self {
        Self::new()
    }
}
