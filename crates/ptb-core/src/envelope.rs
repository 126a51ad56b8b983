//! Response envelope shared by every price tracker backend reply.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{errors::Error, Result};

/// Both fields are optional on the wire; `"error":{}` decodes to code 0 and an empty message.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub code: i64,
    pub message: String,
}

/// `{success, error?, data}` wrapper.
///
/// Only `success` decides the outcome. `error` is informational and may be
/// present on a successful reply; `data` is opaque and only rendered for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            error: None,
            data,
        }
    }

    pub fn failure(code: i64, message: impl Into<String>, data: Value) -> Self {
        Self {
            success: false,
            error: Some(ErrorBody {
                code,
                message: message.into(),
            }),
            data,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Decode `data` into a concrete type. Only JSON objects are accepted.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        if !self.data.is_object() {
            return Err(Error::Backend(
                "envelope data is not in the expected format".to_string(),
            ));
        }
        Ok(serde_json::from_value(self.data.clone())?)
    }

    /// Text rendering of `data` for chat output: strings verbatim, the rest as compact JSON.
    pub fn display_data(&self) -> String {
        match &self.data {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
