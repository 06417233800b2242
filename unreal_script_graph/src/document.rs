//! Typed views of asset dump entries

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, ScriptError};

/// A `Type == "Function"` entry of an asset dump
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionEntry {
    /// Function name
    #[serde(rename = "Name")]
    pub name: String,
    /// Ordered statement documents
    #[serde(rename = "ScriptBytecode")]
    pub bytecode: Vec<Value>,
}

impl FunctionEntry {
    /// Decode a function entry from a top-level dump entry
    pub fn from_entry(entry: &Value) -> Result<Self, Error> {
        serde_json::from_value(entry.clone())
            .map_err(|e| ScriptError::invalid_function(format!("Malformed function entry: {e}")).into())
    }
}
