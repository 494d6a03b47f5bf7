// src/config.rs
//! Viewer options
//!
//! Options are plain serde data and load from JSON:
//!
//! ```
//! use hdfview_model::config::{IndexBase, NumberFormat, ViewOptions};
//!
//! let options = ViewOptions::from_json_str(r#"{ "index_base": 1, "number_format": "hexadecimal" }"#).unwrap();
//! assert_eq!(options.index_base, IndexBase::One);
//! assert_eq!(options.number_format, NumberFormat::Hexadecimal);
//! assert!(options.convert_enum);
//! ```

use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Whether displayed indices count from 0 or 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum IndexBase {
    #[default]
    Zero,
    One,
}

impl IndexBase {
    pub fn value(&self) -> i64 {
        match self {
            IndexBase::Zero => 0,
            IndexBase::One => 1,
        }
    }
}

impl TryFrom<u8> for IndexBase {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(IndexBase::Zero),
            1 => Ok(IndexBase::One),
            other => Err(format!("index base must be 0 or 1, got {}", other)),
        }
    }
}

impl From<IndexBase> for u8 {
    fn from(base: IndexBase) -> u8 {
        base.value() as u8
    }
}

/// Radix used for numeric cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    #[default]
    Decimal,
    Hexadecimal,
    Binary,
    /// Exponent notation; only floating-point values use it
    Scientific,
}

/// Display options of a data view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewOptions {
    pub index_base: IndexBase,

    /// Show enum member names instead of raw values
    pub convert_enum: bool,

    /// Show the data a region reference points at instead of the reference
    pub show_reg_ref_values: bool,

    /// Show 1-byte integers as characters
    pub display_char_as_text: bool,

    pub number_format: NumberFormat,
}

impl Default for ViewOptions {
    fn default() -> Self {
        ViewOptions {
            index_base: IndexBase::Zero,
            convert_enum: true,
            show_reg_ref_values: false,
            display_char_as_text: false,
            number_format: NumberFormat::Decimal,
        }
    }
}

impl ViewOptions {
    /// Load options from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Parse options from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(ModelError::from)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(ModelError::from)
    }
}
