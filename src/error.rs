// src/error.rs
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid datatype {field} - {value}")]
    InvalidDatatypeSpec { field: &'static str, value: i64 },

    #[error("Malformed enum member entry: '{0}'")]
    MalformedEnumEntry(String),

    #[error("Duplicate enum value: '{0}'")]
    DuplicateEnumValue(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Invalid native handle: {0}")]
    InvalidHandle(i64),

    #[error("Unexpected end of datatype message: need {expected} bytes, have {available}")]
    UnexpectedEof { expected: usize, available: usize },

    #[error("Invalid datatype class: {0}")]
    InvalidDatatypeClass(u8),

    #[error("Invalid version {version} for datatype class {class}")]
    InvalidDatatypeVersion { class: u8, version: u8 },

    #[error("Invalid string padding: {0}")]
    InvalidStringPadding(u8),

    #[error("Invalid character set: {0}")]
    InvalidCharacterSet(u8),

    #[error("Datatype nesting deeper than {0} levels")]
    NestingTooDeep(usize),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Frame number must be between {min} and {max}")]
    FrameOutOfRange { min: i64, max: i64 },

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
