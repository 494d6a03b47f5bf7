// src/metadata.rs
use crate::error::Result;

/// Name/value attribute attached to a file object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Objects that may carry attributes
///
/// Implementations that cannot persist attributes report
/// [`ModelError::Unsupported`](crate::error::ModelError::Unsupported) from
/// the mutating calls.
pub trait MetadataContainer {
    fn metadata(&self) -> Result<Vec<Attribute>>;

    fn write_metadata(&mut self, attribute: &Attribute) -> Result<()>;

    fn remove_metadata(&mut self, attribute: &Attribute) -> Result<()>;

    fn update_metadata(&mut self, attribute: &Attribute) -> Result<()>;

    /// Drop any cached attributes
    fn clear(&mut self);
}
