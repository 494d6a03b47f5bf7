// src/datatype/compound.rs
use crate::datatype::Datatype;
use crate::error::{ModelError, Result};

/// A field of a compound datatype
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundMember {
    pub name: String,
    pub datatype: Datatype,
    /// Byte offset of the field within the record
    pub offset: u64,
}

/// Ordered fields of a compound datatype
///
/// Name, type and offset of a field are stored together, so the name, type
/// and offset sequences handed out by [`names`](Self::names),
/// [`types`](Self::types) and [`offsets`](Self::offsets) always have the
/// same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompoundMembers {
    members: Vec<CompoundMember>,
}

impl CompoundMembers {
    pub fn new() -> Self {
        CompoundMembers { members: Vec::new() }
    }

    /// Append a field
    pub fn push(&mut self, name: impl Into<String>, datatype: Datatype, offset: u64) {
        self.members.push(CompoundMember {
            name: name.into(),
            datatype,
            offset,
        });
    }

    /// Remove all fields
    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CompoundMember> {
        self.members.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompoundMember> {
        self.members.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.name.as_str())
    }

    pub fn types(&self) -> impl Iterator<Item = &Datatype> {
        self.members.iter().map(|m| &m.datatype)
    }

    pub fn offsets(&self) -> impl Iterator<Item = u64> + '_ {
        self.members.iter().map(|m| m.offset)
    }

    /// Look up a field by name
    pub fn find(&self, name: &str) -> Option<&CompoundMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// End of the furthest field
    ///
    /// `None` when there are no fields or any field size is native.
    pub fn record_size(&self) -> Result<Option<u64>> {
        let mut end = 0u64;
        for member in &self.members {
            let Some(size) = member.datatype.size().bytes() else {
                return Ok(None);
            };
            let field_end = member.offset.checked_add(size).ok_or(ModelError::InvalidDatatypeSpec {
                field: "compound member offset",
                value: i64::try_from(member.offset).unwrap_or(i64::MAX),
            })?;
            end = end.max(field_end);
        }
        Ok(if end == 0 { None } else { Some(end) })
    }
}

impl<'a> IntoIterator for &'a CompoundMembers {
    type Item = &'a CompoundMember;
    type IntoIter = std::slice::Iter<'a, CompoundMember>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}
