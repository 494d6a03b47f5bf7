// src/datatype/enum_members.rs
use crate::datatype::Datatype;
use crate::error::{ModelError, Result};
use std::collections::HashMap;
use tracing::trace;

/// Symbol table of an enumeration: value token to member name
///
/// Iteration order is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumMembers {
    members: HashMap<String, String>,
}

impl EnumMembers {
    pub fn new() -> Self {
        EnumMembers { members: HashMap::new() }
    }

    /// Parse a `value=name, value=name, ...` list
    ///
    /// Every entry must split on `=` into exactly two tokens; both are
    /// trimmed. A repeated value is rejected. A blank string yields an empty
    /// table.
    ///
    /// # Example
    ///
    /// ```
    /// use hdfview_model::datatype::EnumMembers;
    ///
    /// let members = EnumMembers::parse("0=R, 1=G, 2=B").unwrap();
    /// assert_eq!(members.name_of("1"), Some("G"));
    /// assert!(EnumMembers::parse("0=R, 1").is_err());
    /// ```
    pub fn parse(spec: &str) -> Result<Self> {
        let mut members = HashMap::new();
        if spec.trim().is_empty() {
            return Ok(EnumMembers { members });
        }

        for entry in spec.split(',') {
            let tokens: Vec<&str> = entry.split('=').collect();
            let [value, name] = tokens.as_slice() else {
                return Err(ModelError::MalformedEnumEntry(entry.trim().to_string()));
            };
            let (value, name) = (value.trim(), name.trim());
            if value.is_empty() || name.is_empty() {
                return Err(ModelError::MalformedEnumEntry(entry.trim().to_string()));
            }
            if members.insert(value.to_string(), name.to_string()).is_some() {
                return Err(ModelError::DuplicateEnumValue(value.to_string()));
            }
            trace!(value, name, "enum member parsed");
        }

        Ok(EnumMembers { members })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member name for a value token
    pub fn name_of(&self, value: &str) -> Option<&str> {
        self.members.get(value).map(String::as_str)
    }

    /// `(value, name)` pairs in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.members.iter().map(|(v, n)| (v.as_str(), n.as_str()))
    }

    pub(crate) fn insert(&mut self, value: impl Into<String>, name: impl Into<String>) {
        self.members.insert(value.into(), name.into());
    }
}

impl Datatype {
    /// Replace the enumeration symbol table from a `value=name, ...` list
    ///
    /// The whole list is parsed before anything is committed, so a malformed
    /// list leaves the current members untouched.
    pub fn set_enum_members(&mut self, spec: &str) -> Result<()> {
        trace!(spec, "set_enum_members");
        let members = EnumMembers::parse(spec)?;
        trace!(count = members.len(), "set_enum_members: finished");
        self.enum_members = members;
        self.description.take();
        Ok(())
    }

    pub(crate) fn replace_enum_members(&mut self, members: EnumMembers) {
        self.enum_members = members;
        self.description.take();
    }

    pub fn enum_members(&self) -> &EnumMembers {
        &self.enum_members
    }

    /// Symbol table as `value=name` pairs joined by `", "`
    pub fn enum_members_as_string(&self) -> String {
        self.enum_members
            .iter()
            .map(|(value, name)| format!("{}={}", value, name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Member name for a value token, if this type has one
    pub fn enum_label(&self, value: &str) -> Option<&str> {
        self.enum_members.name_of(value.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ByteOrder, DatatypeClass, Sign};
    use std::collections::HashSet;

    fn pairs(s: &str) -> HashSet<(String, String)> {
        s.split(',')
            .map(|entry| {
                let mut kv = entry.split('=');
                (
                    kv.next().unwrap().trim().to_string(),
                    kv.next().unwrap().trim().to_string(),
                )
            })
            .collect()
    }

    fn base() -> Datatype {
        Datatype::new(DatatypeClass::Integer, 1, ByteOrder::LittleEndian, Sign::None, None).unwrap()
    }

    #[test]
    fn test_parse_trims_tokens() {
        let members = EnumMembers::parse("  0 = RED ,1=GREEN").unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members.name_of("0"), Some("RED"));
        assert_eq!(members.name_of("1"), Some("GREEN"));
    }

    #[test]
    fn test_parse_rejects_wrong_token_count() {
        assert!(matches!(
            EnumMembers::parse("0=A, 1"),
            Err(ModelError::MalformedEnumEntry(e)) if e == "1"
        ));
        assert!(EnumMembers::parse("0=A=B").is_err());
        assert!(EnumMembers::parse("0=A,").is_err());
    }

    #[test]
    fn test_parse_rejects_duplicates() {
        assert!(matches!(
            EnumMembers::parse("0=A, 0=B"),
            Err(ModelError::DuplicateEnumValue(v)) if v == "0"
        ));
    }

    #[test]
    fn test_roundtrip_as_set() {
        let mut dt = Datatype::enumeration(base(), "").unwrap();
        dt.set_enum_members("0=R, 1=G, 2=B").unwrap();
        let expected: HashSet<(String, String)> = [("0", "R"), ("1", "G"), ("2", "B")]
            .iter()
            .map(|(v, n)| (v.to_string(), n.to_string()))
            .collect();
        assert_eq!(pairs(&dt.enum_members_as_string()), expected);
    }

    #[test]
    fn test_failed_parse_keeps_previous_members() {
        let mut dt = Datatype::enumeration(base(), "0=ON, 1=OFF").unwrap();
        assert!(dt.set_enum_members("0=ON, broken").is_err());
        assert_eq!(dt.enum_members().len(), 2);
        assert_eq!(dt.enum_label("1"), Some("OFF"));
    }

    #[test]
    fn test_reset_replaces_members() {
        let mut dt = Datatype::enumeration(base(), "0=ON, 1=OFF").unwrap();
        dt.set_enum_members("5=MAYBE").unwrap();
        assert_eq!(dt.enum_members_as_string(), "5=MAYBE");
        assert_eq!(dt.enum_label("0"), None);
    }

    #[test]
    fn test_empty_members_string() {
        let dt = Datatype::enumeration(base(), "").unwrap();
        assert_eq!(dt.enum_members_as_string(), "");
    }
}
