// src/datatype/description.rs
use crate::datatype::Datatype;
use crate::types::{DatatypeClass, TypeSize};
use std::fmt::Write;

impl Datatype {
    /// Human-readable summary of this type, e.g. `"Array [3 x 4] of 32-bit integer"`
    ///
    /// Computed once and cached until the enum members are replaced.
    pub fn description(&self) -> &str {
        self.description.get_or_init(|| self.build_description())
    }

    fn build_description(&self) -> String {
        let mut description = String::new();
        let unsigned = if self.is_unsigned() { "unsigned " } else { "" };

        match self.class {
            DatatypeClass::Char => {
                let _ = write!(description, "8-bit {}integer", unsigned);
            }
            DatatypeClass::Integer => {
                let _ = write!(description, "{} {}integer", self.width_label(), unsigned);
            }
            DatatypeClass::Float => {
                let _ = write!(description, "{} floating-point", self.width_label());
            }
            DatatypeClass::String => description.push_str("String"),
            DatatypeClass::Reference => description.push_str("Object reference"),
            DatatypeClass::Opaque => {
                let _ = write!(description, "{} opaque", self.width_label());
            }
            DatatypeClass::BitField => {
                let _ = write!(description, "{} bitfield", self.width_label());
            }
            DatatypeClass::Enum => {
                let _ = write!(description, "{} enum", self.width_label());
            }
            DatatypeClass::Array => {
                description.push_str("Array");
                if let Some(dims) = &self.array_dims {
                    let dims: Vec<String> = dims.iter().map(u64::to_string).collect();
                    let _ = write!(description, " [{}]", dims.join(" x "));
                }
            }
            DatatypeClass::Compound => description.push_str("Compound"),
            DatatypeClass::Vlen => description.push_str("Variable-length"),
            DatatypeClass::Complex => {
                let _ = write!(description, "{} Complex", self.width_label());
            }
            DatatypeClass::Time | DatatypeClass::NoClass => description.push_str("Unknown"),
        }

        if let Some(base) = &self.base {
            description.push_str(" of ");
            description.push_str(base.description());
        }

        description
    }

    /// `"native"` or `"<bits>-bit"`
    fn width_label(&self) -> String {
        match self.size {
            TypeSize::Native => "native".to_string(),
            TypeSize::Bytes(n) => format!("{}-bit", u128::from(n) * 8),
        }
    }
}
