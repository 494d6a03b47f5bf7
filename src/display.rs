// src/display.rs
//! Choosing how the cells of a data view are rendered

use crate::config::{NumberFormat, ViewOptions};
use crate::datatype::Datatype;
use crate::types::DatatypeClass;
use std::fmt;

/// Size of an HDF5 dataset region reference
const REGION_REFERENCE_SIZE: u64 = 12;

/// Rendering of one cell value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueFormat {
    Decimal,
    Hexadecimal,
    Binary,
    Scientific,
    /// Enum member names
    EnumLabel,
    Text,
    /// Object reference shown as an object identifier
    Reference,
    /// Values selected by a region reference
    RegionData,
    /// Each field uses the format of its own type
    Compound,
}

impl ValueFormat {
    /// Pick the rendering of values of `datatype` under `options`
    pub fn for_datatype(datatype: &Datatype, options: &ViewOptions) -> Self {
        match datatype.class() {
            DatatypeClass::String => ValueFormat::Text,
            DatatypeClass::Char if options.display_char_as_text => ValueFormat::Text,
            DatatypeClass::Integer
                if options.display_char_as_text && datatype.size().bytes() == Some(1) =>
            {
                ValueFormat::Text
            }
            DatatypeClass::Char | DatatypeClass::Integer => Self::integer(options.number_format),
            DatatypeClass::Float | DatatypeClass::Time => match options.number_format {
                NumberFormat::Scientific if datatype.is_float() => ValueFormat::Scientific,
                _ => ValueFormat::Decimal,
            },
            DatatypeClass::Enum if options.convert_enum => ValueFormat::EnumLabel,
            DatatypeClass::Enum => Self::integer(options.number_format),
            DatatypeClass::Opaque | DatatypeClass::BitField => match options.number_format {
                NumberFormat::Binary => ValueFormat::Binary,
                _ => ValueFormat::Hexadecimal,
            },
            DatatypeClass::Reference => {
                if options.show_reg_ref_values && datatype.size().bytes() == Some(REGION_REFERENCE_SIZE) {
                    ValueFormat::RegionData
                } else {
                    ValueFormat::Reference
                }
            }
            DatatypeClass::Compound => ValueFormat::Compound,
            DatatypeClass::Array | DatatypeClass::Vlen | DatatypeClass::Complex => match datatype.base() {
                Some(base) => Self::for_datatype(base, options),
                None => ValueFormat::Decimal,
            },
            DatatypeClass::NoClass => ValueFormat::Decimal,
        }
    }

    fn integer(number_format: NumberFormat) -> Self {
        match number_format {
            NumberFormat::Hexadecimal => ValueFormat::Hexadecimal,
            NumberFormat::Binary => ValueFormat::Binary,
            NumberFormat::Decimal | NumberFormat::Scientific => ValueFormat::Decimal,
        }
    }

    /// Render an integer stored in `size` bytes
    ///
    /// Hexadecimal and binary show the two's complement bit pattern padded to
    /// the full width.
    pub fn format_integer(&self, value: i64, size: usize) -> String {
        let size = size.clamp(1, 8);
        let bits = (value as u64) & mask(size);
        match self {
            ValueFormat::Hexadecimal => format!("{:0width$X}", bits, width = size * 2),
            ValueFormat::Binary => format!("{:0width$b}", bits, width = size * 8),
            _ => value.to_string(),
        }
    }

    pub fn format_float(&self, value: f64) -> String {
        match self {
            ValueFormat::Scientific => format!("{:e}", value),
            _ => value.to_string(),
        }
    }

    /// Render a raw enum value, by member name when this format asks for it
    pub fn format_enum(&self, datatype: &Datatype, value: &str) -> String {
        match self {
            ValueFormat::EnumLabel => datatype.enum_label(value).unwrap_or(value).to_string(),
            _ => value.to_string(),
        }
    }
}

fn mask(size: usize) -> u64 {
    if size >= 8 {
        u64::MAX
    } else {
        (1u64 << (size * 8)) - 1
    }
}

impl fmt::Display for ValueFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueFormat::Decimal => "decimal",
            ValueFormat::Hexadecimal => "hexadecimal",
            ValueFormat::Binary => "binary",
            ValueFormat::Scientific => "scientific",
            ValueFormat::EnumLabel => "enum label",
            ValueFormat::Text => "text",
            ValueFormat::Reference => "reference",
            ValueFormat::RegionData => "region data",
            ValueFormat::Compound => "compound",
        };
        f.write_str(name)
    }
}
