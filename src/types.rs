// src/types.rs
use crate::error::{ModelError, Result};
use std::fmt;

/// Sentinel shared by size, order and sign meaning "library default, resolved lazily"
pub const NATIVE: i32 = -1;

/// Broad kind of value a datatype encodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum DatatypeClass {
    NoClass = -1,
    Integer = 0,
    Float = 1,
    Char = 2,
    String = 3,
    BitField = 4,
    Opaque = 5,
    Compound = 6,
    Reference = 7,
    Enum = 8,
    Vlen = 9,
    Array = 10,
    Time = 11,
    Complex = 12,
}

impl DatatypeClass {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(DatatypeClass::NoClass),
            0 => Some(DatatypeClass::Integer),
            1 => Some(DatatypeClass::Float),
            2 => Some(DatatypeClass::Char),
            3 => Some(DatatypeClass::String),
            4 => Some(DatatypeClass::BitField),
            5 => Some(DatatypeClass::Opaque),
            6 => Some(DatatypeClass::Compound),
            7 => Some(DatatypeClass::Reference),
            8 => Some(DatatypeClass::Enum),
            9 => Some(DatatypeClass::Vlen),
            10 => Some(DatatypeClass::Array),
            11 => Some(DatatypeClass::Time),
            12 => Some(DatatypeClass::Complex),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Get the name of the class as a string
    pub fn name(&self) -> &'static str {
        match self {
            DatatypeClass::NoClass => "no_class",
            DatatypeClass::Integer => "integer",
            DatatypeClass::Float => "float",
            DatatypeClass::Char => "char",
            DatatypeClass::String => "string",
            DatatypeClass::BitField => "bitfield",
            DatatypeClass::Opaque => "opaque",
            DatatypeClass::Compound => "compound",
            DatatypeClass::Reference => "reference",
            DatatypeClass::Enum => "enum",
            DatatypeClass::Vlen => "vlen",
            DatatypeClass::Array => "array",
            DatatypeClass::Time => "time",
            DatatypeClass::Complex => "complex",
        }
    }
}

/// Byte order of a datatype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ByteOrder {
    Native = -1,
    LittleEndian = 0,
    BigEndian = 1,
    Vax = 2,
    None = 3,
}

impl ByteOrder {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(ByteOrder::Native),
            0 => Some(ByteOrder::LittleEndian),
            1 => Some(ByteOrder::BigEndian),
            2 => Some(ByteOrder::Vax),
            3 => Some(ByteOrder::None),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Byte order of the machine this library runs on
    pub fn host() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        }
    }

    /// Replace `Native` with the host byte order
    pub fn resolve(&self) -> Self {
        match self {
            ByteOrder::Native => Self::host(),
            other => *other,
        }
    }
}

/// Sign representation of integer data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Sign {
    Native = -1,
    /// Unsigned
    None = 0,
    /// Two's complement
    TwosComplement = 1,
}

impl Sign {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Sign::Native),
            0 => Some(Sign::None),
            1 => Some(Sign::TwosComplement),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }
}

/// Size of one element in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSize {
    /// Platform/library default size, resolved by the backend
    Native,
    Bytes(u64),
}

impl TypeSize {
    /// Validate a raw size: `NATIVE` or strictly positive
    pub fn from_raw(size: i64) -> Result<Self> {
        match size {
            s if s == NATIVE as i64 => Ok(TypeSize::Native),
            s if s > 0 => Ok(TypeSize::Bytes(s as u64)),
            s => Err(ModelError::InvalidDatatypeSpec { field: "size", value: s }),
        }
    }

    pub fn raw(&self) -> i64 {
        match self {
            TypeSize::Native => NATIVE as i64,
            TypeSize::Bytes(n) => *n as i64,
        }
    }

    pub fn bytes(&self) -> Option<u64> {
        match self {
            TypeSize::Native => None,
            TypeSize::Bytes(n) => Some(*n),
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, TypeSize::Native)
    }
}

impl fmt::Display for TypeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSize::Native => write!(f, "native"),
            TypeSize::Bytes(n) => write!(f, "{}", n),
        }
    }
}
