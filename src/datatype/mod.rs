// src/datatype/mod.rs
//! The datatype model
//!
//! A [`Datatype`] describes how the raw bytes of a dataset element map to a
//! semantic value: its class, size, byte order and sign, plus the nested
//! types of composite classes. Composite types own their children, so a
//! datatype is always a finite tree.
//!
//! # Example
//!
//! ```
//! use hdfview_model::datatype::Datatype;
//! use hdfview_model::types::{ByteOrder, DatatypeClass, Sign};
//!
//! let int32 = Datatype::new(
//!     DatatypeClass::Integer,
//!     4,
//!     ByteOrder::LittleEndian,
//!     Sign::TwosComplement,
//!     None,
//! ).unwrap();
//! let array = Datatype::array(int32, &[3, 4]).unwrap();
//!
//! assert_eq!(array.description(), "Array [3 x 4] of 32-bit integer");
//! assert!(!array.is_unsigned());
//! ```

mod compound;
mod description;
mod enum_members;

pub use compound::{CompoundMember, CompoundMembers};
pub use enum_members::EnumMembers;

use crate::error::{ModelError, Result};
use crate::metadata::{Attribute, MetadataContainer};
use crate::types::{ByteOrder, DatatypeClass, Sign, TypeSize};
use smallvec::SmallVec;
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// Array dimensions; arrays of rank 4 or less stay inline
pub type ArrayDims = SmallVec<[u64; 4]>;

/// Description of the binary encoding and semantic class of a value
#[derive(Debug, Clone)]
pub struct Datatype {
    class: DatatypeClass,
    size: TypeSize,
    order: ByteOrder,
    sign: Sign,
    base: Option<Box<Datatype>>,
    array_dims: Option<ArrayDims>,
    is_variable_str: bool,
    is_vlen: bool,
    /// Set when the type has been committed to a file under a name
    name: Option<String>,
    enum_members: EnumMembers,
    compound_members: CompoundMembers,
    description: OnceLock<String>,
}

impl Datatype {
    /// Create a datatype from typed parameters
    ///
    /// `size` is a byte count or [`NATIVE`](crate::types::NATIVE); zero and
    /// any other negative value are rejected.
    pub fn new(
        class: DatatypeClass,
        size: i64,
        order: ByteOrder,
        sign: Sign,
        base: Option<Datatype>,
    ) -> Result<Self> {
        let size = TypeSize::from_raw(size)?;
        Ok(Self::from_parts(class, size, order, sign, base))
    }

    /// Create a datatype from raw integer codes, validating every field
    pub fn from_codes(
        class: i32,
        size: i64,
        order: i32,
        sign: i32,
        base: Option<Datatype>,
    ) -> Result<Self> {
        let size = TypeSize::from_raw(size)?;
        let order = ByteOrder::from_code(order).ok_or(ModelError::InvalidDatatypeSpec {
            field: "order",
            value: order as i64,
        })?;
        let sign = Sign::from_code(sign).ok_or(ModelError::InvalidDatatypeSpec {
            field: "sign",
            value: sign as i64,
        })?;
        let class = DatatypeClass::from_code(class).ok_or(ModelError::InvalidDatatypeSpec {
            field: "class",
            value: class as i64,
        })?;
        Ok(Self::from_parts(class, size, order, sign, base))
    }

    pub(crate) fn from_parts(
        class: DatatypeClass,
        size: TypeSize,
        order: ByteOrder,
        sign: Sign,
        base: Option<Datatype>,
    ) -> Self {
        let is_variable_str = class == DatatypeClass::String && size.is_native();
        let is_vlen = class == DatatypeClass::Vlen || is_variable_str;

        trace!(
            class = class.name(),
            size = %size,
            order = ?order,
            sign = ?sign,
            has_base = base.is_some(),
            "datatype created"
        );

        Datatype {
            class,
            size,
            order,
            sign,
            base: base.map(Box::new),
            array_dims: None,
            is_variable_str,
            is_vlen,
            name: None,
            enum_members: EnumMembers::new(),
            compound_members: CompoundMembers::new(),
            description: OnceLock::new(),
        }
    }

    /// Array of `base` with the given extents
    ///
    /// The size is the element size times the element count when the element
    /// size is known.
    pub fn array(base: Datatype, dims: &[u64]) -> Result<Self> {
        if dims.is_empty() {
            return Err(ModelError::InvalidDatatypeSpec { field: "array rank", value: 0 });
        }
        if let Some(&bad) = dims.iter().find(|&&d| d == 0) {
            return Err(ModelError::InvalidDatatypeSpec {
                field: "array dimension",
                value: bad as i64,
            });
        }

        let size = match base.size {
            TypeSize::Bytes(n) => {
                let total = element_count(dims)?.checked_mul(n).ok_or(ModelError::InvalidDatatypeSpec {
                    field: "array size",
                    value: i64::try_from(n).unwrap_or(i64::MAX),
                })?;
                TypeSize::Bytes(total)
            }
            TypeSize::Native => TypeSize::Native,
        };
        let order = base.order;
        let mut array = Self::from_parts(DatatypeClass::Array, size, order, Sign::Native, Some(base));
        array.array_dims = Some(dims.iter().copied().collect());
        Ok(array)
    }

    /// Compound record built from `(name, type, offset)` fields
    ///
    /// A `NATIVE` size resolves to the end of the furthest field when every
    /// field size is known.
    pub fn compound<I, S>(size: i64, members: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Datatype, u64)>,
        S: Into<String>,
    {
        let mut compound_members = CompoundMembers::new();
        for (name, datatype, offset) in members {
            compound_members.push(name, datatype, offset);
        }

        let size = match TypeSize::from_raw(size)? {
            TypeSize::Native => compound_members
                .record_size()?
                .map(TypeSize::Bytes)
                .unwrap_or(TypeSize::Native),
            fixed => fixed,
        };

        let mut compound =
            Self::from_parts(DatatypeClass::Compound, size, ByteOrder::None, Sign::Native, None);
        compound.compound_members = compound_members;
        Ok(compound)
    }

    /// Enumeration over an integer base type
    ///
    /// Size, order and sign are inherited from `base`; `spec` uses the
    /// `value=name, ...` grammar of [`Datatype::set_enum_members`].
    pub fn enumeration(base: Datatype, spec: &str) -> Result<Self> {
        if !matches!(base.class, DatatypeClass::Integer | DatatypeClass::Char) {
            return Err(ModelError::InvalidDatatypeSpec {
                field: "enum base class",
                value: base.class.code() as i64,
            });
        }
        let (size, order, sign) = (base.size, base.order, base.sign);
        let mut enumeration = Self::from_parts(DatatypeClass::Enum, size, order, sign, Some(base));
        enumeration.set_enum_members(spec)?;
        Ok(enumeration)
    }

    /// Variable-length sequence of `base`
    pub fn vlen(base: Datatype) -> Self {
        Self::from_parts(DatatypeClass::Vlen, TypeSize::Native, ByteOrder::None, Sign::Native, Some(base))
    }

    /// Variable-length string
    pub fn variable_string() -> Self {
        Self::from_parts(DatatypeClass::String, TypeSize::Native, ByteOrder::None, Sign::None, None)
    }

    /// Complex number whose real and imaginary parts are `base`
    pub fn complex(base: Datatype) -> Result<Self> {
        if base.class != DatatypeClass::Float {
            return Err(ModelError::InvalidDatatypeSpec {
                field: "complex base class",
                value: base.class.code() as i64,
            });
        }
        let size = match base.size {
            TypeSize::Bytes(n) => TypeSize::Bytes(n.checked_mul(2).ok_or(ModelError::InvalidDatatypeSpec {
                field: "complex part size",
                value: i64::try_from(n).unwrap_or(i64::MAX),
            })?),
            TypeSize::Native => TypeSize::Native,
        };
        let order = base.order;
        Ok(Self::from_parts(DatatypeClass::Complex, size, order, Sign::Native, Some(base)))
    }

    pub(crate) fn into_named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn class(&self) -> DatatypeClass {
        self.class
    }

    pub fn size(&self) -> TypeSize {
        self.size
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    /// Element type of ARRAY/VLEN/COMPLEX, underlying integer of ENUM
    pub fn base(&self) -> Option<&Datatype> {
        self.base.as_deref()
    }

    /// Extents of an ARRAY type
    pub fn array_dims(&self) -> Option<&[u64]> {
        self.array_dims.as_deref()
    }

    /// Name under which the type was committed, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn compound_members(&self) -> &CompoundMembers {
        &self.compound_members
    }

    /// Whether every integer reachable from this type is unsigned
    ///
    /// Wrapper types delegate to their base type; a compound is unsigned when
    /// all of its fields are, and an empty compound is not.
    pub fn is_unsigned(&self) -> bool {
        if let Some(base) = &self.base {
            return base.is_unsigned();
        }

        if self.is_compound() {
            if self.compound_members.is_empty() {
                debug!("is_unsigned: compound has no members");
                return false;
            }
            return self.compound_members.types().all(Datatype::is_unsigned);
        }

        self.sign == Sign::None
    }

    pub fn is_integer(&self) -> bool {
        self.class == DatatypeClass::Integer
    }

    pub fn is_float(&self) -> bool {
        self.class == DatatypeClass::Float
    }

    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }

    pub fn is_variable_str(&self) -> bool {
        self.is_variable_str
    }

    pub fn is_vlen(&self) -> bool {
        self.is_vlen
    }

    pub fn is_compound(&self) -> bool {
        self.class == DatatypeClass::Compound
    }

    pub fn is_array(&self) -> bool {
        self.class == DatatypeClass::Array
    }

    pub fn is_string(&self) -> bool {
        self.class == DatatypeClass::String
    }

    pub fn is_char(&self) -> bool {
        self.class == DatatypeClass::Char
    }

    pub fn is_ref(&self) -> bool {
        self.class == DatatypeClass::Reference
    }

    pub fn is_enum(&self) -> bool {
        self.class == DatatypeClass::Enum
    }

    pub fn is_opaque(&self) -> bool {
        self.class == DatatypeClass::Opaque
    }

    pub fn is_bit_field(&self) -> bool {
        self.class == DatatypeClass::BitField
    }

    pub fn is_complex(&self) -> bool {
        self.class == DatatypeClass::Complex
    }

    /// Nesting depth of the type tree; atomic types have depth 1
    pub fn depth(&self) -> usize {
        let base_depth = self.base.as_ref().map_or(0, |b| b.depth());
        let member_depth = self
            .compound_members
            .types()
            .map(Datatype::depth)
            .max()
            .unwrap_or(0);
        1 + base_depth.max(member_depth)
    }
}

/// Number of elements in an array of extents `dims`
pub(crate) fn element_count(dims: &[u64]) -> Result<u64> {
    dims.iter().try_fold(1u64, |total, &d| {
        total.checked_mul(d).ok_or(ModelError::InvalidDatatypeSpec {
            field: "array dimension",
            value: i64::try_from(d).unwrap_or(i64::MAX),
        })
    })
}

// Structural equality; the committed name and cached description are ignored
impl PartialEq for Datatype {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class
            && self.size == other.size
            && self.order == other.order
            && self.sign == other.sign
            && self.base == other.base
            && self.array_dims == other.array_dims
            && self.enum_members == other.enum_members
            && self.compound_members == other.compound_members
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl MetadataContainer for Datatype {
    fn metadata(&self) -> Result<Vec<Attribute>> {
        Ok(Vec::new())
    }

    fn write_metadata(&mut self, _attribute: &Attribute) -> Result<()> {
        Err(ModelError::Unsupported(
            "subclasses must implement Datatype::write_metadata".to_string(),
        ))
    }

    fn remove_metadata(&mut self, _attribute: &Attribute) -> Result<()> {
        Err(ModelError::Unsupported(
            "subclasses must implement Datatype::remove_metadata".to_string(),
        ))
    }

    fn update_metadata(&mut self, _attribute: &Attribute) -> Result<()> {
        Err(ModelError::Unsupported(
            "subclasses must implement Datatype::update_metadata".to_string(),
        ))
    }

    fn clear(&mut self) {}
}
