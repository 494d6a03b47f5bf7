// src/lib.rs
//! # hdfview-model
//!
//! The data model behind a browser for HDF-style scientific files: a typed
//! description of how stored bytes map to values, and the subsetting
//! arithmetic a table view uses to page through N-dimensional arrays.
//!
//! ## Features
//!
//! - **Datatype model**: integer, float, string, compound, enum, array,
//!   variable-length, opaque, bitfield, reference and complex types with
//!   recursive composition and cached descriptions
//! - **HDF5 datatype messages**: encode and decode the on-disk datatype
//!   message through a handle-based backend
//! - **Selections**: start/stride/count windows over any rank, with frame
//!   navigation along the third displayed dimension
//!
//! ## Quick Start
//!
//! ### Describing a datatype
//!
//! ```rust
//! use hdfview_model::*;
//!
//! fn main() -> Result<()> {
//!     let int16 = Datatype::new(DatatypeClass::Integer, 2, ByteOrder::BigEndian, Sign::None, None)?;
//!     let status = Datatype::enumeration(int16, "0=IDLE, 1=RUNNING, 2=FAILED")?;
//!
//!     assert_eq!(status.description(), "16-bit enum of 16-bit unsigned integer");
//!     assert!(status.is_unsigned());
//!     assert_eq!(status.enum_label("2"), Some("FAILED"));
//!     Ok(())
//! }
//! ```
//!
//! ### Round-tripping through HDF5
//!
//! ```rust
//! use hdfview_model::*;
//!
//! fn main() -> Result<()> {
//!     let registry = Hdf5TypeRegistry::new();
//!     let float = Datatype::new(DatatypeClass::Float, 8, ByteOrder::LittleEndian, Sign::Native, None)?;
//!     let samples = Datatype::array(float, &[3, 3])?;
//!
//!     let handle = NativeHandle::create(&registry, &samples)?;
//!     assert_eq!(handle.to_datatype()?, samples);
//!     Ok(())
//! }
//! ```
//!
//! ### Paging through frames
//!
//! ```rust
//! use hdfview_model::*;
//!
//! fn main() -> Result<()> {
//!     let source = MemoryDataSource::new(&[2, 2, 3], (0..12).collect::<Vec<u32>>())?;
//!     let mut view = FrameNavigator::open(source, IndexBase::One)?;
//!
//!     assert_eq!(view.max_frame(), Some(3));
//!     view.last()?;
//!     assert_eq!(view.current_frame(), Some(3));
//!     assert_eq!(view.source().window(), Some(&[2, 5, 8, 11][..]));
//!     Ok(())
//! }
//! ```

// Modules
pub mod config;
pub mod datatype;
pub mod display;
pub mod error;
pub mod metadata;
pub mod native;
pub mod selection;
pub mod types;

// Re-export commonly used types at the crate root for convenience
pub use error::{ModelError, Result};

// Type exports
pub use types::{ByteOrder, DatatypeClass, Sign, TypeSize, NATIVE};

// Datatype exports
pub use datatype::{CompoundMember, CompoundMembers, Datatype, EnumMembers};

pub use metadata::{Attribute, MetadataContainer};

// Native backend exports
pub use native::{Hdf5TypeRegistry, NativeFormat, NativeHandle, NativeTypeId};

// Selection exports
pub use selection::{DataSource, FrameNavigator, MemoryDataSource, Selection};

pub use config::{IndexBase, NumberFormat, ViewOptions};
pub use display::ValueFormat;

// Prelude module for glob imports
pub mod prelude {
    //! Convenient imports for common use cases.
    //!
    //! ```rust
    //! use hdfview_model::prelude::*;
    //! ```

    pub use crate::config::{IndexBase, ViewOptions};
    pub use crate::datatype::Datatype;
    pub use crate::error::{ModelError, Result};
    pub use crate::native::{Hdf5TypeRegistry, NativeFormat, NativeHandle};
    pub use crate::selection::{DataSource, FrameNavigator, Selection};
    pub use crate::types::{ByteOrder, DatatypeClass, Sign};
}

/// The library version
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");
