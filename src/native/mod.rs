// src/native/mod.rs
//! Translation between [`Datatype`] and format-native type handles
//!
//! Each on-disk format supplies one [`NativeFormat`] implementation. Handles
//! it hands out are owned by the caller until closed; [`NativeHandle`] ties
//! that release to scope exit.

mod hdf5;
pub mod message;

pub use hdf5::{Hdf5TypeRegistry, NativeTypeId};

use crate::datatype::Datatype;
use crate::error::Result;
use std::fmt;
use tracing::warn;

/// Capability to translate datatypes to and from a backend's native handles
pub trait NativeFormat {
    type Handle: Copy + fmt::Debug;

    /// Open the stored counterpart of `datatype`
    ///
    /// Returns `None` when the backend has nothing to open, which is all a
    /// format without persistent named types can say.
    fn open(&self, _datatype: &Datatype) -> Option<Self::Handle> {
        None
    }

    /// Release a handle obtained from [`open`](Self::open) or
    /// [`create_native`](Self::create_native)
    fn close(&self, handle: Self::Handle) -> Result<()>;

    /// Build a native handle describing `datatype`
    fn create_native(&self, datatype: &Datatype) -> Result<Self::Handle>;

    /// Rebuild a datatype from a native handle
    fn from_native(&self, handle: Self::Handle) -> Result<Datatype>;

    /// Whether values of `datatype` are displayed as text by this format
    fn is_text(&self, datatype: &Datatype) -> bool;
}

/// Scoped native handle, closed when dropped
pub struct NativeHandle<'a, F: NativeFormat + ?Sized> {
    format: &'a F,
    handle: F::Handle,
}

impl<'a, F: NativeFormat + ?Sized> NativeHandle<'a, F> {
    /// Translate `datatype` into a handle owned by the returned guard
    pub fn create(format: &'a F, datatype: &Datatype) -> Result<Self> {
        let handle = format.create_native(datatype)?;
        Ok(NativeHandle { format, handle })
    }

    /// Guard an already-open handle
    pub fn from_raw(format: &'a F, handle: F::Handle) -> Self {
        NativeHandle { format, handle }
    }

    pub fn id(&self) -> F::Handle {
        self.handle
    }

    /// Decode the guarded handle back into a datatype
    pub fn to_datatype(&self) -> Result<Datatype> {
        self.format.from_native(self.handle)
    }
}

impl<F: NativeFormat + ?Sized> Drop for NativeHandle<'_, F> {
    fn drop(&mut self) {
        if let Err(e) = self.format.close(self.handle) {
            warn!(handle = ?self.handle, error = %e, "failed to close native datatype handle");
        }
    }
}

impl<F: NativeFormat + ?Sized> fmt::Debug for NativeHandle<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeHandle").field("handle", &self.handle).finish()
    }
}
