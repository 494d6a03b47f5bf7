// src/native/hdf5.rs
use super::message;
use super::NativeFormat;
use crate::datatype::Datatype;
use crate::error::{ModelError, Result};
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::{debug, trace};

/// Identifier of an open HDF5 datatype handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeTypeId(pub i64);

impl fmt::Display for NativeTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct OpenType {
    message: Bytes,
    /// Set when opened from a committed type
    name: Option<String>,
}

/// HDF5 backend keeping datatypes as encoded datatype messages
///
/// Handles are allocated from 1 upward and stay valid until closed. Named
/// types committed with [`commit`](Self::commit) can be re-opened by
/// datatypes carrying the same name.
#[derive(Debug)]
pub struct Hdf5TypeRegistry {
    open: Mutex<HashMap<NativeTypeId, OpenType>>,
    committed: Mutex<HashMap<String, Bytes>>,
    next_id: AtomicI64,
}

impl Hdf5TypeRegistry {
    pub fn new() -> Self {
        Hdf5TypeRegistry {
            open: Mutex::new(HashMap::new()),
            committed: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate(&self, entry: OpenType) -> NativeTypeId {
        let id = NativeTypeId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.open.lock().insert(id, entry);
        id
    }

    /// Store `datatype` under `name` and return the named copy
    ///
    /// Committing a name twice replaces the stored type.
    pub fn commit(&self, name: &str, datatype: &Datatype) -> Result<Datatype> {
        let encoded = Bytes::from(message::encode(datatype)?);
        debug!(name, bytes = encoded.len(), "committing named datatype");
        self.committed.lock().insert(name.to_string(), encoded);
        Ok(datatype.clone().into_named(name))
    }

    pub fn committed_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.committed.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Register a datatype message read from a file
    ///
    /// The message is validated by decoding it once.
    pub fn import_message(&self, raw: &[u8]) -> Result<NativeTypeId> {
        let (_, consumed) = message::decode(raw)?;
        let message = Bytes::copy_from_slice(&raw[..consumed]);
        Ok(self.allocate(OpenType { message, name: None }))
    }

    /// Encoded message behind an open handle
    pub fn message(&self, handle: NativeTypeId) -> Result<Bytes> {
        self.open
            .lock()
            .get(&handle)
            .map(|entry| entry.message.clone())
            .ok_or(ModelError::InvalidHandle(handle.0))
    }

    /// Number of handles not yet closed
    pub fn open_handles(&self) -> usize {
        self.open.lock().len()
    }
}

impl Default for Hdf5TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeFormat for Hdf5TypeRegistry {
    type Handle = NativeTypeId;

    fn open(&self, datatype: &Datatype) -> Option<NativeTypeId> {
        let name = datatype.name()?;
        let message = self.committed.lock().get(name).cloned()?;
        let id = self.allocate(OpenType {
            message,
            name: Some(name.to_string()),
        });
        trace!(name, handle = %id, "opened named datatype");
        Some(id)
    }

    fn close(&self, handle: NativeTypeId) -> Result<()> {
        match self.open.lock().remove(&handle) {
            Some(_) => {
                trace!(handle = %handle, "closed datatype handle");
                Ok(())
            }
            None => Err(ModelError::InvalidHandle(handle.0)),
        }
    }

    fn create_native(&self, datatype: &Datatype) -> Result<NativeTypeId> {
        let message = Bytes::from(message::encode(datatype)?);
        let id = self.allocate(OpenType { message, name: None });
        trace!(handle = %id, class = datatype.class().name(), "created native datatype");
        Ok(id)
    }

    fn from_native(&self, handle: NativeTypeId) -> Result<Datatype> {
        let entry = self
            .open
            .lock()
            .get(&handle)
            .cloned()
            .ok_or(ModelError::InvalidHandle(handle.0))?;

        let (datatype, _) = message::decode(&entry.message)?;
        Ok(match entry.name {
            Some(name) => datatype.into_named(name),
            None => datatype,
        })
    }

    fn is_text(&self, datatype: &Datatype) -> bool {
        datatype.is_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::NativeHandle;
    use crate::types::{ByteOrder, DatatypeClass, Sign};

    fn int32() -> Datatype {
        Datatype::new(DatatypeClass::Integer, 4, ByteOrder::LittleEndian, Sign::TwosComplement, None).unwrap()
    }

    #[test]
    fn test_handles_start_at_one() {
        let registry = Hdf5TypeRegistry::new();
        let first = registry.create_native(&int32()).unwrap();
        let second = registry.create_native(&int32()).unwrap();
        assert_eq!(first, NativeTypeId(1));
        assert_eq!(second, NativeTypeId(2));
        assert_eq!(registry.open_handles(), 2);
    }

    #[test]
    fn test_close_unknown_handle() {
        let registry = Hdf5TypeRegistry::new();
        let id = registry.create_native(&int32()).unwrap();
        registry.close(id).unwrap();
        assert!(matches!(registry.close(id), Err(ModelError::InvalidHandle(1))));
        assert!(matches!(registry.from_native(NativeTypeId(42)), Err(ModelError::InvalidHandle(42))));
    }

    #[test]
    fn test_guard_releases_handle() {
        let registry = Hdf5TypeRegistry::new();
        {
            let handle = NativeHandle::create(&registry, &int32()).unwrap();
            assert_eq!(registry.open_handles(), 1);
            assert_eq!(handle.to_datatype().unwrap(), int32());
        }
        assert_eq!(registry.open_handles(), 0);
    }

    #[test]
    fn test_guard_releases_on_error_path() {
        fn decode_then_fail(registry: &Hdf5TypeRegistry) -> Result<()> {
            let handle = NativeHandle::create(registry, &int32())?;
            let _ = handle.to_datatype()?;
            Err(ModelError::Backend("read failed".to_string()))
        }

        let registry = Hdf5TypeRegistry::new();
        assert!(decode_then_fail(&registry).is_err());
        assert_eq!(registry.open_handles(), 0);
    }

    #[test]
    fn test_open_requires_committed_name() {
        let registry = Hdf5TypeRegistry::new();
        assert!(registry.open(&int32()).is_none());

        let named = registry.commit("counter_t", &int32()).unwrap();
        assert_eq!(named.name(), Some("counter_t"));
        assert_eq!(registry.committed_names(), vec!["counter_t".to_string()]);

        let id = registry.open(&named).unwrap();
        let reopened = registry.from_native(id).unwrap();
        assert!(reopened.is_named());
        assert_eq!(reopened, int32());
        registry.close(id).unwrap();
    }

    #[test]
    fn test_import_message() {
        let registry = Hdf5TypeRegistry::new();
        let mut raw = message::encode(&int32()).unwrap();
        raw.extend_from_slice(&[0xAA; 4]);
        let id = registry.import_message(&raw).unwrap();
        assert_eq!(registry.message(id).unwrap().len(), 12);
        assert!(registry.import_message(&raw[..6]).is_err());
    }

    #[test]
    fn test_is_text() {
        let registry = Hdf5TypeRegistry::new();
        assert!(registry.is_text(&Datatype::variable_string()));
        let ch = Datatype::new(DatatypeClass::Char, 1, ByteOrder::None, Sign::None, None).unwrap();
        assert!(!registry.is_text(&ch));
    }
}
