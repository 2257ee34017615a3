//! Non-volatile key-value storage abstraction
//!
//! The core only needs integers and strings under a handful of fixed keys.
//! Every access group is wrapped in a [`Session`], which opens the namespace
//! on creation and closes it on drop.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

use crate::error::StorageError;

/// Key holding the id of the last activated effect
pub const KEY_CURRENT_PLUGIN: &str = "current-plugin";
/// Key holding the serialized schedule, stored verbatim
pub const KEY_SCHEDULE: &str = "schedule";
/// Key holding `1` while the scheduler is cycling, `0` otherwise
pub const KEY_SCHEDULE_ACTIVE: &str = "scheduleactive";
/// Key holding the index of the schedule entry being shown
pub const KEY_SCHEDULE_INDEX: &str = "schedidx";

/// Non-volatile key-value storage
///
/// Reads never fail: a missing key, a closed namespace or broken storage all
/// yield the supplied default.
pub trait KeyValueStore {
    /// Open `namespace` for the following accesses
    fn begin(&mut self, namespace: &str, read_only: bool) -> Result<(), StorageError>;

    /// Close the namespace opened by [`KeyValueStore::begin`]
    fn end(&mut self);

    fn get_i32(&self, key: &str, default: i32) -> i32;

    fn put_i32(&mut self, key: &str, value: i32) -> Result<(), StorageError>;

    fn get_string(&self, key: &str) -> Option<String>;

    fn put_string(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Open namespace on a [`KeyValueStore`]
pub struct Session<'a, S: KeyValueStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: KeyValueStore + ?Sized> Session<'a, S> {
    pub fn open(store: &'a mut S, namespace: &str, read_only: bool) -> Result<Self, StorageError> {
        store.begin(namespace, read_only)?;
        Ok(Self { store })
    }

    pub fn get_i32(&self, key: &str, default: i32) -> i32 {
        self.store.get_i32(key, default)
    }

    /// Read a string, an absent key reads as empty
    pub fn get_string(&self, key: &str) -> String {
        self.store.get_string(key).unwrap_or_default()
    }

    pub fn put_i32(&mut self, key: &str, value: i32) -> Result<(), StorageError> {
        self.store.put_i32(key, value)
    }

    pub fn put_string(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.store.put_string(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> Drop for Session<'_, S> {
    fn drop(&mut self) {
        self.store.end();
    }
}

/// Write a single integer, logging instead of failing
pub(crate) fn persist_i32<S: KeyValueStore + ?Sized>(
    store: &mut S,
    namespace: &str,
    key: &str,
    value: i32,
) {
    let result = Session::open(store, namespace, false)
        .and_then(|mut session| session.put_i32(key, value));
    if let Err(err) = result {
        log::warn!("storage: failed to write {}: {}", key, err);
    }
}

/// Storage compiled out of the firmware
///
/// Every write is skipped and every read returns its default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl KeyValueStore for NullStore {
    fn begin(&mut self, _namespace: &str, _read_only: bool) -> Result<(), StorageError> {
        Ok(())
    }

    fn end(&mut self) {}

    fn get_i32(&self, _key: &str, default: i32) -> i32 {
        default
    }

    fn put_i32(&mut self, _key: &str, _value: i32) -> Result<(), StorageError> {
        Ok(())
    }

    fn get_string(&self, _key: &str) -> Option<String> {
        None
    }

    fn put_string(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StoredValue {
    Int(i32),
    Text(String),
}

/// RAM-backed store for simulators and tests
///
/// Mirrors the semantics of flash-backed preferences: accesses outside an
/// open namespace read defaults and reject writes, and a namespace opened
/// read-only rejects writes too. Every accepted write is counted per key.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<(String, String), StoredValue>,
    writes: BTreeMap<String, usize>,
    open: Option<(String, bool)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accepted writes to `key` across all namespaces
    pub fn write_count(&self, key: &str) -> usize {
        self.writes.get(key).copied().unwrap_or(0)
    }

    /// Read an integer without opening a namespace
    pub fn peek_i32(&self, namespace: &str, key: &str) -> Option<i32> {
        match self.values.get(&(namespace.to_string(), key.to_string())) {
            Some(StoredValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    /// Read a string without opening a namespace
    pub fn peek_string(&self, namespace: &str, key: &str) -> Option<&str> {
        match self.values.get(&(namespace.to_string(), key.to_string())) {
            Some(StoredValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    fn lookup(&self, key: &str) -> Option<&StoredValue> {
        let (namespace, _) = self.open.as_ref()?;
        self.values.get(&(namespace.clone(), key.to_string()))
    }

    fn write(&mut self, key: &str, value: StoredValue) -> Result<(), StorageError> {
        let namespace = match &self.open {
            Some((namespace, false)) => namespace.clone(),
            Some((_, true)) => return Err(StorageError::Rejected),
            None => return Err(StorageError::Unavailable),
        };
        self.values.insert((namespace, key.to_string()), value);
        *self.writes.entry(key.to_string()).or_insert(0) += 1;
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn begin(&mut self, namespace: &str, read_only: bool) -> Result<(), StorageError> {
        self.open = Some((namespace.to_string(), read_only));
        Ok(())
    }

    fn end(&mut self) {
        self.open = None;
    }

    fn get_i32(&self, key: &str, default: i32) -> i32 {
        match self.lookup(key) {
            Some(StoredValue::Int(value)) => *value,
            _ => default,
        }
    }

    fn put_i32(&mut self, key: &str, value: i32) -> Result<(), StorageError> {
        self.write(key, StoredValue::Int(value))
    }

    fn get_string(&self, key: &str) -> Option<String> {
        match self.lookup(key) {
            Some(StoredValue::Text(value)) => Some(value.clone()),
            _ => None,
        }
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.write(key, StoredValue::Text(value.to_string()))
    }
}
