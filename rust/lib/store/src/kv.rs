//! KvStore trait + KvOps CRUD operations.
//!
//! The model impls `KvStore` to declare its key and hooks.
//! `KvOps<T>` provides the actual get/save/list/delete/patch using a KVStore backend.

use std::marker::PhantomData;
use std::sync::Arc;

use orgsvc_core::{ListParams, ListResult, ServiceError};
use orgsvc_kv::{KVError, KVStore};
use orgsvc_patch::{PatchError, PatchSequence, ValidationError};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Trait implemented by models to declare KV storage behavior.
///
/// Hooks have default no-op impls. The store owns `rev`: it is set to 1 on
/// create and bumped on every persisted patch.
pub trait KvStore: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Resource name used in error messages ("organization").
    const RESOURCE: &'static str;

    /// KV key prefix: "{module}:{resource}:".
    fn kv_prefix() -> &'static str;

    /// Extract the key value from this instance as a string.
    fn key_value(&self) -> String;

    /// Called before inserting a new record. Use for auto-fill (uuid, timestamps).
    fn before_create(&mut self) {}

    /// Called before persisting a changed record.
    fn before_update(&mut self) {}

    /// Called on the decoded result of a patch, with the record it was applied to.
    /// Use to restore fields a patch may not change.
    fn after_patch(&mut self, _prior: &Self) -> Result<(), ServiceError> {
        Ok(())
    }

    /// Field-level checks, run before every write.
    fn validate(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    /// Version token of the stored record.
    fn rev(&self) -> u64 {
        0
    }

    fn set_rev(&mut self, _rev: u64) {}
}

/// How `apply_patch` commits its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Overwrite whatever is stored. A concurrent patch may be lost.
    LastWriteWins,
    /// Write only if the stored bytes are still the ones that were loaded.
    #[default]
    Optimistic,
}

/// Map a malformed patch onto the service taxonomy, keeping the offending index.
pub fn invalid_patch(err: ValidationError) -> ServiceError {
    ServiceError::InvalidPatch {
        index: err.index(),
        message: err.to_string(),
    }
}

/// Map an engine failure onto the service taxonomy, keeping index and path.
pub fn patch_failure(err: PatchError) -> ServiceError {
    ServiceError::Patch {
        code: err.code(),
        index: err.index,
        path: err.path.clone(),
        message: err.to_string(),
    }
}

/// CRUD operations for a KvStore model. Holds a reference to the KV backend.
pub struct KvOps<T: KvStore> {
    kv: Arc<dyn KVStore>,
    mode: WriteMode,
    _phantom: PhantomData<T>,
}

impl<T: KvStore> KvOps<T> {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self {
            kv,
            mode: WriteMode::default(),
            _phantom: PhantomData,
        }
    }

    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    fn make_key(id: &str) -> String {
        format!("{}{}", T::kv_prefix(), id)
    }

    fn kv_err(e: KVError) -> ServiceError {
        ServiceError::Storage(e.to_string())
    }

    fn not_found(id: &str) -> ServiceError {
        ServiceError::NotFound(format!("{} '{}' not found", T::RESOURCE, id))
    }

    fn decode(bytes: &[u8]) -> Result<T, ServiceError> {
        serde_json::from_slice(bytes)
            .map_err(|e| ServiceError::Internal(format!("deserialize: {}", e)))
    }

    fn encode(record: &T) -> Result<Vec<u8>, ServiceError> {
        serde_json::to_vec(record).map_err(|e| ServiceError::Internal(format!("serialize: {}", e)))
    }

    /// Get a record by key value. Returns None if not found.
    pub fn get(&self, id: &str) -> Result<Option<T>, ServiceError> {
        let key = Self::make_key(id);
        match self.kv.get(&key).map_err(Self::kv_err)? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Get a record or return NotFound error.
    pub fn get_or_err(&self, id: &str) -> Result<T, ServiceError> {
        self.get(id)?.ok_or_else(|| Self::not_found(id))
    }

    /// List all records with this prefix, in key order.
    pub fn list(&self) -> Result<Vec<T>, ServiceError> {
        let entries = self.kv.scan(T::kv_prefix()).map_err(Self::kv_err)?;
        entries
            .iter()
            .map(|(_key, bytes)| Self::decode(bytes))
            .collect()
    }

    /// List records with pagination (limit/offset).
    ///
    /// Scans all entries then slices in memory. For KV stores the full scan
    /// is unavoidable; pagination just controls how much is returned to the caller.
    pub fn list_paginated(&self, params: &ListParams) -> Result<ListResult<T>, ServiceError> {
        let all = self.list()?;
        let total = all.len();
        let offset = params.offset.min(total);
        let end = offset.saturating_add(params.limit).min(total);
        let items: Vec<T> = all.into_iter().skip(offset).take(params.limit).collect();
        Ok(ListResult {
            items,
            total,
            has_more: end < total,
        })
    }

    /// Count all records with this prefix.
    pub fn count(&self) -> Result<usize, ServiceError> {
        let entries = self.kv.scan(T::kv_prefix()).map_err(Self::kv_err)?;
        Ok(entries.len())
    }

    /// Create a new record. Calls before_create and validate; the insert only
    /// succeeds if the key is still absent.
    pub fn save_new(&self, mut record: T) -> Result<T, ServiceError> {
        record.before_create();
        record.validate()?;
        record.set_rev(1);

        let id = record.key_value();
        let key = Self::make_key(&id);
        let bytes = Self::encode(&record)?;

        if !self
            .kv
            .compare_and_swap(&key, None, &bytes)
            .map_err(Self::kv_err)?
        {
            return Err(ServiceError::Conflict(format!(
                "{} '{}' already exists",
                T::RESOURCE,
                id
            )));
        }
        debug!(resource = T::RESOURCE, id = %id, "record created");
        Ok(record)
    }

    /// Delete a record by key value, returning what was stored.
    pub fn delete(&self, id: &str) -> Result<T, ServiceError> {
        let key = Self::make_key(id);
        let bytes = self
            .kv
            .delete(&key)
            .map_err(Self::kv_err)?
            .ok_or_else(|| Self::not_found(id))?;
        debug!(resource = T::RESOURCE, id = %id, "record deleted");
        Self::decode(&bytes)
    }

    /// Load, patch and persist a record.
    ///
    /// The engine runs on a copy of the stored tree; any failure leaves storage
    /// untouched. A result that deep-equals the stored record is not written.
    /// `expected_rev`, when given, must match the stored `rev`.
    pub fn apply_patch(
        &self,
        id: &str,
        patch: &PatchSequence,
        expected_rev: Option<u64>,
    ) -> Result<T, ServiceError> {
        let key = Self::make_key(id);
        let raw = self
            .kv
            .get(&key)
            .map_err(Self::kv_err)?
            .ok_or_else(|| Self::not_found(id))?;
        let current = Self::decode(&raw)?;

        if let Some(expected) = expected_rev {
            if current.rev() != expected {
                return Err(ServiceError::Stale(format!(
                    "{} '{}' is at rev {}, expected rev {}",
                    T::RESOURCE,
                    id,
                    current.rev(),
                    expected
                )));
            }
        }

        let snapshot: Value = serde_json::from_slice(&raw)
            .map_err(|e| ServiceError::Internal(format!("deserialize: {}", e)))?;
        let patched = orgsvc_patch::apply(&snapshot, patch).map_err(patch_failure)?;
        if patch.is_read_only() || orgsvc_patch::deep_equal(&patched, &snapshot) {
            debug!(resource = T::RESOURCE, id = %id, "patch left record unchanged");
            return Ok(current);
        }

        let mut next: T = serde_json::from_value(patched).map_err(|e| {
            ServiceError::Validation(format!("patched {} is invalid: {}", T::RESOURCE, e))
        })?;
        if next.key_value() != id {
            return Err(ServiceError::Validation(format!(
                "{} id is immutable",
                T::RESOURCE
            )));
        }
        next.after_patch(&current)?;
        next.validate()?;

        // Normalization may have undone the change.
        let normalized = serde_json::to_value(&next)
            .map_err(|e| ServiceError::Internal(format!("serialize: {}", e)))?;
        if orgsvc_patch::deep_equal(&normalized, &snapshot) {
            return Ok(current);
        }

        next.before_update();
        next.set_rev(current.rev() + 1);
        let bytes = Self::encode(&next)?;

        match self.mode {
            WriteMode::Optimistic => {
                let swapped = self
                    .kv
                    .compare_and_swap(&key, Some(raw.as_slice()), &bytes)
                    .map_err(Self::kv_err)?;
                if !swapped {
                    warn!(resource = T::RESOURCE, id = %id, "concurrent write detected");
                    return Err(ServiceError::Stale(format!(
                        "{} '{}' was modified concurrently; reload and retry",
                        T::RESOURCE,
                        id
                    )));
                }
            }
            WriteMode::LastWriteWins => {
                self.kv.set(&key, &bytes).map_err(Self::kv_err)?;
            }
        }

        debug!(resource = T::RESOURCE, id = %id, rev = next.rev(), "record patched");
        Ok(next)
    }
}
