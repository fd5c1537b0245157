//! Record persistence over the KV layer.
//!
//! A model implements [`KvStore`] to declare its key and hooks.
//! [`KvOps`] provides create/get/list/delete and the patch cycle:
//!
//! ```ignore
//! let ops = KvOps::<Organization>::new(kv);
//! let patch = orgsvc_patch::validate(&body)?;
//! let updated = ops.apply_patch(&id, &patch, None)?;
//! ```

pub mod kv;

pub use kv::{invalid_patch, patch_failure, KvOps, KvStore, WriteMode};
