//! Document patch engine.
//!
//! Two stages, both pure:
//!
//! 1. [`validate`] turns an untyped JSON array into a typed [`PatchSequence`],
//!    rejecting the first malformed element.
//! 2. [`apply`] runs the sequence against a snapshot and returns a new document,
//!    or the first failing operation. The input is never touched, so a failed
//!    patch leaves nothing behind.
//!
//! ```ignore
//! let patch = orgsvc_patch::validate(&body)?;
//! let next = orgsvc_patch::apply(&current, &patch)?;
//! ```
//!
//! Documents are `serde_json::Value` trees: string, number, bool, object, list, null.

pub mod apply;
pub mod error;
pub mod op;
pub mod pointer;
pub mod validate;

pub use apply::{apply, deep_equal};
pub use error::{PatchError, PatchErrorKind, PointerError, ValidationError};
pub use op::{OpKind, PatchOp, PatchSequence};
pub use pointer::Pointer;
pub use validate::validate;
