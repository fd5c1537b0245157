use thiserror::Error;

use crate::op::OpKind;

/// A pointer string that cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("pointer '{0}' must start with '/'")]
    MissingLeadingSlash(String),

    #[error("segment '{0}' contains an invalid '~' escape")]
    InvalidEscape(String),
}

/// Structural problem with an incoming patch, found before any document is read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("patch must be a JSON array of operations")]
    NotAnArray,

    #[error("operation {index}: {reason}")]
    Invalid { index: usize, reason: String },
}

impl ValidationError {
    /// Position of the offending element, if the array itself was well-formed.
    pub fn index(&self) -> Option<usize> {
        match self {
            ValidationError::NotAnArray => None,
            ValidationError::Invalid { index, .. } => Some(*index),
        }
    }
}

/// Why a single operation could not be applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchErrorKind {
    #[error("path '{0}' does not exist")]
    PathNotFound(String),

    #[error("index {index} is out of bounds at '{path}' (list length {len})")]
    OutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("'{segment}' is not a valid list index at '{path}'")]
    InvalidIndex { path: String, segment: String },

    #[error("value at '{0}' does not match the expected value")]
    AssertionFailed(String),

    #[error("cannot move '{from}' into its own descendant '{path}'")]
    StructuralConflict { from: String, path: String },
}

impl PatchErrorKind {
    /// Stable, machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            PatchErrorKind::PathNotFound(_) => "PATH_NOT_FOUND",
            PatchErrorKind::OutOfBounds { .. } => "INDEX_OUT_OF_BOUNDS",
            PatchErrorKind::InvalidIndex { .. } => "INVALID_INDEX",
            PatchErrorKind::AssertionFailed(_) => "ASSERTION_FAILED",
            PatchErrorKind::StructuralConflict { .. } => "STRUCTURAL_CONFLICT",
        }
    }
}

/// The operation that aborted a patch sequence, and why.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("operation {index} ({op} {path}) failed: {kind}")]
pub struct PatchError {
    /// Zero-based position of the failing operation in the sequence.
    pub index: usize,
    pub op: OpKind,
    /// The operation's target path, as submitted.
    pub path: String,
    pub kind: PatchErrorKind,
}

impl PatchError {
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_operation_and_reason() {
        let err = PatchError {
            index: 1,
            op: OpKind::Replace,
            path: "/addresses/5".into(),
            kind: PatchErrorKind::OutOfBounds {
                path: "/addresses/5".into(),
                index: 5,
                len: 2,
            },
        };
        assert_eq!(
            err.to_string(),
            "operation 1 (replace /addresses/5) failed: index 5 is out of bounds at '/addresses/5' (list length 2)"
        );
        assert_eq!(err.code(), "INDEX_OUT_OF_BOUNDS");
    }

    #[test]
    fn validation_error_index() {
        assert_eq!(ValidationError::NotAnArray.index(), None);
        let err = ValidationError::Invalid {
            index: 3,
            reason: "\"path\" is required".into(),
        };
        assert_eq!(err.index(), Some(3));
        assert_eq!(err.to_string(), "operation 3: \"path\" is required");
    }
}
