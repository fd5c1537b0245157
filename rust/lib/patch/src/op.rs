use std::fmt;

use serde_json::Value;

use crate::pointer::Pointer;

/// The fixed operation vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

impl OpKind {
    pub const ALL: [OpKind; 6] = [
        OpKind::Add,
        OpKind::Remove,
        OpKind::Replace,
        OpKind::Move,
        OpKind::Copy,
        OpKind::Test,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OpKind::Add => "add",
            OpKind::Remove => "remove",
            OpKind::Replace => "replace",
            OpKind::Move => "move",
            OpKind::Copy => "copy",
            OpKind::Test => "test",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Operations that carry a `value` member.
    pub fn needs_value(self) -> bool {
        matches!(self, OpKind::Add | OpKind::Replace | OpKind::Test)
    }

    /// Operations that carry a `from` member.
    pub fn needs_from(self) -> bool {
        matches!(self, OpKind::Move | OpKind::Copy)
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed edit instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOp {
    Add { path: Pointer, value: Value },
    Remove { path: Pointer },
    Replace { path: Pointer, value: Value },
    Move { from: Pointer, path: Pointer },
    Copy { from: Pointer, path: Pointer },
    Test { path: Pointer, value: Value },
}

impl PatchOp {
    pub fn kind(&self) -> OpKind {
        match self {
            PatchOp::Add { .. } => OpKind::Add,
            PatchOp::Remove { .. } => OpKind::Remove,
            PatchOp::Replace { .. } => OpKind::Replace,
            PatchOp::Move { .. } => OpKind::Move,
            PatchOp::Copy { .. } => OpKind::Copy,
            PatchOp::Test { .. } => OpKind::Test,
        }
    }

    /// The target path.
    pub fn path(&self) -> &Pointer {
        match self {
            PatchOp::Add { path, .. }
            | PatchOp::Remove { path }
            | PatchOp::Replace { path, .. }
            | PatchOp::Move { path, .. }
            | PatchOp::Copy { path, .. }
            | PatchOp::Test { path, .. } => path,
        }
    }
}

/// An ordered list of operations, applied all-or-nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatchSequence {
    ops: Vec<PatchOp>,
}

impl PatchSequence {
    pub fn new(ops: Vec<PatchOp>) -> Self {
        Self { ops }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PatchOp> {
        self.ops.iter()
    }

    /// True when the sequence holds only `test` operations.
    pub fn is_read_only(&self) -> bool {
        self.ops.iter().all(|op| op.kind() == OpKind::Test)
    }
}

impl FromIterator<PatchOp> for PatchSequence {
    fn from_iter<I: IntoIterator<Item = PatchOp>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PatchSequence {
    type Item = &'a PatchOp;
    type IntoIter = std::slice::Iter<'a, PatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
