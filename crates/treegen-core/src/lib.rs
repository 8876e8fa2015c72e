/*! Decision trees as a trainer hands them over.
 *
 * A trained tree arrives as a compact byte stream. This crate owns that stream: the node and
 * split types it decodes into, the cursor that walks it depth-first for code generators, and a
 * reference scorer that evaluates it directly so generated code can be checked against it.
 */

pub mod columns;
pub mod cursor;
pub mod format;
pub mod group;
pub mod split;

pub use columns::ColumnNames;
pub use cursor::{TreeCursor, TreeVisitor, TreeWalk};
pub use format::{CompressedTree, TreeNode};
pub use group::{GroupSet, MAX_GROUP_BITS};
pub use split::{DecisionNode, EqualMode, NaSplitDir};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Unknown node tag {tag:#04x} at byte {offset}")]
    UnknownNodeTag { tag: u8, offset: usize },
    #[error("Unknown split mode {0}")]
    UnknownEqualMode(u8),
    #[error("Unknown NA split direction {0}")]
    UnknownNaDir(u8),
    #[error("Tree stream truncated at byte {offset}: needed {needed} more bytes")]
    Truncated { offset: usize, needed: usize },
    #[error("Left subtree at byte {offset} declared {declared} bytes but spans {actual}")]
    LeftLengthMismatch {
        offset: usize,
        declared: usize,
        actual: usize,
    },
    #[error("{0} trailing bytes after the root node")]
    TrailingBytes(usize),
    #[error("Group split on column {0} carries no group set")]
    MissingGroupSet(usize),
    #[error("Invalid group set: {0}")]
    InvalidGroupSet(String),
    #[error("Column {col} out of range for a row of {len} features")]
    ColumnOutOfRange { col: usize, len: usize },
    #[error("Tree description error: {0}")]
    Description(String),
}

impl TreeError {
    /// Decode errors that reject a split kind rather than a broken stream.
    pub fn is_unsupported_decision(&self) -> bool {
        matches!(
            self,
            TreeError::UnknownEqualMode(_)
                | TreeError::UnknownNaDir(_)
                | TreeError::MissingGroupSet(_)
                | TreeError::InvalidGroupSet(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TreeError>;
