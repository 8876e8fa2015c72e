use thiserror::Error;
use treegen_core::TreeError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmitError {
    #[error("Malformed tree: {0}")]
    MalformedTree(String),

    #[error("Unsupported decision: {0}")]
    UnsupportedDecision(String),

    #[error(
        "Class {class} over budget at a leaf: cp_size={cp_size}, static_init_size={static_init_size}"
    )]
    OverBudgetAtLeaf {
        class: String,
        cp_size: usize,
        static_init_size: usize,
    },

    #[error("Class sink error: {0}")]
    Sink(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<TreeError> for EmitError {
    fn from(err: TreeError) -> Self {
        if err.is_unsupported_decision() {
            EmitError::UnsupportedDecision(err.to_string())
        } else {
            EmitError::MalformedTree(err.to_string())
        }
    }
}

pub type EmitResult<T> = std::result::Result<T, EmitError>;
