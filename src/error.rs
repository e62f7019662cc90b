//! Precondition violations raised by tracer mutators.
//!
//! Every variant is a driver bug: the tracer refuses the call and leaves its
//! state untouched. The two deliberate soft-fail cases (empty-panel pops and
//! duplicate edges) never produce an error.

use crate::value::NodeId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TracerError {
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} board")]
    CellOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("index {index} is outside an array of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unknown node '{0}'")]
    UnknownNode(NodeId),

    #[error("node '{0}' is already registered")]
    DuplicateNode(NodeId),

    #[error("unknown edge '{0}' -> '{1}'")]
    UnknownEdge(NodeId, NodeId),

    #[error("unknown panel '{0}'")]
    UnknownPanel(String),

    #[error("item {index} is outside panel '{title}' of length {len}")]
    ItemOutOfRange {
        title: String,
        index: usize,
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, TracerError>;
