//! Construction- and invariant-level error types.
//!
//! Action-level failures are not represented here — per spec.md §7 those
//! are structured `ActionResult`/`SubmitResult` values, never exceptions.
//! This enum is reserved for entity construction failures and state-manager
//! invariant violations (see `validation::validate_game_state`), following
//! the manual `Display`/`Error` shape of the teacher's `error_handling.rs`.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum EngineError {
    /// An entity or ability definition failed validation at construction
    /// time (empty id, negative range, unknown status name, etc).
    InvalidDefinition(String),
    /// Two entities were constructed with the same id.
    DuplicateEntityId(String),
    /// Two distinct entities were placed on the same starting hex.
    DuplicatePosition(String),
    /// An internal invariant (see `validation`) was violated.
    Internal(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidDefinition(msg) => write!(f, "invalid definition: {}", msg),
            EngineError::DuplicateEntityId(id) => write!(f, "duplicate entity id: {}", id),
            EngineError::DuplicatePosition(msg) => write!(f, "duplicate position: {}", msg),
            EngineError::Internal(msg) => write!(f, "internal invariant violation: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

pub type EngineResult<T> = Result<T, EngineError>;
