//! Command engine error model.

use slidedeck_core::DomainError;
use thiserror::Error;

/// Result type for command and history operations.
pub type CommandResult<T> = Result<T, CommandError>;

/// Errors surfaced by commands, the history, and the registry.
///
/// A failed `execute`/`undo`/`redo` never leaves a partial stack mutation
/// behind, so every variant except the registry ones is safe to retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The forward operation was rejected (store refusal, invalid lifecycle, timeout).
    #[error("command '{command_type}' failed to execute: {source}")]
    Execution {
        command_type: String,
        #[source]
        source: DomainError,
    },

    /// The reversal was rejected; usually the target changed out-of-band.
    #[error("command '{command_type}' failed to undo: {source}")]
    Undo {
        command_type: String,
        #[source]
        source: DomainError,
    },

    /// The undo stack is empty.
    #[error("nothing to undo")]
    NothingToUndo,

    /// The redo stack is empty.
    #[error("nothing to redo")]
    NothingToRedo,

    /// No reconstructor is registered for the record's type tag (version skew).
    #[error("unknown command type: {0}")]
    UnknownCommandType(String),

    /// A record carried a payload its reconstructor could not decode.
    #[error("invalid command record: {0}")]
    InvalidRecord(String),
}

impl CommandError {
    pub fn execution(command_type: impl Into<String>, source: DomainError) -> Self {
        Self::Execution {
            command_type: command_type.into(),
            source,
        }
    }

    pub fn undo(command_type: impl Into<String>, source: DomainError) -> Self {
        Self::Undo {
            command_type: command_type.into(),
            source,
        }
    }

    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    /// Expected "nothing to do" conditions, not system faults.
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::NothingToUndo | Self::NothingToRedo)
    }

    /// Undo rejections are reported to callers as conflicts.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Undo { .. })
    }

    /// Registry failures indicate a deployment mismatch and must not be retried.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::UnknownCommandType(_) | Self::InvalidRecord(_))
    }

    /// The domain cause of an execute/undo failure, if any.
    pub fn cause(&self) -> Option<&DomainError> {
        match self {
            Self::Execution { source, .. } | Self::Undo { source, .. } => Some(source),
            _ => None,
        }
    }
}
