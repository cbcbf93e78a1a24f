//! Bounded undo/redo history for one presentation.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use slidedeck_core::DomainError;

use crate::command::{BoxedCommand, CommandSummary};
use crate::error::{CommandError, CommandResult};
use crate::record::CommandRecord;

/// Default maximum number of commands kept on the undo stack.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Read-only view of a history's stacks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStatus {
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_count: usize,
    pub redo_count: usize,
    pub undo_description: Option<String>,
    pub redo_description: Option<String>,
}

/// Undo and redo stacks for exactly one presentation.
///
/// - `execute`: run a new command; on success push it, evict the oldest entry
///   beyond `max_depth`, and clear the redo stack (the old future diverged)
/// - `undo` / `redo`: run the top command's reversal / re-execution and move it
///   to the other stack only once the store accepted the step
///
/// A failed (or timed-out) operation leaves both stacks exactly as they were,
/// so the caller may retry. Commands are moved between stacks, never copied.
///
/// The history itself is not synchronized; the directory hands it out behind an
/// async mutex so operations on one presentation run one at a time.
#[derive(Debug)]
pub struct CommandHistory {
    /// Most recent at the back.
    undo_stack: VecDeque<BoxedCommand>,
    /// Most recent at the back.
    redo_stack: VecDeque<BoxedCommand>,
    max_depth: usize,
    op_timeout: Option<Duration>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_DEPTH)
    }

    /// Create a history that retains at most `max_depth` undoable commands
    /// (at least one).
    pub fn with_capacity(max_depth: usize) -> Self {
        let max_depth = max_depth.max(1);
        Self {
            undo_stack: VecDeque::with_capacity(max_depth),
            redo_stack: VecDeque::new(),
            max_depth,
            op_timeout: None,
        }
    }

    /// Bound every command execute/undo call; an elapsed bound counts as a failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = Some(timeout);
        self
    }

    /// Execute a new command and record it.
    ///
    /// # Errors
    /// Propagates the command's `Execution` error; stacks are unchanged.
    pub async fn execute(&mut self, mut command: BoxedCommand) -> CommandResult<CommandSummary> {
        let command_type = command.meta().command_type().to_string();

        bounded(self.op_timeout, command.execute(), |cause| {
            CommandError::execution(&command_type, cause)
        })
        .await
        .inspect_err(|e| warn!(error = %e, "command execution failed"))?;

        let summary = command.summary();
        self.push_undo(command);

        let discarded = self.redo_stack.len();
        self.redo_stack.clear();

        debug!(
            command_type = %summary.command_type,
            target_id = %summary.target_id,
            undo_count = self.undo_stack.len(),
            discarded_redo = discarded,
            "command executed"
        );
        Ok(summary)
    }

    /// Undo the most recent command.
    ///
    /// # Errors
    /// `NothingToUndo` when the undo stack is empty; the command's `Undo` error
    /// when the store rejects the reversal (the command stays on top).
    pub async fn undo(&mut self) -> CommandResult<CommandSummary> {
        let command = self
            .undo_stack
            .back_mut()
            .ok_or(CommandError::NothingToUndo)?;
        let command_type = command.meta().command_type().to_string();

        bounded(self.op_timeout, command.undo(), |cause| {
            CommandError::undo(&command_type, cause)
        })
        .await
        .inspect_err(|e| warn!(error = %e, "undo failed; command kept on undo stack"))?;

        let command = self
            .undo_stack
            .pop_back()
            .ok_or(CommandError::NothingToUndo)?;
        let summary = command.summary();
        self.redo_stack.push_back(command);

        debug!(
            command_type = %summary.command_type,
            target_id = %summary.target_id,
            undo_count = self.undo_stack.len(),
            redo_count = self.redo_stack.len(),
            "command undone"
        );
        Ok(summary)
    }

    /// Re-execute the most recently undone command.
    ///
    /// The command recomputes its effect against the store as it is now.
    ///
    /// # Errors
    /// `NothingToRedo` when the redo stack is empty; the command's `Execution`
    /// error when the store rejects it (the command stays on top).
    pub async fn redo(&mut self) -> CommandResult<CommandSummary> {
        let command = self
            .redo_stack
            .back_mut()
            .ok_or(CommandError::NothingToRedo)?;
        let command_type = command.meta().command_type().to_string();

        bounded(self.op_timeout, command.execute(), |cause| {
            CommandError::execution(&command_type, cause)
        })
        .await
        .inspect_err(|e| warn!(error = %e, "redo failed; command kept on redo stack"))?;

        let command = self
            .redo_stack
            .pop_back()
            .ok_or(CommandError::NothingToRedo)?;
        let summary = command.summary();
        self.push_undo(command);

        debug!(
            command_type = %summary.command_type,
            target_id = %summary.target_id,
            undo_count = self.undo_stack.len(),
            redo_count = self.redo_stack.len(),
            "command redone"
        );
        Ok(summary)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Description of the command `undo` would reverse.
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.back().map(|cmd| cmd.description())
    }

    /// Description of the command `redo` would re-apply.
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.back().map(|cmd| cmd.description())
    }

    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            undo_count: self.undo_count(),
            redo_count: self.redo_count(),
            undo_description: self.undo_description(),
            redo_description: self.redo_description(),
        }
    }

    /// Records of the undo stack, oldest first.
    pub fn undo_records(&self) -> Vec<CommandRecord> {
        self.undo_stack.iter().map(|cmd| cmd.to_record()).collect()
    }

    /// Records of the redo stack, oldest first.
    pub fn redo_records(&self) -> Vec<CommandRecord> {
        self.redo_stack.iter().map(|cmd| cmd.to_record()).collect()
    }

    /// Record of the command `undo` would reverse.
    pub fn peek_undo_record(&self) -> Option<CommandRecord> {
        self.undo_stack.back().map(|cmd| cmd.to_record())
    }

    /// Record of the command `redo` would re-apply.
    pub fn peek_redo_record(&self) -> Option<CommandRecord> {
        self.redo_stack.back().map(|cmd| cmd.to_record())
    }

    /// Drop both stacks unconditionally.
    pub fn clear(&mut self) {
        debug!(
            undo_count = self.undo_stack.len(),
            redo_count = self.redo_stack.len(),
            "history cleared"
        );
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn push_undo(&mut self, command: BoxedCommand) {
        self.undo_stack.push_back(command);
        while self.undo_stack.len() > self.max_depth {
            if let Some(evicted) = self.undo_stack.pop_front() {
                debug!(
                    command_type = %evicted.meta().command_type(),
                    target_id = %evicted.meta().target_id(),
                    "oldest command evicted from history"
                );
            }
        }
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Await `op`, failing with `on_timeout` if `limit` elapses first.
async fn bounded<F>(
    limit: Option<Duration>,
    op: F,
    on_timeout: impl FnOnce(DomainError) -> CommandError,
) -> CommandResult<()>
where
    F: Future<Output = CommandResult<()>>,
{
    let Some(limit) = limit else {
        return op.await;
    };
    match tokio::time::timeout(limit, op).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout(DomainError::unavailable(format!(
            "store call timed out after {}ms",
            limit.as_millis()
        )))),
    }
}
