//! The reversible command abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use slidedeck_core::{CommandId, DomainError, DomainResult};

use crate::error::{CommandError, CommandResult};
use crate::record::CommandRecord;

/// Owned, type-erased command as stored in a history.
pub type BoxedCommand = Box<dyn Command>;

/// Where a command is in its execute/undo lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandState {
    /// Constructed (or rehydrated) and never executed.
    Pending,
    /// Forward operation applied.
    Executed,
    /// Forward operation reversed; may be executed again.
    Undone,
}

/// Identity, target, and lifecycle bookkeeping shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMeta {
    id: CommandId,
    command_type: String,
    target_id: Uuid,
    target_type: String,
    created_at: DateTime<Utc>,
    executed_at: Option<DateTime<Utc>>,
    undone_at: Option<DateTime<Utc>>,
    state: CommandState,
}

impl CommandMeta {
    pub fn new(
        command_type: impl Into<String>,
        target_id: impl Into<Uuid>,
        target_type: impl Into<String>,
    ) -> Self {
        Self {
            id: CommandId::new(),
            command_type: command_type.into(),
            target_id: target_id.into(),
            target_type: target_type.into(),
            created_at: Utc::now(),
            executed_at: None,
            undone_at: None,
            state: CommandState::Pending,
        }
    }

    /// Rehydrate identity and target from a record.
    ///
    /// The lifecycle starts over: a rebuilt command is `Pending` and has not
    /// captured any prior state.
    pub fn from_record(record: &CommandRecord) -> Self {
        Self {
            id: record.id,
            command_type: record.command_type.clone(),
            target_id: record.target_id,
            target_type: record.target_type.clone(),
            created_at: record.created_at,
            executed_at: None,
            undone_at: None,
            state: CommandState::Pending,
        }
    }

    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn command_type(&self) -> &str {
        &self.command_type
    }

    pub fn target_id(&self) -> Uuid {
        self.target_id
    }

    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn executed_at(&self) -> Option<DateTime<Utc>> {
        self.executed_at
    }

    pub fn undone_at(&self) -> Option<DateTime<Utc>> {
        self.undone_at
    }

    pub fn state(&self) -> CommandState {
        self.state
    }

    fn ensure_executable(&self) -> CommandResult<()> {
        match self.state {
            CommandState::Pending | CommandState::Undone => Ok(()),
            CommandState::Executed => Err(CommandError::execution(
                &self.command_type,
                DomainError::invariant("command is already executed"),
            )),
        }
    }

    fn ensure_undoable(&self) -> CommandResult<()> {
        match self.state {
            CommandState::Executed => Ok(()),
            CommandState::Pending | CommandState::Undone => Err(CommandError::undo(
                &self.command_type,
                DomainError::invariant("command is not in an executed state"),
            )),
        }
    }

    fn mark_executed(&mut self, at: DateTime<Utc>) {
        self.state = CommandState::Executed;
        self.executed_at = Some(at);
        self.undone_at = None;
    }

    fn mark_undone(&mut self, at: DateTime<Utc>) {
        self.state = CommandState::Undone;
        self.undone_at = Some(at);
    }
}

/// Short, serializable description of a command (returned by history operations).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSummary {
    pub id: CommandId,
    pub command_type: String,
    pub target_id: Uuid,
    pub target_type: String,
    pub description: String,
}

/// A self-contained, reversible unit of change against one target entity.
///
/// Implementors provide the two store-facing steps, `apply` and `revert`; the
/// provided `execute`/`undo` wrap them with the lifecycle rules:
///
/// - a command is executed at most once before being undone
/// - it cannot be undone before being executed
/// - it is only marked executed/undone when the store accepted the step
///
/// `apply` must capture whatever prior state `revert` needs *before* it
/// mutates the target.
///
/// # Example
/// ```ignore
/// let mut cmd = UpdateSlide::new(store.clone(), slide_id, SlidePatch::title("Agenda"));
/// cmd.execute().await?;
/// cmd.undo().await?;
/// ```
#[async_trait]
pub trait Command: Send + Sync + core::fmt::Debug {
    fn meta(&self) -> &CommandMeta;

    fn meta_mut(&mut self) -> &mut CommandMeta;

    /// Human-readable description (e.g. "Update slide 0190...").
    fn description(&self) -> String;

    /// Transport-neutral payload sufficient to redo the forward operation.
    fn payload(&self) -> JsonValue;

    /// Perform the forward operation against the store.
    async fn apply(&mut self) -> DomainResult<()>;

    /// Restore the state captured by the last successful `apply`.
    async fn revert(&mut self) -> DomainResult<()>;

    async fn execute(&mut self) -> CommandResult<()> {
        self.meta().ensure_executable()?;
        match self.apply().await {
            Ok(()) => {
                self.meta_mut().mark_executed(Utc::now());
                Ok(())
            }
            Err(cause) => Err(CommandError::execution(self.meta().command_type(), cause)),
        }
    }

    async fn undo(&mut self) -> CommandResult<()> {
        self.meta().ensure_undoable()?;
        match self.revert().await {
            Ok(()) => {
                self.meta_mut().mark_undone(Utc::now());
                Ok(())
            }
            Err(cause) => Err(CommandError::undo(self.meta().command_type(), cause)),
        }
    }

    fn to_record(&self) -> CommandRecord {
        CommandRecord::from_parts(self.meta(), self.payload())
    }

    fn summary(&self) -> CommandSummary {
        let meta = self.meta();
        CommandSummary {
            id: meta.id(),
            command_type: meta.command_type().to_string(),
            target_id: meta.target_id(),
            target_type: meta.target_type().to_string(),
            description: self.description(),
        }
    }
}
