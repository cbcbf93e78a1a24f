//! Slide edit orchestration.
//!
//! `SlideEditor` is the single entry point hosts call for slide edits and
//! their undo/redo. It turns an edit intent into a concrete command and runs
//! it through the presentation's history:
//!
//! ```text
//! EditIntent
//!   ↓
//! 1. Build the command (checking the target slide belongs to the presentation)
//!   ↓
//! 2. Look up (or lazily create) the presentation's history
//!   ↓
//! 3. Lock it: operations on one presentation run one at a time
//!   ↓
//! 4. Execute against the entity store; record on success
//!   ↓
//! 5. Emit the command record as an audit event
//!   ↓
//! 6. Report the resulting slide and history flags, read under the same lock
//! ```
//!
//! ## Error semantics
//!
//! - `NothingToUndo` / `NothingToRedo` are benign; hosts typically disable
//!   the corresponding controls using the returned `HistoryStatus`
//! - an undo rejection is a conflict: the slide changed out-of-band and the
//!   command stays on the undo stack
//! - a failed operation never changes the history, so every error except the
//!   registry ones may be retried
//!
//! Authorization and transport are the host's concern; `actor` is carried for
//! logging and audit only.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Span, debug, info, instrument, warn};

use slidedeck_commands::{
    BoxedCommand, CommandError, CommandHistory, CommandRecord, CommandRegistry, CommandSummary,
    HistoryDirectory, HistoryStatus, SharedHistory,
};
use slidedeck_core::{Entity, PresentationId, SlideId, UserId};
use slidedeck_slides::{Slide, SlideDraft, SlidePatch};

use crate::config::EditorConfig;
use crate::entity_store::{EntityStore, EntityStoreError, SharedStore};
use crate::slide_commands::{
    CreateSlide, DeleteSlide, MoveSlide, UpdateSlide, register_slide_commands,
};

/// Log target of command audit events.
pub const AUDIT_TARGET: &str = "audit";

/// A requested change to one slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlideEdit {
    Create(SlideDraft),
    Update { slide_id: SlideId, patch: SlidePatch },
    Delete { slide_id: SlideId },
    Move { slide_id: SlideId, position: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditIntent {
    pub presentation_id: PresentationId,
    pub actor: UserId,
    pub edit: SlideEdit,
}

/// Result of an edit, undo, redo or replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditOutcome {
    /// The target slide as it is now; `None` when it no longer exists
    /// (e.g. after undoing a create).
    pub slide: Option<Slide>,
    pub command: CommandSummary,
    pub status: HistoryStatus,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("slide {slide_id} belongs to presentation {owner}, not {presentation_id}")]
    ForeignSlide {
        slide_id: SlideId,
        presentation_id: PresentationId,
        owner: PresentationId,
    },

    #[error(transparent)]
    Store(#[from] EntityStoreError),
}

impl EditError {
    /// Nothing to undo/redo.
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::Command(e) if e.is_benign())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Command(e) if e.is_conflict())
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Command(e) => e.is_retryable(),
            Self::ForeignSlide { .. } => false,
            Self::Store(_) => true,
        }
    }
}

pub struct SlideEditor {
    store: SharedStore,
    registry: Arc<CommandRegistry>,
    directory: Arc<HistoryDirectory>,
    config: EditorConfig,
}

impl SlideEditor {
    /// Editor with the slide commands registered and a fresh history directory.
    pub fn new(store: SharedStore, config: EditorConfig) -> Self {
        let mut registry = CommandRegistry::new();
        register_slide_commands(&mut registry, store.clone());
        let directory = HistoryDirectory::new().with_timeout(config.store_timeout);
        Self::from_parts(store, Arc::new(registry), Arc::new(directory), config)
    }

    /// Editor over an existing registry and directory (e.g. shared with other components).
    pub fn from_parts(
        store: SharedStore,
        registry: Arc<CommandRegistry>,
        directory: Arc<HistoryDirectory>,
        config: EditorConfig,
    ) -> Self {
        Self {
            store,
            registry,
            directory,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn directory(&self) -> &HistoryDirectory {
        &self.directory
    }

    /// Execute an edit and record it in the presentation's history.
    ///
    /// A successful edit discards the presentation's redo stack.
    #[instrument(
        skip_all,
        fields(
            presentation_id = %intent.presentation_id,
            actor = %intent.actor,
            command_type = tracing::field::Empty
        )
    )]
    pub async fn apply_edit(&self, intent: EditIntent) -> Result<EditOutcome, EditError> {
        let EditIntent {
            presentation_id,
            actor,
            edit,
        } = intent;

        let command = self.build_command(presentation_id, edit).await?;
        Span::current().record("command_type", command.meta().command_type());

        let shared = self.history(presentation_id);
        let mut history = shared.lock().await;
        let summary = history.execute(command).await?;

        info!(description = %summary.description, "slide edit applied");
        audit("execute", presentation_id, Some(actor), history.peek_undo_record());
        Ok(self.outcome(&history, summary).await)
    }

    /// Undo the presentation's most recent edit.
    #[instrument(skip_all, fields(presentation_id = %presentation_id, actor = %actor))]
    pub async fn undo(
        &self,
        presentation_id: PresentationId,
        actor: UserId,
    ) -> Result<EditOutcome, EditError> {
        let shared = self
            .directory
            .get(presentation_id)
            .ok_or(CommandError::NothingToUndo)?;
        let mut history = shared.lock().await;
        let summary = history
            .undo()
            .await
            .inspect_err(|e| log_rejection(e))?;

        info!(description = %summary.description, "slide edit undone");
        audit("undo", presentation_id, Some(actor), history.peek_redo_record());
        Ok(self.outcome(&history, summary).await)
    }

    /// Re-apply the presentation's most recently undone edit.
    #[instrument(skip_all, fields(presentation_id = %presentation_id, actor = %actor))]
    pub async fn redo(
        &self,
        presentation_id: PresentationId,
        actor: UserId,
    ) -> Result<EditOutcome, EditError> {
        let shared = self
            .directory
            .get(presentation_id)
            .ok_or(CommandError::NothingToRedo)?;
        let mut history = shared.lock().await;
        let summary = history
            .redo()
            .await
            .inspect_err(|e| log_rejection(e))?;

        info!(description = %summary.description, "slide edit redone");
        audit("redo", presentation_id, Some(actor), history.peek_undo_record());
        Ok(self.outcome(&history, summary).await)
    }

    /// Flags and counts for the presentation; all-false when it has no history yet.
    pub async fn history_status(&self, presentation_id: PresentationId) -> HistoryStatus {
        match self.directory.get(presentation_id) {
            Some(shared) => shared.lock().await.status(),
            None => HistoryStatus::default(),
        }
    }

    /// Rebuild a command from `record` and execute it as a fresh edit.
    ///
    /// # Errors
    /// `UnknownCommandType` / `InvalidRecord` when the record cannot be rebuilt;
    /// otherwise the same errors as [`apply_edit`](Self::apply_edit).
    #[instrument(
        skip_all,
        fields(presentation_id = %presentation_id, command_type = %record.command_type)
    )]
    pub async fn replay(
        &self,
        presentation_id: PresentationId,
        record: &CommandRecord,
    ) -> Result<EditOutcome, EditError> {
        let command = self.registry.create(record)?;
        self.ensure_replay_target(presentation_id, record).await?;

        let shared = self.history(presentation_id);
        let mut history = shared.lock().await;
        let summary = history.execute(command).await?;

        info!(description = %summary.description, "command record replayed");
        audit("replay", presentation_id, None, history.peek_undo_record());
        Ok(self.outcome(&history, summary).await)
    }

    /// Discard the presentation's history (on presentation deletion).
    ///
    /// Waits for an in-flight operation on the presentation to finish. Returns
    /// whether a history existed.
    pub async fn forget(&self, presentation_id: PresentationId) -> bool {
        let Some(shared) = self.directory.get(presentation_id) else {
            return false;
        };
        self.directory.remove(presentation_id);
        shared.lock().await.clear();
        info!(%presentation_id, "presentation history forgotten");
        true
    }

    fn history(&self, presentation_id: PresentationId) -> SharedHistory {
        self.directory
            .get_or_create(presentation_id, self.config.max_history_depth)
    }

    async fn build_command(
        &self,
        presentation_id: PresentationId,
        edit: SlideEdit,
    ) -> Result<BoxedCommand, EditError> {
        let store = self.store.clone();
        let command: BoxedCommand = match edit {
            SlideEdit::Create(draft) => Box::new(CreateSlide::new(store, presentation_id, draft)),
            SlideEdit::Update { slide_id, patch } => {
                self.ensure_owned(presentation_id, slide_id).await?;
                Box::new(UpdateSlide::new(store, slide_id, patch))
            }
            SlideEdit::Delete { slide_id } => {
                self.ensure_owned(presentation_id, slide_id).await?;
                Box::new(DeleteSlide::new(store, slide_id))
            }
            SlideEdit::Move { slide_id, position } => {
                self.ensure_owned(presentation_id, slide_id).await?;
                Box::new(MoveSlide::new(store, slide_id, position))
            }
        };
        Ok(command)
    }

    async fn ensure_replay_target(
        &self,
        presentation_id: PresentationId,
        record: &CommandRecord,
    ) -> Result<(), EditError> {
        if record.target_type != Slide::ENTITY_TYPE {
            return Ok(());
        }
        let slide_id = SlideId::from_uuid(record.target_id);
        if record.command_type == CreateSlide::TYPE {
            // The slide does not exist yet; its payload names where it will live.
            let owner = CreateSlide::presentation_of(record)?;
            if owner != presentation_id {
                return Err(EditError::ForeignSlide {
                    slide_id,
                    presentation_id,
                    owner,
                });
            }
            return Ok(());
        }
        self.ensure_owned(presentation_id, slide_id).await
    }

    async fn ensure_owned(
        &self,
        presentation_id: PresentationId,
        slide_id: SlideId,
    ) -> Result<(), EditError> {
        match self.store.fetch(slide_id).await {
            Ok(slide) if slide.presentation_id != presentation_id => Err(EditError::ForeignSlide {
                slide_id,
                presentation_id,
                owner: slide.presentation_id,
            }),
            Ok(_) => Ok(()),
            // A missing slide surfaces as the command's own execution failure.
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn outcome(&self, history: &CommandHistory, command: CommandSummary) -> EditOutcome {
        let status = history.status();
        let slide = if command.target_type == Slide::ENTITY_TYPE {
            match self.store.fetch(SlideId::from_uuid(command.target_id)).await {
                Ok(slide) => Some(slide),
                Err(e) if e.is_not_found() => None,
                Err(e) => {
                    warn!(error = %e, "operation applied but the target could not be read back");
                    None
                }
            }
        } else {
            None
        };
        EditOutcome {
            slide,
            command,
            status,
        }
    }
}

impl core::fmt::Debug for SlideEditor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SlideEditor")
            .field("registry", &self.registry)
            .field("histories", &self.directory.len())
            .field("config", &self.config)
            .finish()
    }
}

fn log_rejection(error: &CommandError) {
    if error.is_benign() {
        debug!(error = %error, "history operation had nothing to do");
    }
}

fn audit(
    action: &'static str,
    presentation_id: PresentationId,
    actor: Option<UserId>,
    record: Option<CommandRecord>,
) {
    let Some(record) = record else {
        return;
    };
    match record.to_json() {
        Ok(json) => info!(
            target: AUDIT_TARGET,
            action,
            %presentation_id,
            actor = ?actor,
            record = %json,
            "slide command"
        ),
        Err(e) => warn!(error = %e, action, "command record could not be serialized for audit"),
    }
}
