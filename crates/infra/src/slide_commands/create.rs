use async_trait::async_trait;
use serde_json::Value as JsonValue;

use slidedeck_commands::{Command, CommandError, CommandMeta, CommandRecord, CommandResult};
use slidedeck_core::{DomainResult, Entity, PresentationId, SlideId};
use slidedeck_slides::{Slide, SlideDraft, SlideSnapshot};

use crate::entity_store::{EntityStore, SharedStore};

/// Create a slide. The identity is fixed at construction so redo after undo
/// recreates the same slide rather than a new one.
#[derive(Debug)]
pub struct CreateSlide {
    meta: CommandMeta,
    slide: SlideSnapshot,
    store: SharedStore,
}

impl CreateSlide {
    pub const TYPE: &'static str = "slide.create";

    pub fn new(store: SharedStore, presentation_id: PresentationId, draft: SlideDraft) -> Self {
        let id = SlideId::new();
        Self {
            meta: CommandMeta::new(Self::TYPE, id, Slide::ENTITY_TYPE),
            slide: draft.into_snapshot(id, presentation_id),
            store,
        }
    }

    pub fn from_record(store: SharedStore, record: &CommandRecord) -> CommandResult<Self> {
        let target = super::slide_target(record)?;
        let slide: SlideSnapshot = record.payload_as()?;
        if slide.id != target {
            return Err(CommandError::invalid_record(format!(
                "payload slide {} does not match target {target}",
                slide.id
            )));
        }
        Ok(Self {
            meta: CommandMeta::from_record(record),
            slide,
            store,
        })
    }

    pub fn slide_id(&self) -> SlideId {
        self.slide.id
    }

    /// Presentation a `slide.create` record creates its slide in.
    pub fn presentation_of(record: &CommandRecord) -> CommandResult<PresentationId> {
        let slide: SlideSnapshot = record.payload_as()?;
        Ok(slide.presentation_id)
    }
}

#[async_trait]
impl Command for CreateSlide {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn description(&self) -> String {
        format!("Create slide '{}'", self.slide.title)
    }

    fn payload(&self) -> JsonValue {
        serde_json::json!(self.slide)
    }

    async fn apply(&mut self) -> DomainResult<()> {
        self.store.create(self.slide.clone()).await?;
        Ok(())
    }

    async fn revert(&mut self) -> DomainResult<()> {
        self.store.delete(self.slide.id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::entity_store::InMemoryEntityStore;

    #[tokio::test]
    async fn undo_removes_and_redo_restores_same_identity() {
        let store = Arc::new(InMemoryEntityStore::new());
        let deck = PresentationId::new();
        let mut cmd = CreateSlide::new(store.clone(), deck, SlideDraft::titled("Intro"));
        let id = cmd.slide_id();

        cmd.execute().await.unwrap();
        assert_eq!(store.fetch(id).await.unwrap().title, "Intro");

        cmd.undo().await.unwrap();
        assert!(store.fetch(id).await.unwrap_err().is_not_found());

        cmd.execute().await.unwrap();
        assert_eq!(store.fetch(id).await.unwrap().position, 0);
    }

    #[tokio::test]
    async fn invalid_draft_fails_execution() {
        let store = Arc::new(InMemoryEntityStore::new());
        let mut cmd = CreateSlide::new(store.clone(), PresentationId::new(), SlideDraft::titled(""));

        let err = cmd.execute().await.unwrap_err();
        assert!(matches!(err, CommandError::Execution { .. }));
        assert!(store.slides(cmd.slide.presentation_id).unwrap().is_empty());
    }

    #[test]
    fn payload_mismatch_is_rejected() {
        let store: SharedStore = Arc::new(InMemoryEntityStore::new());
        let cmd = CreateSlide::new(store.clone(), PresentationId::new(), SlideDraft::titled("A"));
        let mut record = cmd.to_record();
        record.target_id = SlideId::new().into();

        let err = CreateSlide::from_record(store, &record).unwrap_err();
        assert!(matches!(err, CommandError::InvalidRecord(_)));
    }
}
