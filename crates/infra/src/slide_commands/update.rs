use async_trait::async_trait;
use serde_json::Value as JsonValue;

use slidedeck_commands::{Command, CommandMeta, CommandRecord, CommandResult};
use slidedeck_core::{DomainError, DomainResult, Entity, SlideId};
use slidedeck_slides::{Slide, SlidePatch};

use crate::entity_store::{EntityStore, SharedStore};

/// Apply a partial patch to a slide; undo applies the inverse patch captured
/// just before the forward step.
#[derive(Debug)]
pub struct UpdateSlide {
    meta: CommandMeta,
    slide_id: SlideId,
    patch: SlidePatch,
    inverse: Option<SlidePatch>,
    store: SharedStore,
}

impl UpdateSlide {
    pub const TYPE: &'static str = "slide.update";

    pub fn new(store: SharedStore, slide_id: SlideId, patch: SlidePatch) -> Self {
        Self {
            meta: CommandMeta::new(Self::TYPE, slide_id, Slide::ENTITY_TYPE),
            slide_id,
            patch,
            inverse: None,
            store,
        }
    }

    pub fn from_record(store: SharedStore, record: &CommandRecord) -> CommandResult<Self> {
        let slide_id = super::slide_target(record)?;
        Ok(Self {
            meta: CommandMeta::from_record(record),
            slide_id,
            patch: record.payload_as()?,
            inverse: None,
            store,
        })
    }
}

#[async_trait]
impl Command for UpdateSlide {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn description(&self) -> String {
        match &self.patch.title {
            Some(title) => format!("Rename slide to '{title}'"),
            None => format!("Update slide {}", self.slide_id),
        }
    }

    fn payload(&self) -> JsonValue {
        serde_json::json!(self.patch)
    }

    async fn apply(&mut self) -> DomainResult<()> {
        let current = self.store.fetch(self.slide_id).await?;
        let inverse = self.patch.inverse_against(&current);
        self.store.apply_update(self.slide_id, &self.patch).await?;
        self.inverse = Some(inverse);
        Ok(())
    }

    async fn revert(&mut self) -> DomainResult<()> {
        let inverse = self
            .inverse
            .as_ref()
            .ok_or_else(|| DomainError::invariant("no prior slide state captured"))?;
        self.store.apply_update(self.slide_id, inverse).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use slidedeck_commands::CommandError;
    use slidedeck_core::PresentationId;
    use slidedeck_slides::SlideDraft;

    use crate::entity_store::InMemoryEntityStore;

    async fn seeded() -> (Arc<InMemoryEntityStore>, Slide) {
        let store = Arc::new(InMemoryEntityStore::new());
        let slide = store
            .create(
                SlideDraft::titled("Intro")
                    .with_content(json!({"blocks": []}))
                    .into_snapshot(SlideId::new(), PresentationId::new()),
            )
            .await
            .unwrap();
        (store, slide)
    }

    #[tokio::test]
    async fn undo_restores_only_touched_fields() {
        let (store, slide) = seeded().await;
        let patch = SlidePatch::title("Agenda").with_notes("speak slowly");
        let mut cmd = UpdateSlide::new(store.clone(), slide.id, patch);

        cmd.execute().await.unwrap();
        let updated = store.fetch(slide.id).await.unwrap();
        assert_eq!(updated.title, "Agenda");
        assert_eq!(updated.notes, "speak slowly");

        cmd.undo().await.unwrap();
        let restored = store.fetch(slide.id).await.unwrap();
        assert_eq!(restored.snapshot(), slide.snapshot());
        assert!(restored.version > updated.version);
    }

    #[tokio::test]
    async fn redo_recaptures_current_state() {
        let (store, slide) = seeded().await;
        let mut cmd = UpdateSlide::new(store.clone(), slide.id, SlidePatch::title("Agenda"));
        cmd.execute().await.unwrap();
        cmd.undo().await.unwrap();

        // Out-of-band edit between undo and redo.
        store
            .apply_update(slide.id, &SlidePatch::title("Welcome"))
            .await
            .unwrap();

        cmd.execute().await.unwrap();
        cmd.undo().await.unwrap();
        assert_eq!(store.fetch(slide.id).await.unwrap().title, "Welcome");
    }

    #[tokio::test]
    async fn undo_after_out_of_band_delete_fails() {
        let (store, slide) = seeded().await;
        let mut cmd = UpdateSlide::new(store.clone(), slide.id, SlidePatch::title("Agenda"));
        cmd.execute().await.unwrap();
        store.delete(slide.id).await.unwrap();

        let err = cmd.undo().await.unwrap_err();
        assert!(err.is_conflict());
        assert!(err.cause().is_some_and(DomainError::is_not_found));
    }

    #[tokio::test]
    async fn missing_target_fails_execution() {
        let store = Arc::new(InMemoryEntityStore::new());
        let mut cmd = UpdateSlide::new(store, SlideId::new(), SlidePatch::title("x"));
        let err = cmd.execute().await.unwrap_err();
        assert!(matches!(err, CommandError::Execution { .. }));
    }

    #[test]
    fn describes_renames_by_title() {
        let store = Arc::new(InMemoryEntityStore::new());
        let cmd = UpdateSlide::new(store, SlideId::new(), SlidePatch::title("Agenda"));
        assert_eq!(cmd.description(), "Rename slide to 'Agenda'");
    }
}
