use async_trait::async_trait;
use serde_json::Value as JsonValue;

use slidedeck_commands::{Command, CommandMeta, CommandRecord, CommandResult};
use slidedeck_core::{DomainError, DomainResult, Entity, SlideId};
use slidedeck_slides::{Slide, SlideSnapshot};

use crate::entity_store::{EntityStore, SharedStore};

/// Delete a slide; undo recreates it with the same identity, position and content.
#[derive(Debug)]
pub struct DeleteSlide {
    meta: CommandMeta,
    slide_id: SlideId,
    removed: Option<SlideSnapshot>,
    store: SharedStore,
}

impl DeleteSlide {
    pub const TYPE: &'static str = "slide.delete";

    pub fn new(store: SharedStore, slide_id: SlideId) -> Self {
        Self {
            meta: CommandMeta::new(Self::TYPE, slide_id, Slide::ENTITY_TYPE),
            slide_id,
            removed: None,
            store,
        }
    }

    pub fn from_record(store: SharedStore, record: &CommandRecord) -> CommandResult<Self> {
        Ok(Self {
            meta: CommandMeta::from_record(record),
            slide_id: super::slide_target(record)?,
            removed: None,
            store,
        })
    }
}

#[async_trait]
impl Command for DeleteSlide {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn description(&self) -> String {
        match &self.removed {
            Some(slide) => format!("Delete slide '{}'", slide.title),
            None => format!("Delete slide {}", self.slide_id),
        }
    }

    fn payload(&self) -> JsonValue {
        serde_json::json!({})
    }

    async fn apply(&mut self) -> DomainResult<()> {
        let current = self.store.fetch(self.slide_id).await?;
        self.store.delete(self.slide_id).await?;
        self.removed = Some(current.snapshot());
        Ok(())
    }

    async fn revert(&mut self) -> DomainResult<()> {
        let removed = self
            .removed
            .clone()
            .ok_or_else(|| DomainError::invariant("no deleted slide captured"))?;
        self.store.create(removed).await?;
        Ok(())
    }
}
