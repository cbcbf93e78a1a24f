use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use slidedeck_commands::{Command, CommandMeta, CommandRecord, CommandResult};
use slidedeck_core::{DomainError, DomainResult, Entity, SlideId};
use slidedeck_slides::Slide;

use crate::entity_store::{EntityStore, SharedStore};

#[derive(Debug, Serialize, Deserialize)]
struct MovePayload {
    position: u32,
}

/// Move a slide to a new position; undo moves it back to where it was.
#[derive(Debug)]
pub struct MoveSlide {
    meta: CommandMeta,
    slide_id: SlideId,
    position: u32,
    prior_position: Option<u32>,
    store: SharedStore,
}

impl MoveSlide {
    pub const TYPE: &'static str = "slide.move";

    pub fn new(store: SharedStore, slide_id: SlideId, position: u32) -> Self {
        Self {
            meta: CommandMeta::new(Self::TYPE, slide_id, Slide::ENTITY_TYPE),
            slide_id,
            position,
            prior_position: None,
            store,
        }
    }

    pub fn from_record(store: SharedStore, record: &CommandRecord) -> CommandResult<Self> {
        let slide_id = super::slide_target(record)?;
        let payload: MovePayload = record.payload_as()?;
        Ok(Self {
            meta: CommandMeta::from_record(record),
            slide_id,
            position: payload.position,
            prior_position: None,
            store,
        })
    }
}

#[async_trait]
impl Command for MoveSlide {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn description(&self) -> String {
        format!("Move slide {} to position {}", self.slide_id, self.position)
    }

    fn payload(&self) -> JsonValue {
        serde_json::json!(MovePayload {
            position: self.position
        })
    }

    async fn apply(&mut self) -> DomainResult<()> {
        let current = self.store.fetch(self.slide_id).await?;
        self.store.reorder(self.slide_id, self.position).await?;
        self.prior_position = Some(current.position);
        Ok(())
    }

    async fn revert(&mut self) -> DomainResult<()> {
        let prior = self
            .prior_position
            .ok_or_else(|| DomainError::invariant("no prior position captured"))?;
        self.store.reorder(self.slide_id, prior).await?;
        Ok(())
    }
}
