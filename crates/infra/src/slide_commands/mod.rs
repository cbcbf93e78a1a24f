//! Reversible slide commands backed by an [`EntityStore`](crate::entity_store::EntityStore).
//!
//! | tag            | forward                      | reversal                              |
//! |----------------|------------------------------|---------------------------------------|
//! | `slide.create` | create with a fixed identity | delete by that identity               |
//! | `slide.update` | apply a partial patch        | apply the inverse patch captured first |
//! | `slide.delete` | delete, capturing a snapshot | recreate the snapshot (same id, position) |
//! | `slide.move`   | reorder, capturing old index | reorder back to the old index          |
//!
//! Every command targets exactly one slide and captures its prior state inside
//! `apply`, before mutating, so a redo after an undo re-captures fresh state.

mod create;
mod delete;
mod reorder;
mod update;

pub use create::CreateSlide;
pub use delete::DeleteSlide;
pub use reorder::MoveSlide;
pub use update::UpdateSlide;

use slidedeck_commands::{BoxedCommand, CommandError, CommandRecord, CommandRegistry, CommandResult};
use slidedeck_core::{Entity, SlideId};
use slidedeck_slides::Slide;

use crate::entity_store::SharedStore;

/// Register reconstructors for every slide command, bound to `store`.
pub fn register_slide_commands(registry: &mut CommandRegistry, store: SharedStore) {
    let s = store.clone();
    registry.register(CreateSlide::TYPE, move |record| {
        CreateSlide::from_record(s.clone(), record).map(|cmd| Box::new(cmd) as BoxedCommand)
    });

    let s = store.clone();
    registry.register(UpdateSlide::TYPE, move |record| {
        UpdateSlide::from_record(s.clone(), record).map(|cmd| Box::new(cmd) as BoxedCommand)
    });

    let s = store.clone();
    registry.register(DeleteSlide::TYPE, move |record| {
        DeleteSlide::from_record(s.clone(), record).map(|cmd| Box::new(cmd) as BoxedCommand)
    });

    registry.register(MoveSlide::TYPE, move |record| {
        MoveSlide::from_record(store.clone(), record).map(|cmd| Box::new(cmd) as BoxedCommand)
    });
}

/// Target slide of a record, rejecting records aimed at another entity type.
fn slide_target(record: &CommandRecord) -> CommandResult<SlideId> {
    if record.target_type != Slide::ENTITY_TYPE {
        return Err(CommandError::invalid_record(format!(
            "'{}' targets '{}', expected '{}'",
            record.command_type,
            record.target_type,
            Slide::ENTITY_TYPE
        )));
    }
    Ok(SlideId::from_uuid(record.target_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use slidedeck_commands::Command;
    use slidedeck_slides::SlidePatch;

    use crate::entity_store::InMemoryEntityStore;

    #[test]
    fn registers_all_four_tags() {
        let mut registry = CommandRegistry::new();
        register_slide_commands(&mut registry, Arc::new(InMemoryEntityStore::new()));
        assert_eq!(
            registry.tags(),
            vec!["slide.create", "slide.delete", "slide.move", "slide.update"]
        );
    }

    #[test]
    fn record_for_another_entity_type_is_invalid() {
        let store: SharedStore = Arc::new(InMemoryEntityStore::new());
        let mut registry = CommandRegistry::new();
        register_slide_commands(&mut registry, store.clone());

        let mut record = UpdateSlide::new(store, SlideId::new(), SlidePatch::title("x")).to_record();
        record.target_type = "presentation".to_string();

        let err = registry.create(&record).unwrap_err();
        assert!(matches!(err, CommandError::InvalidRecord(_)));
        assert!(!err.is_retryable());
    }
}
