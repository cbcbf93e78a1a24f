//! Infrastructure layer: entity store boundary, slide commands, edit orchestration, config.

pub mod config;
pub mod entity_store;
pub mod slide_commands;
pub mod slide_editor;


pub use config::{ConfigError, EditorConfig};
pub use entity_store::{EntityStore, EntityStoreError, InMemoryEntityStore, SharedStore};
pub use slide_commands::{CreateSlide, DeleteSlide, MoveSlide, UpdateSlide, register_slide_commands};
pub use slide_editor::{EditError, EditIntent, EditOutcome, SlideEdit, SlideEditor};
