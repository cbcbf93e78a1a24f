use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use slidedeck_core::{DomainError, SlideId};
use slidedeck_slides::{Slide, SlidePatch, SlideSnapshot};

/// Entity store operation error.
///
/// `NotFound` is kept apart from every other rejection so callers can tell a
/// missing target from a refused or failed operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntityStoreError {
    #[error("slide {0} not found")]
    NotFound(SlideId),

    #[error("slide {0} already exists")]
    AlreadyExists(SlideId),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend could not be reached or failed internally.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl EntityStoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<EntityStoreError> for DomainError {
    fn from(value: EntityStoreError) -> Self {
        match value {
            EntityStoreError::NotFound(id) => DomainError::not_found(format!("slide {id}")),
            EntityStoreError::AlreadyExists(id) => {
                DomainError::conflict(format!("slide {id} already exists"))
            }
            EntityStoreError::Validation(msg) => DomainError::Validation(msg),
            EntityStoreError::Conflict(msg) => DomainError::Conflict(msg),
            EntityStoreError::Unavailable(msg) => DomainError::Unavailable(msg),
        }
    }
}

/// Durable holder of slide state; the engine delegates every mutation to it.
///
/// Every operation is awaitable and is the only place commands suspend.
/// Implementations must:
/// - keep positions dense and zero-based within a presentation
/// - report a missing slide as `NotFound`, never as another variant
/// - apply each operation atomically (no partially applied reorder/insert)
#[async_trait]
pub trait EntityStore: Send + Sync + core::fmt::Debug {
    async fn fetch(&self, id: SlideId) -> Result<Slide, EntityStoreError>;

    /// Create a slide with the snapshot's identity and content.
    ///
    /// The requested position is clamped to the end of the presentation; later
    /// slides shift down by one.
    async fn create(&self, slide: SlideSnapshot) -> Result<Slide, EntityStoreError>;

    async fn apply_update(&self, id: SlideId, patch: &SlidePatch) -> Result<Slide, EntityStoreError>;

    /// Remove a slide, returning it as it was before removal.
    async fn delete(&self, id: SlideId) -> Result<Slide, EntityStoreError>;

    /// Move a slide to `position` (clamped), shifting the slides in between.
    async fn reorder(&self, id: SlideId, position: u32) -> Result<Slide, EntityStoreError>;
}

/// Store handle shared by commands and the editor.
pub type SharedStore = Arc<dyn EntityStore>;

#[async_trait]
impl<S> EntityStore for Arc<S>
where
    S: EntityStore + ?Sized,
{
    async fn fetch(&self, id: SlideId) -> Result<Slide, EntityStoreError> {
        (**self).fetch(id).await
    }

    async fn create(&self, slide: SlideSnapshot) -> Result<Slide, EntityStoreError> {
        (**self).create(slide).await
    }

    async fn apply_update(&self, id: SlideId, patch: &SlidePatch) -> Result<Slide, EntityStoreError> {
        (**self).apply_update(id, patch).await
    }

    async fn delete(&self, id: SlideId) -> Result<Slide, EntityStoreError> {
        (**self).delete(id).await
    }

    async fn reorder(&self, id: SlideId, position: u32) -> Result<Slide, EntityStoreError> {
        (**self).reorder(id, position).await
    }
}
