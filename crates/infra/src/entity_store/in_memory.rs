use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use slidedeck_core::{PresentationId, SlideId};
use slidedeck_slides::{Slide, SlidePatch, SlideSnapshot};

use super::r#trait::{EntityStore, EntityStoreError};

#[derive(Debug, Default)]
struct Decks {
    /// Slides of each presentation, ordered by position.
    decks: HashMap<PresentationId, Vec<Slide>>,
    /// Which presentation each slide belongs to.
    owners: HashMap<SlideId, PresentationId>,
}

impl Decks {
    fn locate(&self, id: SlideId) -> Result<(PresentationId, usize), EntityStoreError> {
        let presentation_id = *self.owners.get(&id).ok_or(EntityStoreError::NotFound(id))?;
        let index = self
            .decks
            .get(&presentation_id)
            .and_then(|deck| deck.iter().position(|s| s.id == id))
            .ok_or(EntityStoreError::NotFound(id))?;
        Ok((presentation_id, index))
    }

    fn deck_mut(&mut self, presentation_id: PresentationId) -> &mut Vec<Slide> {
        self.decks.entry(presentation_id).or_default()
    }
}

/// Keep positions dense and zero-based after an insert/remove.
fn renumber(deck: &mut [Slide]) {
    for (index, slide) in deck.iter_mut().enumerate() {
        slide.position = index as u32;
    }
}

fn clamp(position: u32, len: usize) -> usize {
    (position as usize).min(len)
}

/// In-memory slide store.
///
/// Intended for tests/dev. Every operation runs under one lock, so each is
/// atomic with respect to the others.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    inner: RwLock<Decks>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slides of a presentation in position order.
    pub fn slides(&self, presentation_id: PresentationId) -> Result<Vec<Slide>, EntityStoreError> {
        let inner = self.read()?;
        Ok(inner.decks.get(&presentation_id).cloned().unwrap_or_default())
    }

    /// Observable state of a presentation, without store bookkeeping.
    pub fn snapshots(
        &self,
        presentation_id: PresentationId,
    ) -> Result<Vec<SlideSnapshot>, EntityStoreError> {
        Ok(self
            .slides(presentation_id)?
            .iter()
            .map(Slide::snapshot)
            .collect())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Decks>, EntityStoreError> {
        self.inner
            .read()
            .map_err(|_| EntityStoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Decks>, EntityStoreError> {
        self.inner
            .write()
            .map_err(|_| EntityStoreError::Unavailable("lock poisoned".to_string()))
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn fetch(&self, id: SlideId) -> Result<Slide, EntityStoreError> {
        let inner = self.read()?;
        let (presentation_id, index) = inner.locate(id)?;
        Ok(inner.decks[&presentation_id][index].clone())
    }

    async fn create(&self, slide: SlideSnapshot) -> Result<Slide, EntityStoreError> {
        slide
            .validate()
            .map_err(|e| EntityStoreError::Validation(e.to_string()))?;

        let mut inner = self.write()?;
        if inner.owners.contains_key(&slide.id) {
            return Err(EntityStoreError::AlreadyExists(slide.id));
        }

        let (id, presentation_id, requested) = (slide.id, slide.presentation_id, slide.position);
        let deck = inner.deck_mut(presentation_id);
        let index = clamp(requested, deck.len());
        deck.insert(index, slide.into_slide(1, Utc::now()));
        renumber(deck);
        let created = deck[index].clone();

        inner.owners.insert(id, presentation_id);
        Ok(created)
    }

    async fn apply_update(&self, id: SlideId, patch: &SlidePatch) -> Result<Slide, EntityStoreError> {
        patch
            .validate()
            .map_err(|e| EntityStoreError::Validation(e.to_string()))?;

        let mut inner = self.write()?;
        let (presentation_id, index) = inner.locate(id)?;
        let slide = &mut inner.deck_mut(presentation_id)[index];
        slide.apply_patch(patch);
        slide.version += 1;
        slide.updated_at = Utc::now();
        Ok(slide.clone())
    }

    async fn delete(&self, id: SlideId) -> Result<Slide, EntityStoreError> {
        let mut inner = self.write()?;
        let (presentation_id, index) = inner.locate(id)?;
        let deck = inner.deck_mut(presentation_id);
        let removed = deck.remove(index);
        renumber(deck);
        if deck.is_empty() {
            inner.decks.remove(&presentation_id);
        }
        inner.owners.remove(&id);
        Ok(removed)
    }

    async fn reorder(&self, id: SlideId, position: u32) -> Result<Slide, EntityStoreError> {
        let mut inner = self.write()?;
        let (presentation_id, index) = inner.locate(id)?;
        let deck = inner.deck_mut(presentation_id);

        let mut slide = deck.remove(index);
        slide.version += 1;
        slide.updated_at = Utc::now();
        let target = clamp(position, deck.len());
        deck.insert(target, slide);
        renumber(deck);
        Ok(deck[target].clone())
    }
}
