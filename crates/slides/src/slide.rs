use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use slidedeck_core::{DomainError, DomainResult, Entity, PresentationId, SlideId};

/// Longest accepted slide title, in characters.
pub const MAX_TITLE_LEN: usize = 256;

/// Snapshot position meaning "after the last slide"; stores clamp it to the end.
pub const APPEND_POSITION: u32 = u32::MAX;

/// A slide as held by the entity store.
///
/// `version` and `updated_at` are store bookkeeping: they move forward on every
/// mutation, including the ones that restore earlier content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub id: SlideId,
    pub presentation_id: PresentationId,
    /// Zero-based, dense position within the presentation.
    pub position: u32,
    pub title: String,
    /// Layout elements (free-form JSON object).
    pub content: JsonValue,
    pub notes: String,
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

impl Slide {
    /// Observable content of the slide, without store bookkeeping.
    pub fn snapshot(&self) -> SlideSnapshot {
        SlideSnapshot {
            id: self.id,
            presentation_id: self.presentation_id,
            position: self.position,
            title: self.title.clone(),
            content: self.content.clone(),
            notes: self.notes.clone(),
        }
    }

    /// Apply the fields present in `patch`, leaving the others untouched.
    pub fn apply_patch(&mut self, patch: &SlidePatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
    }
}

impl Entity for Slide {
    type Id = SlideId;

    const ENTITY_TYPE: &'static str = "slide";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Full content of a slide, sufficient to (re)create it with the same identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideSnapshot {
    pub id: SlideId,
    pub presentation_id: PresentationId,
    /// Omitted on the wire when it is [`APPEND_POSITION`].
    #[serde(default = "append_position", skip_serializing_if = "is_append")]
    pub position: u32,
    pub title: String,
    pub content: JsonValue,
    pub notes: String,
}

fn append_position() -> u32 {
    APPEND_POSITION
}

fn is_append(position: &u32) -> bool {
    *position == APPEND_POSITION
}

impl SlideSnapshot {
    pub fn validate(&self) -> DomainResult<()> {
        validate_title(&self.title)?;
        validate_content(&self.content)
    }

    /// Materialize the snapshot as a stored slide.
    pub fn into_slide(self, version: u64, updated_at: DateTime<Utc>) -> Slide {
        Slide {
            id: self.id,
            presentation_id: self.presentation_id,
            position: self.position,
            title: self.title,
            content: self.content,
            notes: self.notes,
            version,
            updated_at,
        }
    }
}

/// Content of a slide that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideDraft {
    pub title: String,
    #[serde(default)]
    pub content: JsonValue,
    #[serde(default)]
    pub notes: String,
    /// Requested position; `None` appends at the end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl SlideDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn at(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_content(mut self, content: JsonValue) -> Self {
        self.content = content;
        self
    }

    /// Bind the draft to an identity. An unset position becomes [`APPEND_POSITION`].
    pub fn into_snapshot(self, id: SlideId, presentation_id: PresentationId) -> SlideSnapshot {
        SlideSnapshot {
            id,
            presentation_id,
            position: self.position.unwrap_or(APPEND_POSITION),
            title: self.title,
            content: self.content,
            notes: self.notes,
        }
    }
}

/// Partial update of a slide's content. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlidePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SlidePatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: JsonValue) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.notes.is_none()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.is_empty() {
            return Err(DomainError::validation("patch must change at least one field"));
        }
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(content) = &self.content {
            validate_content(content)?;
        }
        Ok(())
    }

    /// The patch that puts back `slide`'s current values for every field this
    /// patch touches.
    pub fn inverse_against(&self, slide: &Slide) -> SlidePatch {
        SlidePatch {
            title: self.title.as_ref().map(|_| slide.title.clone()),
            content: self.content.as_ref().map(|_| slide.content.clone()),
            notes: self.notes.as_ref().map(|_| slide.notes.clone()),
        }
    }
}

fn validate_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::validation("title cannot be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::validation(format!(
            "title cannot exceed {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_content(content: &JsonValue) -> DomainResult<()> {
    match content {
        JsonValue::Null | JsonValue::Object(_) => Ok(()),
        _ => Err(DomainError::validation("content must be a JSON object")),
    }
}
