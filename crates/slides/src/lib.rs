//! Slides domain module.
//!
//! This crate contains the slide model and its validation rules, implemented
//! purely as deterministic domain logic (no IO, no storage).

pub mod slide;

pub use slide::{APPEND_POSITION, MAX_TITLE_LEN, Slide, SlideDraft, SlidePatch, SlideSnapshot};
