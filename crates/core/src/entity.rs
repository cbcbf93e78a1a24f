//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Commands target exactly one entity; `ENTITY_TYPE` is the tag recorded
/// alongside the target identifier.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Stable entity type tag (e.g. "slide").
    const ENTITY_TYPE: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
