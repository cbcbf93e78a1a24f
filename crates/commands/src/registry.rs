//! Command-type registry used to rebuild commands from records.
//!
//! Registration happens once at startup (`&mut self`); afterwards the registry
//! is shared read-only (typically behind an `Arc`).

use std::collections::HashMap;
use std::sync::Arc;

use crate::command::BoxedCommand;
use crate::error::{CommandError, CommandResult};
use crate::record::CommandRecord;

/// Routine that rebuilds a command from its record.
///
/// Reconstructors capture whatever collaborators the command needs (e.g. the
/// entity store handle).
pub type Reconstructor = Arc<dyn Fn(&CommandRecord) -> CommandResult<BoxedCommand> + Send + Sync>;

/// Mapping from command-type tag to its reconstructor.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    reconstructors: HashMap<String, Reconstructor>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `tag` with a reconstructor. The last registration for a tag wins.
    pub fn register<F>(&mut self, tag: impl Into<String>, reconstructor: F)
    where
        F: Fn(&CommandRecord) -> CommandResult<BoxedCommand> + Send + Sync + 'static,
    {
        let tag = tag.into();
        if self
            .reconstructors
            .insert(tag.clone(), Arc::new(reconstructor))
            .is_some()
        {
            tracing::debug!(tag = %tag, "command reconstructor replaced");
        }
    }

    /// Rebuild a command from `record`.
    ///
    /// Fails with `UnknownCommandType` when no reconstructor is registered for
    /// `record.command_type`.
    pub fn create(&self, record: &CommandRecord) -> CommandResult<BoxedCommand> {
        let reconstructor = self
            .reconstructors
            .get(&record.command_type)
            .ok_or_else(|| CommandError::UnknownCommandType(record.command_type.clone()))?;
        reconstructor(record)
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.reconstructors.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.reconstructors.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl core::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}
