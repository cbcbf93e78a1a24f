//! `slidedeck-commands`: the undo/redo engine.
//!
//! Reversible commands, their serialized records and the registry that rebuilds
//! them, the bounded per-presentation history, and the directory that owns one
//! history per presentation.

pub mod command;
pub mod directory;
pub mod error;
pub mod history;
pub mod record;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use command::{BoxedCommand, Command, CommandMeta, CommandState, CommandSummary};
pub use directory::{HistoryDirectory, SharedHistory};
pub use error::{CommandError, CommandResult};
pub use history::{CommandHistory, DEFAULT_MAX_DEPTH, HistoryStatus};
pub use record::CommandRecord;
pub use registry::{CommandRegistry, Reconstructor};
