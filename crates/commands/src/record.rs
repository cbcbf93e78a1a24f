//! Serialized command records: the audit and rehydration wire format.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use slidedeck_core::CommandId;

use crate::command::CommandMeta;
use crate::error::{CommandError, CommandResult};

/// Flat, transport-neutral form of a command, used for audit and rehydration.
///
/// Serialized shape:
///
/// ```text
/// {id, type, target_id, target_type, created_at, executed_at, undone_at, payload}
/// ```
///
/// Captured prior state is deliberately absent: a rebuilt command captures it
/// again when it executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    /// Required on the wire so the same record always rehydrates to the same identity.
    pub id: CommandId,
    #[serde(rename = "type")]
    pub command_type: String,
    pub target_id: Uuid,
    pub target_type: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub executed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub undone_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payload: JsonValue,
}

impl CommandRecord {
    pub fn from_parts(meta: &CommandMeta, payload: JsonValue) -> Self {
        Self {
            id: meta.id(),
            command_type: meta.command_type().to_string(),
            target_id: meta.target_id(),
            target_type: meta.target_type().to_string(),
            created_at: meta.created_at(),
            executed_at: meta.executed_at(),
            undone_at: meta.undone_at(),
            payload,
        }
    }

    /// Decode the payload into a command-specific type.
    pub fn payload_as<T: DeserializeOwned>(&self) -> CommandResult<T> {
        serde_json::from_value(self.payload.clone()).map_err(|e| {
            CommandError::invalid_record(format!(
                "payload of '{}' could not be decoded: {e}",
                self.command_type
            ))
        })
    }

    pub fn to_json(&self) -> CommandResult<String> {
        serde_json::to_string(self)
            .map_err(|e| CommandError::invalid_record(format!("serialization failed: {e}")))
    }

    pub fn from_json(raw: &str) -> CommandResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| CommandError::invalid_record(format!("malformed record: {e}")))
    }
}
