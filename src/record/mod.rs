//! Serializable records of executed transitions.
//!
//! The engine never stores records itself. A host that keeps an audit trail
//! builds a record from each [`TransitionResult`] and persists it in JSON or
//! in the compact binary encoding.
//!
//! [`TransitionResult`]: crate::engine::TransitionResult

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::RecordError;

/// Version identifier for the encoded record envelope
pub const RECORD_VERSION: u32 = 1;

/// How an execution ended once a rule was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Guards passed, every action completed and the target state was set.
    Committed,
    /// A guard returned `false`; no action ran.
    Rejected,
    /// A guard or action raised an error.
    Failed,
}

/// Record of a single executed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord<S, E> {
    pub execution_id: Uuid,
    pub lifecycle: String,
    /// Debug rendering of the entity's identifier
    pub entity_id: String,
    pub from: S,
    pub to: S,
    pub event: E,
    pub outcome: Outcome,
    /// Failure message, present when `outcome` is `Failed`
    #[serde(default)]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct Envelope<R> {
    version: u32,
    record: R,
}

impl<S, E> TransitionRecord<S, E>
where
    S: Serialize + for<'de> Deserialize<'de>,
    E: Serialize + for<'de> Deserialize<'de>,
{
    /// The state the entity holds after this execution.
    pub fn resulting_state(&self) -> &S {
        match self.outcome {
            Outcome::Committed => &self.to,
            Outcome::Rejected | Outcome::Failed => &self.from,
        }
    }

    pub fn to_json(&self) -> Result<String, RecordError> {
        serde_json::to_string(&Envelope {
            version: RECORD_VERSION,
            record: self,
        })
        .map_err(|e| RecordError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        let envelope: Envelope<Self> = serde_json::from_str(json)
            .map_err(|e| RecordError::DeserializationFailed(e.to_string()))?;
        check_version(envelope.version)?;
        Ok(envelope.record)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, RecordError> {
        bincode::serialize(&Envelope {
            version: RECORD_VERSION,
            record: self,
        })
        .map_err(|e| RecordError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordError> {
        let envelope: Envelope<Self> = bincode::deserialize(bytes)
            .map_err(|e| RecordError::DeserializationFailed(e.to_string()))?;
        check_version(envelope.version)?;
        Ok(envelope.record)
    }
}

fn check_version(found: u32) -> Result<(), RecordError> {
    if found != RECORD_VERSION {
        return Err(RecordError::UnsupportedVersion {
            found,
            supported: RECORD_VERSION,
        });
    }
    Ok(())
}
