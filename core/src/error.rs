use crate::types::MessageCount;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Decision agent failed at message {message_count}: {reason}")]
    Agent { message_count: MessageCount, reason: String },

    #[error("Simulated time overflowed advancing {days}d {minutes}m from {from}")]
    TimeOverflow { from: DateTime<Utc>, days: u32, minutes: u32 },

    #[error("Simulation cancelled after message {message_count}")]
    Cancelled { message_count: MessageCount },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
