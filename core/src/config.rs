//! Run configuration, loaded from JSON with per-field defaults.

use crate::{
    error::{SimError, SimResult},
    types::{MessageCount, Money},
    weather::Weather,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MINUTES_PER_DAY: u64 = 24 * 60;

/// Longest stretch of simulated time a configured run may cover.
pub const MAX_RUN_DAYS: u64 = 1_000 * 366;

/// Simulated time that elapses between two consecutive steps of a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct StepAdvance {
    pub days: u32,
    pub minutes: u32,
}

impl StepAdvance {
    pub fn total_minutes(&self) -> u64 {
        self.days as u64 * MINUTES_PER_DAY + self.minutes as u64
    }

    pub fn is_zero(&self) -> bool {
        self.total_minutes() == 0
    }

    /// Whether repeated application from an anchor moment is guaranteed
    /// to land exactly on every later anchor moment.
    pub fn lands_on_anchor(&self) -> bool {
        let total = self.total_minutes();
        total == 0 || MINUTES_PER_DAY % total == 0 || total % MINUTES_PER_DAY == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub starting_balance: Money,
    pub daily_fee: Money,
    pub initial_weather: Weather,
    pub anchor_hour: u32,
    pub max_messages: MessageCount,
    pub step_advance: StepAdvance,
    pub weather_seed: u64,
    pub db_path: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            starting_balance: 500,
            daily_fee: 2,
            initial_weather: Weather::Sunny,
            anchor_hour: 6,
            max_messages: 10,
            step_advance: StepAdvance::default(),
            weather_seed: 42,
            db_path: ":memory:".to_string(),
        }
    }
}

impl SimConfig {
    /// Load and validate a config file. Fields absent from the file keep
    /// their default values.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config: SimConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.anchor_hour > 23 {
            return Err(SimError::InvalidConfig {
                reason: format!("anchor_hour must be 0..=23, got {}", self.anchor_hour),
            });
        }
        if self.daily_fee < 0 {
            return Err(SimError::InvalidConfig {
                reason: format!("daily_fee must be non-negative, got {}", self.daily_fee),
            });
        }
        if !self.step_advance.lands_on_anchor() {
            return Err(SimError::InvalidConfig {
                reason: format!(
                    "step_advance of {} minutes would skip over the {:02}:00 anchor; \
                     it must divide or be a multiple of {MINUTES_PER_DAY}",
                    self.step_advance.total_minutes(),
                    self.anchor_hour
                ),
            });
        }
        let span = self.step_advance.total_minutes().checked_mul(self.max_messages);
        if span.map_or(true, |m| m > MAX_RUN_DAYS * MINUTES_PER_DAY) {
            return Err(SimError::InvalidConfig {
                reason: format!(
                    "{} messages of {} minutes each exceed the {MAX_RUN_DAYS}-day run limit",
                    self.max_messages,
                    self.step_advance.total_minutes()
                ),
            });
        }
        Ok(())
    }
}
