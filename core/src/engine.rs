//! The simulation engine: clock, day rollover and agent cadence.
//!
//! STEP ORDER (fixed, never reordered):
//!   1. Count the message.
//!   2. Test the CURRENT time for the anchor moment.
//!   3. Anchor step: roll the day over (skipped on the opening message),
//!      build the daily report, call the agent with it.
//!      Regular step: call the agent with no context.
//!   4. Persist (id, time, balance) through the StateLogger.
//!
//! RULES:
//!   - The engine exclusively owns SimulationState.
//!   - The agent and the logger are each called exactly once per step.
//!   - Time only moves between steps, never inside one.
//!   - Nothing is retried and nothing is rolled back on failure.

use crate::{
    agent::DecisionAgent,
    config::SimConfig,
    error::{SimError, SimResult},
    report::build_daily_report,
    state::SimulationState,
    store::StateLogger,
    types::{MessageCount, Money, SimulationId},
    weather::WeatherGenerator,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Anchor,
    Regular,
}

/// What one step did, for the caller to display.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub message:  MessageCount,
    pub kind:     StepKind,
    pub time:     DateTime<Utc>,
    /// Daily report handed to the agent; only set on anchor steps.
    pub report:   Option<String>,
    pub response: String,
}

/// Why a run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Termination {
    Completed,
    Cancelled,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub simulation_id: SimulationId,
    pub messages:      MessageCount,
    pub days_passed:   u64,
    pub balance:       Money,
    pub termination:   Termination,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Final Stats: {} messages, {} days, Balance: ${}",
            self.messages, self.days_passed, self.balance
        )
    }
}

/// Cooperative cancellation, checked between steps. Clones share one flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct SimEngine<'a> {
    config:     SimConfig,
    state:      SimulationState,
    weather:    Box<dyn WeatherGenerator>,
    agent:      Box<dyn DecisionAgent>,
    logger:     &'a mut dyn StateLogger,
}

impl<'a> SimEngine<'a> {
    /// Engine seeded at today's date (UTC) on the anchor hour.
    pub fn new(
        config: SimConfig,
        weather: Box<dyn WeatherGenerator>,
        agent: Box<dyn DecisionAgent>,
        logger: &'a mut dyn StateLogger,
    ) -> SimResult<Self> {
        let today = Utc::now().date_naive();
        Self::starting_at(today, config, weather, agent, logger)
    }

    /// Engine seeded on a fixed date. Used by tests and replays.
    pub fn starting_at(
        date: NaiveDate,
        config: SimConfig,
        weather: Box<dyn WeatherGenerator>,
        agent: Box<dyn DecisionAgent>,
        logger: &'a mut dyn StateLogger,
    ) -> SimResult<Self> {
        let state = SimulationState::new(&config, date)?;
        Self::from_state(state, config, weather, agent, logger)
    }

    /// Wrap an existing state and persist it as the run's opening row.
    pub fn from_state(
        state: SimulationState,
        config: SimConfig,
        weather: Box<dyn WeatherGenerator>,
        agent: Box<dyn DecisionAgent>,
        logger: &'a mut dyn StateLogger,
    ) -> SimResult<Self> {
        config.validate()?;
        logger.log_state(state.id(), state.clock().now(), state.balance())?;
        log::info!(
            "simulation {} created at {} with balance ${}",
            state.id(),
            state.clock().now(),
            state.balance()
        );
        Ok(Self { config, state, weather, agent, logger })
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn simulation_id(&self) -> &str {
        self.state.id()
    }

    pub fn agent_name(&self) -> &str {
        self.agent.name()
    }

    /// The validated configuration this engine was built with.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Move simulated time forward.
    pub fn advance(&mut self, days: u32, minutes: u32) -> SimResult<DateTime<Utc>> {
        self.state.advance_time(days, minutes)?;
        Ok(self.state.clock().now())
    }

    /// Run one agent turn. This is the core simulation step.
    pub fn step(&mut self) -> SimResult<StepOutcome> {
        let message = self.state.record_message();
        let time = self.state.clock().now();

        let (kind, report, response) = if self.state.clock().is_anchor_moment() {
            if self.state.is_opening_message() {
                log::debug!("message={message} opening anchor at {time}: no rollover");
            } else {
                self.state.apply_daily_transition(self.weather.as_mut());
                log::info!(
                    "message={message} day {} rolled over: balance=${} weather={}",
                    self.state.days_passed(),
                    self.state.balance(),
                    self.state.weather()
                );
            }
            let report = build_daily_report(&self.state);
            let response = self.agent.act(Some(report.as_str()))?;
            (StepKind::Anchor, Some(report), response)
        } else {
            let response = self.agent.act(None)?;
            (StepKind::Regular, None, response)
        };

        self.logger
            .log_state(self.state.id(), self.state.clock().now(), self.state.balance())?;
        log::debug!("message={message} kind={kind:?} at {time}");

        Ok(StepOutcome { message, kind, time, report, response })
    }

    /// Skip a whole day outside the step cadence: advance 24 hours, roll
    /// the day over and persist. Does not count as an agent message.
    /// Returns the new day's report.
    pub fn run_day(&mut self) -> SimResult<String> {
        self.state.advance_time(1, 0)?;
        self.state.apply_daily_transition(self.weather.as_mut());
        self.logger
            .log_state(self.state.id(), self.state.clock().now(), self.state.balance())?;
        log::info!(
            "skipped to day {}: balance=${}",
            self.state.days_passed(),
            self.state.balance()
        );
        Ok(build_daily_report(&self.state))
    }

    /// Step until `max_messages` have been taken, the flag is cancelled,
    /// or a step fails. Time advances by `config.step_advance` after each
    /// completed step. Never returns an error: how the run ended is
    /// recorded on the summary.
    pub fn run(
        &mut self,
        max_messages: MessageCount,
        cancel: &CancelFlag,
        mut on_step: impl FnMut(&StepOutcome),
    ) -> RunSummary {
        let advance = self.config.step_advance;

        let termination = loop {
            if self.state.message_count() >= max_messages {
                break Termination::Completed;
            }
            if cancel.is_cancelled() {
                let err = SimError::Cancelled { message_count: self.state.message_count() };
                log::warn!("{err}");
                break Termination::Cancelled;
            }
            let stepped = self.step().and_then(|outcome| {
                on_step(&outcome);
                if advance.is_zero() {
                    Ok(())
                } else {
                    self.state.advance_time(advance.days, advance.minutes)
                }
            });
            if let Err(e) = stepped {
                log::error!("run stopped at message {}: {e}", self.state.message_count());
                break Termination::Failed { error: e.to_string() };
            }
        };

        self.summary(termination)
    }

    pub fn summary(&self, termination: Termination) -> RunSummary {
        RunSummary {
            simulation_id: self.state.id().to_string(),
            messages:      self.state.message_count(),
            days_passed:   self.state.days_passed(),
            balance:       self.state.balance(),
            termination,
        }
    }
}
