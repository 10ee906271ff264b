//! The single mutable simulation aggregate.
//!
//! RULE: Only the engine holds a `&mut SimulationState`. Every mutation
//! goes through a named transition below; fields are read-only outside
//! this module.

use crate::{
    clock::SimClock,
    config::SimConfig,
    error::SimResult,
    types::{MessageCount, Money, SimulationId},
    weather::{Weather, WeatherGenerator},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationState {
    id:            SimulationId,
    clock:         SimClock,
    balance:       Money,
    weather:       Weather,
    message_count: MessageCount,
    days_passed:   u64,
    daily_fee:     Money,
}

impl SimulationState {
    /// Fresh state seeded on `date` at the anchor hour with a new v4 id.
    pub fn new(config: &SimConfig, date: NaiveDate) -> SimResult<Self> {
        Self::with_id(uuid::Uuid::new_v4().to_string(), config, date)
    }

    pub fn with_id(id: SimulationId, config: &SimConfig, date: NaiveDate) -> SimResult<Self> {
        Ok(Self {
            id,
            clock:         SimClock::at_anchor(date, config.anchor_hour)?,
            balance:       config.starting_balance,
            weather:       config.initial_weather,
            message_count: 0,
            days_passed:   0,
            daily_fee:     config.daily_fee,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn weather(&self) -> Weather {
        self.weather
    }

    pub fn message_count(&self) -> MessageCount {
        self.message_count
    }

    pub fn days_passed(&self) -> u64 {
        self.days_passed
    }

    pub fn daily_fee(&self) -> Money {
        self.daily_fee
    }

    /// Count one more agent message. Returns the new count.
    pub(crate) fn record_message(&mut self) -> MessageCount {
        self.message_count += 1;
        self.message_count
    }

    /// The state is seeded at the anchor moment, so the first message of a
    /// run lands on an anchor before any simulated time has elapsed.
    /// That first anchor must not be charged as a new day.
    pub fn is_opening_message(&self) -> bool {
        self.message_count <= 1
    }

    pub(crate) fn advance_time(&mut self, days: u32, minutes: u32) -> SimResult<()> {
        self.clock.advance(days, minutes)?;
        Ok(())
    }

    /// One day's rollover: charge the fee (no floor on the balance),
    /// regenerate weather, count the day.
    pub(crate) fn apply_daily_transition(&mut self, weather: &mut dyn WeatherGenerator) {
        self.balance -= self.daily_fee;
        self.weather = weather.next_weather(self.clock.month_number(), self.weather);
        self.days_passed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysRain;

    impl WeatherGenerator for AlwaysRain {
        fn next_weather(&mut self, _month: u32, _previous: Weather) -> Weather {
            Weather::Rainy
        }
    }

    fn fresh(balance: Money, fee: Money) -> SimulationState {
        let config = SimConfig { starting_balance: balance, daily_fee: fee, ..SimConfig::default() };
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        SimulationState::new(&config, date).unwrap()
    }

    #[test]
    fn new_state_is_seeded_at_anchor() {
        let state = fresh(500, 2);
        assert!(state.clock().is_anchor_moment());
        assert_eq!(state.message_count(), 0);
        assert_eq!(state.days_passed(), 0);
        assert_eq!(state.weather(), Weather::Sunny);
        assert!(uuid::Uuid::parse_str(state.id()).is_ok());
    }

    #[test]
    fn daily_transition_charges_fee_and_counts_day() {
        let mut state = fresh(500, 2);
        state.apply_daily_transition(&mut AlwaysRain);
        assert_eq!(state.balance(), 498);
        assert_eq!(state.days_passed(), 1);
        assert_eq!(state.weather(), Weather::Rainy);
    }

    #[test]
    fn balance_goes_negative_without_floor() {
        let mut state = fresh(3, 2);
        for _ in 0..4 {
            state.apply_daily_transition(&mut AlwaysRain);
        }
        assert_eq!(state.balance(), -5);
    }

    #[test]
    fn only_first_message_is_opening() {
        let mut state = fresh(500, 2);
        state.record_message();
        assert!(state.is_opening_message());
        state.record_message();
        assert!(!state.is_opening_message());
    }
}
