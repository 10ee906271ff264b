//! Daily weather for the machine's location.
//!
//! Weather is regenerated once per day rollover from the month and the
//! previous day's weather. The engine only depends on the
//! WeatherGenerator trait; SeasonalWeather is the built-in generator.

use crate::{
    clock::Season,
    rng::{RngSlot, SimRng},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Sunny,
    Cloudy,
    Rainy,
    Stormy,
    Snowy,
    Foggy,
}

impl Weather {
    /// Table order for weight arrays. Append only.
    pub const ALL: [Weather; 6] = [
        Self::Sunny,
        Self::Cloudy,
        Self::Rainy,
        Self::Stormy,
        Self::Snowy,
        Self::Foggy,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sunny  => "sunny",
            Self::Cloudy => "cloudy",
            Self::Rainy  => "rainy",
            Self::Stormy => "stormy",
            Self::Snowy  => "snowy",
            Self::Foggy  => "foggy",
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Weather {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|w| w.label() == wanted)
            .ok_or_else(|| format!("unknown weather label '{s}'"))
    }
}

/// Produces the next day's weather. May be stochastic; callers assume
/// nothing beyond "returns one valid label".
pub trait WeatherGenerator: Send {
    fn next_weather(&mut self, month: u32, previous: Weather) -> Weather;
}

/// Probability that yesterday's weather simply carries over.
pub const PERSISTENCE_PROBABILITY: f64 = 0.4;

/// Seeded, season-weighted generator with day-to-day persistence.
pub struct SeasonalWeather {
    rng: SimRng,
}

impl SeasonalWeather {
    pub fn new(seed: u64) -> Self {
        Self { rng: SimRng::new(seed, RngSlot::Weather) }
    }

    /// Draw weights in `Weather::ALL` order.
    pub fn weights_for_month(month: u32) -> [f64; 6] {
        // sunny, cloudy, rainy, stormy, snowy, foggy
        let mut weights = match Season::for_month(month) {
            Season::Winter => [0.25, 0.30, 0.10, 0.05, 0.20, 0.10],
            Season::Spring => [0.35, 0.25, 0.25, 0.05, 0.00, 0.10],
            Season::Summer => [0.50, 0.20, 0.10, 0.15, 0.00, 0.05],
            Season::Fall   => [0.30, 0.30, 0.20, 0.05, 0.00, 0.15],
        };
        // Shoulder months still see the odd snow day.
        if month == 3 || month == 11 {
            weights[4] = 0.05;
        }
        weights
    }
}

impl WeatherGenerator for SeasonalWeather {
    fn next_weather(&mut self, month: u32, previous: Weather) -> Weather {
        let weights = Self::weights_for_month(month);
        let previous_allowed = Weather::ALL
            .iter()
            .position(|w| *w == previous)
            .map(|i| weights[i] > 0.0)
            .unwrap_or(false);

        if previous_allowed && self.rng.chance(PERSISTENCE_PROBABILITY) {
            return previous;
        }
        Weather::ALL[self.rng.weighted_index(&weights)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_str() {
        for w in Weather::ALL {
            assert_eq!(w.label().parse::<Weather>(), Ok(w));
        }
        assert_eq!(" Sunny ".parse::<Weather>(), Ok(Weather::Sunny));
        assert!("hail".parse::<Weather>().is_err());
    }

    #[test]
    fn no_snow_in_summer() {
        let mut generator = SeasonalWeather::new(1);
        let mut prev = Weather::Snowy;
        for _ in 0..500 {
            prev = generator.next_weather(7, prev);
            assert_ne!(prev, Weather::Snowy, "snow drawn in July");
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SeasonalWeather::new(2024);
        let mut b = SeasonalWeather::new(2024);
        let (mut wa, mut wb) = (Weather::Sunny, Weather::Sunny);
        for month in (1..=12).cycle().take(120) {
            wa = a.next_weather(month, wa);
            wb = b.next_weather(month, wb);
            assert_eq!(wa, wb);
        }
    }
}
