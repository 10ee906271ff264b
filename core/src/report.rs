//! Daily business report handed to the decision agent at anchor steps.
//!
//! The report is a pure function of SimulationState: no clock reads,
//! no randomness. Inventory and sales sections are placeholders until
//! those subsystems exist.

use crate::state::SimulationState;
use chrono::Datelike;

const RULE: &str = "=================================================================";

pub fn build_daily_report(state: &SimulationState) -> String {
    let clock = state.clock();
    let now = clock.now();

    format!(
        "DAILY BUSINESS REPORT - {day}, {month} {date}, {year} at {time}
{RULE}

FINANCIAL STATUS:
- Current Balance: ${balance}
- Days in Operation: {days}
- Daily Fee: ${fee}

ENVIRONMENTAL CONDITIONS:
- Weather: {weather}
- Season: {season}

OPERATIONAL STATUS:
- Total Messages/Actions: {messages}
- Simulation ID: {id}

INVENTORY: (Placeholder - to be implemented)
- [Inventory details will be added when vending machine integration is complete]

YESTERDAY'S SALES: (Placeholder - to be implemented)
- [Sales data will be added when sales simulation is integrated]

ACTION REQUIRED: Continue managing your vending machine business.",
        day = clock.day_of_week(),
        month = clock.month().name(),
        date = now.day(),
        year = now.year(),
        time = now.format("%H:%M UTC"),
        balance = state.balance(),
        days = state.days_passed(),
        fee = state.daily_fee(),
        weather = state.weather(),
        season = clock.season(),
        messages = state.message_count(),
        id = state.id(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use chrono::NaiveDate;

    fn sample_state() -> SimulationState {
        let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(); // a Monday
        SimulationState::with_id("sim-fixed".into(), &SimConfig::default(), date).unwrap()
    }

    #[test]
    fn header_names_day_month_and_anchor_time() {
        let report = build_daily_report(&sample_state());
        let first = report.lines().next().unwrap();
        assert_eq!(first, "DAILY BUSINESS REPORT - Monday, January 6, 2025 at 06:00 UTC");
    }

    #[test]
    fn report_is_stable_for_unchanged_state() {
        let state = sample_state();
        assert_eq!(build_daily_report(&state), build_daily_report(&state));
    }

    #[test]
    fn report_sections_are_separated_by_blank_lines() {
        let report = build_daily_report(&sample_state());
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[1], RULE);
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "FINANCIAL STATUS:");
        assert_eq!(
            lines.last().copied(),
            Some("ACTION REQUIRED: Continue managing your vending machine business.")
        );
        assert!(!report.ends_with('\n'));
    }

    #[test]
    fn report_carries_every_section() {
        let report = build_daily_report(&sample_state());
        for needle in [
            "- Current Balance: $500",
            "- Days in Operation: 0",
            "- Daily Fee: $2",
            "- Weather: sunny",
            "- Season: Winter",
            "- Total Messages/Actions: 0",
            "- Simulation ID: sim-fixed",
            "INVENTORY: (Placeholder - to be implemented)",
            "YESTERDAY'S SALES: (Placeholder - to be implemented)",
        ] {
            assert!(report.contains(needle), "report missing {needle:?}:\n{report}");
        }
    }
}
