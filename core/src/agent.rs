//! Decision agent contract and the built-in offline operator.
//!
//! The engine calls `act` exactly once per step: with the full daily
//! report at anchor steps, with no context otherwise. An agent keeps
//! whatever memory it needs between calls; the engine never passes it
//! state directly.

use crate::{error::SimResult, types::Money};

pub trait DecisionAgent: Send {
    fn name(&self) -> &str;

    /// Produce one action. `context` is the daily report text when present.
    /// Any error ends the run.
    fn act(&mut self, context: Option<&str>) -> SimResult<String>;
}

/// Balance below which the operator switches to cost-cutting mode.
pub const LOW_BALANCE_THRESHOLD: Money = 100;

const ROUTINE_ACTIONS: [&str; 5] = [
    "Checking machine status and coin levels",
    "Watching foot traffic near the machine",
    "Reviewing which slots are selling fastest",
    "Comparing supplier prices for the next restock",
    "Wiping down the machine front and display",
];

/// Deterministic rule-based operator. Reads the balance and weather
/// lines out of each daily report and plans the day around them.
pub struct OperatorAgent {
    name:          String,
    last_report:   Option<String>,
    last_balance:  Option<Money>,
    last_weather:  Option<String>,
    routine_index: usize,
}

impl OperatorAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:          name.into(),
            last_report:   None,
            last_balance:  None,
            last_weather:  None,
            routine_index: 0,
        }
    }

    pub fn last_report(&self) -> Option<&str> {
        self.last_report.as_deref()
    }

    pub fn last_balance(&self) -> Option<Money> {
        self.last_balance
    }

    fn absorb_report(&mut self, report: &str) {
        self.last_balance = report_field(report, "Current Balance")
            .and_then(|v| v.trim_start_matches('$').parse().ok());
        self.last_weather = report_field(report, "Weather").map(str::to_string);
        self.last_report = Some(report.to_string());
        self.routine_index = 0;
    }

    fn plan_for_day(&self) -> String {
        let stock = match self.last_weather.as_deref() {
            Some("sunny") => "front-load cold drinks and water",
            Some("rainy") | Some("stormy") => "shift toward snacks and hot drinks",
            Some("snowy") => "stock hot drinks and comfort snacks",
            Some(_) => "keep the current product mix",
            None => "keep the current product mix until conditions are known",
        };
        match self.last_balance {
            Some(b) if b < LOW_BALANCE_THRESHOLD => {
                format!("{stock}; balance is low (${b}), defer any restock spending")
            }
            Some(b) => format!("{stock}; balance ${b} covers normal operations"),
            None => stock.to_string(),
        }
    }
}

impl DecisionAgent for OperatorAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn act(&mut self, context: Option<&str>) -> SimResult<String> {
        match context {
            Some(report) => {
                self.absorb_report(report);
                log::debug!("agent {}: absorbed daily report", self.name);
                Ok(format!("New day acknowledged. Plan: {}.", self.plan_for_day()))
            }
            None if self.last_report.is_none() => {
                Ok("No daily report received yet; holding position.".to_string())
            }
            None => {
                let action = ROUTINE_ACTIONS[self.routine_index % ROUTINE_ACTIONS.len()];
                self.routine_index += 1;
                Ok(format!("{action}."))
            }
        }
    }
}

/// Value of a `- Label: value` line in a daily report.
fn report_field<'a>(report: &'a str, label: &str) -> Option<&'a str> {
    report.lines().find_map(|line| {
        line.trim()
            .strip_prefix("- ")
            .and_then(|rest| rest.strip_prefix(label))
            .and_then(|rest| rest.strip_prefix(':'))
            .map(str::trim)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "DAILY BUSINESS REPORT\n\
        FINANCIAL STATUS:\n\
        - Current Balance: $42\n\
        ENVIRONMENTAL CONDITIONS:\n\
        - Weather: rainy\n";

    #[test]
    fn reads_balance_and_weather_from_report() {
        let mut agent = OperatorAgent::new("VendingBot");
        let reply = agent.act(Some(REPORT)).unwrap();
        assert_eq!(agent.last_balance(), Some(42));
        assert!(reply.contains("snacks and hot drinks"), "{reply}");
        assert!(reply.contains("balance is low"), "{reply}");
    }

    #[test]
    fn routine_actions_cycle_after_a_report() {
        let mut agent = OperatorAgent::new("VendingBot");
        assert!(agent.act(None).unwrap().contains("No daily report"));
        agent.act(Some(REPORT)).unwrap();
        let first = agent.act(None).unwrap();
        for _ in 1..ROUTINE_ACTIONS.len() {
            agent.act(None).unwrap();
        }
        assert_eq!(agent.act(None).unwrap(), first);
    }
}
