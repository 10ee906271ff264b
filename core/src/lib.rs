//! Vending machine operator simulation.
//!
//! A single operator moves through simulated UTC time. Each day at the
//! anchor hour the machine is charged its daily fee, the weather
//! changes, and the decision agent receives a full status report. Every
//! other step the agent acts without new context.

pub mod agent;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod report;
pub mod rng;
pub mod state;
pub mod store;
pub mod types;
pub mod weather;
