//! Core data models, parsing, and the guardian cycle.

pub mod agent;
pub mod cli_runner;
pub mod guardian;
pub mod logging;
pub mod models;
pub mod parser;
pub mod severity;

pub use agent::{AgentClient, CommandAgent};
pub use guardian::{CycleFailure, CyclePhase, CycleReport, Guardian, RemediationOutcome, StatusReport};
pub use models::{Event, EventAction, HistoryDocument, RobotOutput, UsageRecord};
pub use parser::parse_status_output;
pub use severity::SeverityLevel;
