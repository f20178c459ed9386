use std::env;

use crate::handlers::worker::WorkerHandlerConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub log_event: bool,
    pub enforce_deadline: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            log_event: true,
            enforce_deadline: true,
        }
    }
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let defaults = Self::default();

        let log_event = match lookup("MOCK_COMPUTE_LOG_EVENT") {
            Some(raw) => parse_flag(&raw, "MOCK_COMPUTE_LOG_EVENT")?,
            None => defaults.log_event,
        };

        let enforce_deadline = match lookup("MOCK_COMPUTE_ENFORCE_DEADLINE") {
            Some(raw) => parse_flag(&raw, "MOCK_COMPUTE_ENFORCE_DEADLINE")?,
            None => defaults.enforce_deadline,
        };

        Ok(Self {
            log_event,
            enforce_deadline,
        })
    }

    pub fn handler_config(&self) -> WorkerHandlerConfig {
        WorkerHandlerConfig {
            log_event: self.log_event,
        }
    }
}

fn parse_flag(raw: &str, name: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(format!("{name} must be a boolean (true/false)")),
    }
}
