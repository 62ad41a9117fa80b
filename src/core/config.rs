/*!
 * Scheduler Configuration
 * Quantum and aging parameters with environment overrides
 */

use super::errors::{SchedulerError, SchedulerResult};
use super::limits::{
    DEFAULT_AGING_INTERVAL, DEFAULT_AGING_STEP, DEFAULT_QUANTUM, MAX_PRIORITY, MIN_PRIORITY,
};
use super::types::{Priority, Tick};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Scheduler configuration
///
/// Environment variables (read by [`SchedulerConfig::from_env`]):
/// - KERNEL_SCHED_QUANTUM: lowest-tier time slice in ticks (default: 100)
/// - KERNEL_AGING_INTERVAL: ticks waited per aging step (default: 1500)
/// - KERNEL_AGING_STEP: priority gained per aging step (default: 10)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub quantum: Tick,
    pub aging_interval: Tick,
    pub aging_step: Priority,
    pub aging_ceiling: Priority,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            quantum: DEFAULT_QUANTUM,
            aging_interval: DEFAULT_AGING_INTERVAL,
            aging_step: DEFAULT_AGING_STEP,
            aging_ceiling: MAX_PRIORITY,
        }
    }
}

impl SchedulerConfig {
    /// Build configuration from defaults overridden by `KERNEL_*` variables
    pub fn from_env() -> SchedulerResult<Self> {
        let mut config = Self::default();

        if let Some(quantum) = read_var("KERNEL_SCHED_QUANTUM")? {
            config.quantum = quantum;
        }
        if let Some(interval) = read_var("KERNEL_AGING_INTERVAL")? {
            config.aging_interval = interval;
        }
        if let Some(step) = read_var("KERNEL_AGING_STEP")? {
            config.aging_step = step;
        }

        config.validate()?;
        info!(
            quantum = config.quantum,
            aging_interval = config.aging_interval,
            aging_step = config.aging_step,
            "Scheduler configuration loaded"
        );
        Ok(config)
    }

    pub fn with_quantum(mut self, quantum: Tick) -> Self {
        self.quantum = quantum;
        self
    }

    pub fn with_aging(mut self, interval: Tick, step: Priority) -> Self {
        self.aging_interval = interval;
        self.aging_step = step;
        self
    }

    /// Reject values the scheduler cannot operate with
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.quantum == 0 {
            return Err(SchedulerError::InvalidConfig(
                "quantum must be at least one tick".into(),
            ));
        }
        if self.aging_interval == 0 {
            return Err(SchedulerError::InvalidConfig(
                "aging interval must be at least one tick".into(),
            ));
        }
        if self.aging_step < 0 {
            return Err(SchedulerError::InvalidConfig(format!(
                "aging step {} would lower priorities",
                self.aging_step
            )));
        }
        if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&self.aging_ceiling) {
            return Err(SchedulerError::InvalidConfig(format!(
                "aging ceiling {} outside [{}, {}]",
                self.aging_ceiling, MIN_PRIORITY, MAX_PRIORITY
            )));
        }
        Ok(())
    }
}

fn read_var<T: std::str::FromStr>(name: &str) -> SchedulerResult<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| {
            warn!(variable = name, value = %raw, "Unparseable scheduler override");
            SchedulerError::InvalidConfig(format!("{}={:?} is not a valid number", name, raw))
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SchedulerConfig::default();
        assert_eq!(config.quantum, 100);
        assert_eq!(config.aging_interval, 1500);
        assert_eq!(config.aging_step, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_quantum() {
        let config = SchedulerConfig::default().with_quantum(0);
        assert!(matches!(
            config.validate(),
            Err(SchedulerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validation_rejects_negative_step() {
        let config = SchedulerConfig::default().with_aging(10, -1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: SchedulerConfig = serde_json::from_str(r#"{"quantum": 20}"#).unwrap();
        assert_eq!(config.quantum, 20);
        assert_eq!(config.aging_interval, DEFAULT_AGING_INTERVAL);
    }
}
