use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::CoreEngineError;

/// Espera máxima por defecto (10 minutos).
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(600);
/// Intervalo por defecto entre consultas.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15);

/// Parámetros de una espera.
///
/// Invariantes (verificadas por `validate`):
/// - `target_states` no vacío.
/// - `target_states` y `failure_states` disjuntos.
/// - `interval` mayor que cero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitSpec {
    /// Nombre legible del recurso, usado en los mensajes.
    pub name: String,
    pub target_states: BTreeSet<String>,
    pub failure_states: BTreeSet<String>,
    pub max_wait: Duration,
    pub interval: Duration,
}

impl WaitSpec {
    pub fn new(name: impl Into<String>, targets: &[&str], failures: &[&str]) -> Self {
        Self { name: name.into(),
               target_states: targets.iter().map(|s| s.to_string()).collect(),
               failure_states: failures.iter().map(|s| s.to_string()).collect(),
               max_wait: DEFAULT_MAX_WAIT,
               interval: DEFAULT_INTERVAL }
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), CoreEngineError> {
        if self.name.trim().is_empty() {
            return Err(CoreEngineError::Validation("wait spec requires a resource name".into()));
        }
        if self.target_states.is_empty() {
            return Err(CoreEngineError::Validation(format!("{}: at least one target state is required", self.name)));
        }
        let overlap: Vec<&str> = self.target_states.intersection(&self.failure_states).map(String::as_str).collect();
        if !overlap.is_empty() {
            return Err(CoreEngineError::Validation(format!("{}: target and failure states overlap: {}",
                                                           self.name,
                                                           overlap.join(", "))));
        }
        if self.interval.is_zero() {
            return Err(CoreEngineError::Validation(format!("{}: poll interval must be greater than zero", self.name)));
        }
        Ok(())
    }

    pub fn is_target(&self, state: &str) -> bool {
        self.target_states.contains(state)
    }

    pub fn is_failure(&self, state: &str) -> bool {
        self.failure_states.contains(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_sets_are_rejected() {
        let spec = WaitSpec::new("Plugin", &["ACTIVE"], &["ACTIVE", "CREATE_FAILED"]);
        let err = spec.validate().unwrap_err();
        assert_eq!(err, CoreEngineError::Validation("Plugin: target and failure states overlap: ACTIVE".into()));
    }

    #[test]
    fn zero_interval_and_empty_targets_are_rejected() {
        assert!(WaitSpec::new("Plugin", &["ACTIVE"], &[]).with_interval(Duration::ZERO).validate().is_err());
        assert!(WaitSpec::new("Plugin", &[], &["FAILED"]).validate().is_err());
        assert!(WaitSpec::new("Plugin", &["ACTIVE"], &["CREATE_FAILED"]).validate().is_ok());
    }
}
