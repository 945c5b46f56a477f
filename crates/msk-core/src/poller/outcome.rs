use serde::{Deserialize, Serialize};

use crate::constants::{STATE_CANCELLED, STATE_ERROR, STATE_TIMEOUT};
use crate::errors::CoreEngineError;

/// Resultado de una invocación de `wait_for`. Se construye una vez y no muta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOutcome {
    pub success: bool,
    /// Último estado observado, o uno sintético (`TIMEOUT`, `ERROR`, `CANCELLED`).
    pub final_state: String,
    pub message: String,
    /// Cantidad de invocaciones a `check`.
    pub attempts: u32,
    /// Causa tipada cuando `success == false`.
    pub error: Option<CoreEngineError>,
}

impl PollOutcome {
    pub(crate) fn reached(name: &str, state: String, attempts: u32) -> Self {
        Self { success: true,
               message: format!("{name} reached {state}"),
               final_state: state,
               attempts,
               error: None }
    }

    pub(crate) fn failed(name: &str, state: String, attempts: u32) -> Self {
        let message = format!("{name} failed with {state}");
        Self { success: false,
               error: Some(CoreEngineError::TerminalState { state: state.clone(),
                                                            message: message.clone() }),
               final_state: state,
               message,
               attempts }
    }

    pub(crate) fn timed_out(name: &str, max_wait: std::time::Duration, attempts: u32) -> Self {
        let message = format!("{name} did not reach target state within {} seconds", max_wait.as_secs());
        Self { success: false,
               final_state: STATE_TIMEOUT.to_string(),
               error: Some(CoreEngineError::Timeout(message.clone())),
               message,
               attempts }
    }

    pub(crate) fn errored(cause: CoreEngineError, attempts: u32) -> Self {
        Self { success: false,
               final_state: STATE_ERROR.to_string(),
               message: cause.to_string(),
               attempts,
               error: Some(cause) }
    }

    pub(crate) fn cancelled(name: &str, attempts: u32) -> Self {
        let message = format!("{name} wait cancelled");
        Self { success: false,
               final_state: STATE_CANCELLED.to_string(),
               error: Some(CoreEngineError::Cancelled(message.clone())),
               message,
               attempts }
    }

    pub fn is_timeout(&self) -> bool {
        self.final_state == STATE_TIMEOUT
    }

    /// Convierte el resultado en `Result`: estado alcanzado o la causa tipada.
    pub fn into_result(self) -> Result<String, CoreEngineError> {
        if self.success {
            Ok(self.final_state)
        } else {
            Err(self.error.unwrap_or(CoreEngineError::Internal(self.message)))
        }
    }
}
