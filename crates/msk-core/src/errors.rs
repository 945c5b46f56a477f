//! Errores del motor de orquestación.
//!
//! Una sola enumeración cubre toda la taxonomía: validación previa,
//! especificaciones de autenticación inválidas, recursos inexistentes,
//! conflictos benignos, fallos del colaborador externo, timeouts y estados
//! terminales. Es `Clone + Serialize` para poder incrustarse en eventos y en
//! el `RunReport`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreEngineError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid auth spec: {0}")]
    InvalidAuthSpec(String),
    #[error("unsupported authentication type: {0}. Supported types: iam, plaintext, scram")]
    UnsupportedAuthType(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("external call failed ({code}): {message}")]
    ExternalCallFailure { code: String, message: String },
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("terminal state {state}: {message}")]
    TerminalState { state: String, message: String },
    #[error("cancelled: {0}")]
    Cancelled(String),
    #[error("internal: {0}")]
    Internal(String),
}

/// Clase del error sin payload. Útil para reportes y aserciones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    InvalidAuthSpec,
    UnsupportedAuthType,
    NotFound,
    Conflict,
    ExternalCallFailure,
    Timeout,
    TerminalState,
    Cancelled,
    Internal,
}

impl CoreEngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::InvalidAuthSpec(_) => ErrorKind::InvalidAuthSpec,
            Self::UnsupportedAuthType(_) => ErrorKind::UnsupportedAuthType,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::ExternalCallFailure { .. } => ErrorKind::ExternalCallFailure,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::TerminalState { .. } => ErrorKind::TerminalState,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Atajo para fallos del colaborador con código y mensaje.
    pub fn external(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalCallFailure { code: code.into(),
                                    message: message.into() }
    }

    /// Errores detectados antes de cualquier efecto externo.
    pub fn is_pre_flight(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::InvalidAuthSpec | ErrorKind::UnsupportedAuthType)
    }
}

/// Valida que todos los campos requeridos tengan contenido.
///
/// Devuelve un único `Validation` listando todos los faltantes, en el orden
/// en que fueron declarados.
pub fn require_fields(fields: &[(&str, &str)]) -> Result<(), CoreEngineError> {
    let missing: Vec<&str> = fields.iter()
                                   .filter(|(_, v)| v.trim().is_empty())
                                   .map(|(k, _)| *k)
                                   .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreEngineError::Validation(format!("missing required parameters: {}", missing.join(", "))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_fields_lists_every_missing_name() {
        let err = require_fields(&[("plugin_name", ""), ("s3_bucket", "b"), ("s3_key", "  ")]).unwrap_err();
        assert_eq!(err, CoreEngineError::Validation("missing required parameters: plugin_name, s3_key".into()));
        assert!(err.is_pre_flight());
    }

    #[test]
    fn external_failure_keeps_code_in_message() {
        let err = CoreEngineError::external("ThrottlingException", "rate exceeded");
        assert_eq!(err.kind(), ErrorKind::ExternalCallFailure);
        assert_eq!(err.to_string(), "external call failed (ThrottlingException): rate exceeded");
        assert!(!err.is_pre_flight());
    }
}
