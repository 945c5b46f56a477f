use serde::{Deserialize, Serialize};

use crate::errors::{CoreEngineError, ErrorKind};
use crate::model::ResourceRef;

/// Resultado abstracto de ejecutar un step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepRunResult {
    Success { output: Option<ResourceRef> },
    Failure { error: CoreEngineError },
}

impl StepRunResult {
    pub fn produced(output: ResourceRef) -> Self {
        Self::Success { output: Some(output) }
    }

    pub fn done() -> Self {
        Self::Success { output: None }
    }

    pub fn failed(error: CoreEngineError) -> Self {
        Self::Failure { error }
    }
}

impl From<Result<ResourceRef, CoreEngineError>> for StepRunResult {
    fn from(res: Result<ResourceRef, CoreEngineError>) -> Self {
        match res {
            Ok(output) => Self::produced(output),
            Err(error) => Self::failed(error),
        }
    }
}

impl From<Result<Option<ResourceRef>, CoreEngineError>> for StepRunResult {
    fn from(res: Result<Option<ResourceRef>, CoreEngineError>) -> Self {
        match res {
            Ok(output) => Self::Success { output },
            Err(error) => Self::failed(error),
        }
    }
}

/// Registro de un step ejecutado dentro de un `RunReport`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub name: String,
    pub ok: bool,
    pub output: Option<ResourceRef>,
    pub error: Option<CoreEngineError>,
}

impl StepResult {
    pub fn succeeded(name: impl Into<String>, output: Option<ResourceRef>) -> Self {
        Self { name: name.into(),
               ok: true,
               output,
               error: None }
    }

    pub fn failed(name: impl Into<String>, error: CoreEngineError) -> Self {
        Self { name: name.into(),
               ok: false,
               output: None,
               error: Some(error) }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(CoreEngineError::kind)
    }

    /// Mensaje de troubleshooting: step, clase de error y mensaje del colaborador.
    pub fn failure_summary(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(|e| format!("step '{}' failed [{:?}]: {}", self.name, e.kind(), e))
    }
}
