use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::run_result::StepRunResult;
use crate::model::StepContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Crea un recurso externo.
    Provision,
}

/// Trait que define un Step de pipeline.
///
/// `execute` no se reintenta dentro del executor: reintentar significa volver
/// a correr el pipeline completo.
#[async_trait]
pub trait PipelineStep: Send + Sync {
    /// Nombre estable y único dentro del pipeline.
    fn name(&self) -> &str;

    fn kind(&self) -> StepKind;

    /// Parámetros deterministas del step; entran al `definition_hash`.
    /// No deben incluir secretos.
    fn describe(&self) -> Value {
        Value::Null
    }

    async fn execute(&self, ctx: &StepContext) -> StepRunResult;
}
