//! Contexto de ejecución entregado a `PipelineStep::execute`.
//!
//! Acumula, en orden, los outputs de los Steps que ya terminaron bien. Cada
//! corrida posee su propio contexto: no se comparte estado mutable entre
//! corridas concurrentes.
use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{ResourceKind, ResourceRef};
use crate::errors::CoreEngineError;

#[derive(Debug, Clone)]
pub struct StepContext {
    run_id: Uuid,
    outputs: IndexMap<String, ResourceRef>,
    cancel: CancellationToken,
}

impl StepContext {
    pub fn new(run_id: Uuid, cancel: CancellationToken) -> Self {
        Self { run_id,
               outputs: IndexMap::new(),
               cancel }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Token de cancelación de la corrida; los Steps que esperan deben respetarlo.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Output del Step con ese nombre, si terminó bien y produjo uno.
    pub fn output_of(&self, step_name: &str) -> Option<&ResourceRef> {
        self.outputs.get(step_name)
    }

    /// Último output registrado del tipo pedido.
    pub fn latest(&self, kind: ResourceKind) -> Option<&ResourceRef> {
        self.outputs.values().rev().find(|r| r.kind() == kind)
    }

    /// Igual que `latest` pero un faltante es un error de validación.
    pub fn require(&self, kind: ResourceKind) -> Result<&ResourceRef, CoreEngineError> {
        self.latest(kind)
            .ok_or_else(|| CoreEngineError::Validation(format!("missing required input: no {kind} produced by a previous step")))
    }

    pub fn outputs(&self) -> impl Iterator<Item = (&str, &ResourceRef)> {
        self.outputs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn record(&mut self, step_name: &str, output: ResourceRef) {
        self.outputs.insert(step_name.to_string(), output);
    }
}
