//! Tipos de evento de la corrida y estructura `PipelineEvent`.
//!
//! El executor emite eventos a un `EventStore` append-only mientras corre. El
//! `RunReport` sigue siendo el único resultado devuelto; la traza es un
//! observador (auditoría, depuración).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreEngineError;
use crate::model::ResourceRef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PipelineEventKind {
    /// Primer evento de un `run_id`.
    RunInitialized { definition_hash: String, step_count: usize },
    /// Un step comenzó. No implica éxito.
    StepStarted { step_index: usize, step_name: String },
    StepFinished {
        step_index: usize,
        step_name: String,
        output: Option<ResourceRef>,
    },
    /// Fallo terminal del step; la corrida no continúa.
    StepFailed {
        step_index: usize,
        step_name: String,
        error: CoreEngineError,
    },
    RunCompleted { step_count: usize },
    /// Cierre por fallo; `attempted` incluye el step fallido.
    RunAborted { attempted: usize, failed_step: String },
}

impl PipelineEventKind {
    /// Código compacto de una letra, útil en tests.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RunInitialized { .. } => "I",
            Self::StepStarted { .. } => "S",
            Self::StepFinished { .. } => "F",
            Self::StepFailed { .. } => "X",
            Self::RunCompleted { .. } => "C",
            Self::RunAborted { .. } => "A",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEvent {
    pub seq: u64, // asignado por el store (orden append)
    pub run_id: Uuid,
    pub kind: PipelineEventKind,
    pub ts: DateTime<Utc>,
}
