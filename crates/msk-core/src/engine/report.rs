//! `RunReport`: secuencia ordenada de `StepResult` de una corrida.
//!
//! Se crea vacío al inicio, se le agrega un resultado por step y se congela
//! al terminar (éxito total o primer fallo). Los steps no intentados no
//! aparecen: nunca se rellenan con fallos ficticios.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::ResourceRef;
use crate::step::StepResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    run_id: Uuid,
    definition_hash: String,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    steps: Vec<StepResult>,
    completed: bool,
}

impl RunReport {
    pub(crate) fn start(run_id: Uuid, definition_hash: String) -> Self {
        Self { run_id,
               definition_hash,
               started_at: Utc::now(),
               finished_at: None,
               steps: Vec::new(),
               completed: false }
    }

    pub(crate) fn push(&mut self, result: StepResult) {
        self.steps.push(result);
    }

    pub(crate) fn finish(mut self, completed: bool) -> Self {
        self.completed = completed;
        self.finished_at = Some(Utc::now());
        self
    }

    /// Construye un reporte cerrado a partir de resultados ya calculados.
    ///
    /// `completed` se deriva: verdadero sólo si todos los resultados son ok y
    /// `expected_steps` coincide con la cantidad registrada.
    pub fn from_results(definition_hash: impl Into<String>, steps: Vec<StepResult>, expected_steps: usize) -> Self {
        let completed = steps.len() == expected_steps && steps.iter().all(|s| s.ok);
        let mut report = Self::start(Uuid::new_v4(), definition_hash.into());
        report.steps = steps;
        report.finish(completed)
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn definition_hash(&self) -> &str {
        &self.definition_hash
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn steps(&self) -> &[StepResult] {
        &self.steps
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    /// El step que detuvo la corrida, si lo hubo.
    pub fn failed_step(&self) -> Option<&StepResult> {
        self.steps.iter().find(|s| !s.ok)
    }

    pub fn output_of(&self, step_name: &str) -> Option<&ResourceRef> {
        self.steps
            .iter()
            .find(|s| s.name == step_name)
            .and_then(|s| s.output.as_ref())
    }

    /// Outputs producidos, en orden de ejecución. Útil para limpieza manual
    /// tras una corrida parcial (no hay rollback automático).
    pub fn outputs(&self) -> Vec<&ResourceRef> {
        self.steps.iter().filter_map(|s| s.output.as_ref()).collect()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }
}
