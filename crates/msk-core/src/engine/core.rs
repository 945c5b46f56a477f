//! Core PipelineExecutor implementation

use std::any::Any;
use std::sync::Arc;

use log::{debug, error, info};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;
use uuid::Uuid;

use crate::engine::{ExecutorBuilderInit, RunReport};
use crate::errors::CoreEngineError;
use crate::event::{EventStore, InMemoryEventStore, PipelineEventKind};
use crate::hashing::hash_value;
use crate::model::StepContext;
use crate::step::{PipelineStep, StepResult, StepRunResult};

/// Motor de ejecución de pipelines de aprovisionamiento.
///
/// Ejecuta los steps estrictamente en orden, uno a la vez. Cada step recibe
/// el contexto con los outputs de todos los anteriores. Ante el primer fallo
/// se detiene y devuelve el reporte parcial; no hay rollback de lo ya hecho.
pub struct PipelineExecutor<E = InMemoryEventStore>
    where E: EventStore
{
    steps: Vec<Arc<dyn PipelineStep>>,
    definition_hash: String,
    event_store: E,
    cancel: CancellationToken,
}

impl PipelineExecutor<InMemoryEventStore> {
    /// Crea un nuevo builder con store de eventos en memoria.
    #[inline]
    pub fn new() -> ExecutorBuilderInit<InMemoryEventStore> {
        ExecutorBuilderInit { event_store: InMemoryEventStore::default() }
    }

    /// Executor directo a partir de una lista de pasos (puede estar vacía).
    pub fn from_steps(steps: Vec<Arc<dyn PipelineStep>>) -> Self {
        Self::with_store(steps, InMemoryEventStore::default())
    }
}

impl<E> PipelineExecutor<E> where E: EventStore
{
    #[inline]
    pub fn builder(event_store: E) -> ExecutorBuilderInit<E> {
        ExecutorBuilderInit { event_store }
    }

    pub fn with_store(steps: Vec<Arc<dyn PipelineStep>>, event_store: E) -> Self {
        let definition_hash = definition_hash(&steps);
        Self { steps,
               definition_hash,
               event_store,
               cancel: CancellationToken::new() }
    }

    pub fn set_cancellation(&mut self, token: CancellationToken) {
        self.cancel = token;
    }

    /// Hash del plan (nombres, tipos y parámetros de los steps).
    pub fn definition_hash(&self) -> &str {
        &self.definition_hash
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn event_store(&self) -> &E {
        &self.event_store
    }

    /// Ejecuta el plan completo y devuelve el reporte.
    ///
    /// `completed` es verdadero sólo si todos los steps corrieron y terminaron
    /// bien. Tras un fallo, el reporte contiene los exitosos más el fallido.
    pub async fn run(&mut self) -> RunReport {
        let run_id = Uuid::new_v4();
        let step_count = self.steps.len();
        let mut report = RunReport::start(run_id, self.definition_hash.clone());
        let mut ctx = StepContext::new(run_id, self.cancel.child_token());

        debug!("run:start run_id={run_id} steps={step_count} definition_hash={}", self.definition_hash);
        self.event_store.append_kind(run_id,
                                     PipelineEventKind::RunInitialized { definition_hash: self.definition_hash.clone(),
                                                                         step_count });

        for (step_index, step) in self.steps.iter().enumerate() {
            let step_name = step.name().to_string();
            self.event_store
                .append_kind(run_id, PipelineEventKind::StepStarted { step_index, step_name: step_name.clone() });

            let outcome = if ctx.cancellation().is_cancelled() {
                StepRunResult::failed(CoreEngineError::Cancelled(format!("run cancelled before step '{step_name}'")))
            } else {
                run_guarded(Arc::clone(step), ctx.clone()).await
            };

            match outcome {
                StepRunResult::Success { output } => {
                    match &output {
                        Some(r) => info!("run:step ok run_id={run_id} step={step_name} output={r}"),
                        None => info!("run:step ok run_id={run_id} step={step_name}"),
                    }
                    if let Some(r) = &output {
                        ctx.record(&step_name, r.clone());
                    }
                    self.event_store.append_kind(run_id,
                                                 PipelineEventKind::StepFinished { step_index,
                                                                                   step_name: step_name.clone(),
                                                                                   output: output.clone() });
                    report.push(StepResult::succeeded(step_name, output));
                }
                StepRunResult::Failure { error } => {
                    error!("run:step failed run_id={run_id} step={step_name} kind={:?} err={error}", error.kind());
                    self.event_store.append_kind(run_id,
                                                 PipelineEventKind::StepFailed { step_index,
                                                                                 step_name: step_name.clone(),
                                                                                 error: error.clone() });
                    self.event_store.append_kind(run_id,
                                                 PipelineEventKind::RunAborted { attempted: step_index + 1,
                                                                                 failed_step: step_name.clone() });
                    report.push(StepResult::failed(step_name, error));
                    return report.finish(false);
                }
            }
        }

        self.event_store.append_kind(run_id, PipelineEventKind::RunCompleted { step_count });
        debug!("run:done run_id={run_id} completed=true");
        report.finish(true)
    }
}

/// Corre el step en su propia tarea para que un panic quede en el borde del
/// step y se convierta en un `StepResult` fallido.
///
/// La tarea queda atada al future de `run`: si éste se suelta (timeout del
/// llamador, `select!` perdido) el step se aborta en su próximo punto de espera.
async fn run_guarded(step: Arc<dyn PipelineStep>, ctx: StepContext) -> StepRunResult {
    let name = step.name().to_string();
    let task = AbortOnDropHandle::new(tokio::spawn(async move { step.execute(&ctx).await }));
    match task.await {
        Ok(result) => result,
        Err(join_err) if join_err.is_panic() => {
            let detail = panic_message(join_err.into_panic());
            StepRunResult::failed(CoreEngineError::Internal(format!("step '{name}' panicked: {detail}")))
        }
        Err(join_err) => StepRunResult::failed(CoreEngineError::Cancelled(format!("step '{name}' aborted: {join_err}"))),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn definition_hash(steps: &[Arc<dyn PipelineStep>]) -> String {
    let described: Vec<Value> = steps.iter()
                                     .map(|s| json!({ "name": s.name(), "kind": s.kind(), "params": s.describe() }))
                                     .collect();
    hash_value(&json!({
        "engine_version": crate::constants::ENGINE_VERSION,
        "steps": described,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ResourceKind, ResourceRef};
    use crate::step::StepKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    struct Panicking;

    #[async_trait]
    impl PipelineStep for Panicking {
        fn name(&self) -> &str {
            "explode"
        }
        fn kind(&self) -> StepKind {
            StepKind::Provision
        }
        async fn execute(&self, _ctx: &StepContext) -> StepRunResult {
            panic!("boom")
        }
    }

    struct Emit(&'static str);

    #[async_trait]
    impl PipelineStep for Emit {
        fn name(&self) -> &str {
            self.0
        }
        fn kind(&self) -> StepKind {
            StepKind::Provision
        }
        async fn execute(&self, _ctx: &StepContext) -> StepRunResult {
            StepRunResult::produced(ResourceRef::new(ResourceKind::Plugin, self.0))
        }
    }

    /// Tarda 30 s y recién entonces marca el efecto.
    struct SlowSideEffect(Arc<AtomicBool>);

    #[async_trait]
    impl PipelineStep for SlowSideEffect {
        fn name(&self) -> &str {
            "slow-create"
        }
        fn kind(&self) -> StepKind {
            StepKind::Provision
        }
        async fn execute(&self, _ctx: &StepContext) -> StepRunResult {
            tokio::time::sleep(Duration::from_secs(30)).await;
            self.0.store(true, Ordering::SeqCst);
            StepRunResult::done()
        }
    }

    #[tokio::test]
    async fn panic_is_caught_at_step_boundary() {
        let mut executor = PipelineExecutor::new().first_step(Emit("a")).add_step(Panicking).add_step(Emit("c")).build();
        let report = executor.run().await;

        assert!(!report.completed());
        assert_eq!(report.step_names(), vec!["a", "explode"]);
        let failed = report.failed_step().unwrap();
        assert_eq!(failed.error, Some(CoreEngineError::Internal("step 'explode' panicked: boom".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_run_aborts_in_flight_step() {
        let touched = Arc::new(AtomicBool::new(false));
        let mut executor = PipelineExecutor::new().first_step(SlowSideEffect(Arc::clone(&touched))).build();

        let outcome = tokio::time::timeout(Duration::from_secs(5), executor.run()).await;
        assert!(outcome.is_err());
        drop(executor);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(!touched.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn events_follow_run_lifecycle() {
        let mut executor = PipelineExecutor::new().first_step(Emit("a")).add_step(Emit("b")).build();
        let report = executor.run().await;
        let codes: Vec<&str> = executor.event_store()
                                       .list(report.run_id())
                                       .iter()
                                       .map(|e| e.kind.code())
                                       .collect();
        assert_eq!(codes, vec!["I", "S", "F", "S", "F", "C"]);
    }

    #[tokio::test]
    async fn cancelled_token_stops_before_first_step() {
        let token = CancellationToken::new();
        token.cancel();
        let mut executor = PipelineExecutor::new().first_step(Emit("a")).with_cancellation(token).build();
        let report = executor.run().await;
        assert!(!report.completed());
        assert_eq!(report.steps().len(), 1);
        assert!(matches!(report.steps()[0].error, Some(CoreEngineError::Cancelled(_))));
    }

    #[test]
    fn definition_hash_depends_on_step_order() {
        let ab = PipelineExecutor::new().first_step(Emit("a")).add_step(Emit("b")).build();
        let ba = PipelineExecutor::new().first_step(Emit("b")).add_step(Emit("a")).build();
        let ab2 = PipelineExecutor::new().first_step(Emit("a")).add_step(Emit("b")).build();
        assert_ne!(ab.definition_hash(), ba.definition_hash());
        assert_eq!(ab.definition_hash(), ab2.definition_hash());
    }
}
