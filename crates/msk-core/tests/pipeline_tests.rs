use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use msk_core::{CoreEngineError, EventStore, PipelineEventKind, PipelineExecutor, PipelineStep, ResourceKind,
               ResourceRef, StepContext, StepKind, StepRunResult};

/// Step de prueba: produce un recurso fijo o falla, y cuenta sus ejecuciones.
struct Fixed {
    name: &'static str,
    outcome: Result<ResourceRef, CoreEngineError>,
    calls: Arc<AtomicU32>,
}

impl Fixed {
    fn ok(name: &'static str, kind: ResourceKind, id: &str) -> Self {
        Self { name,
               outcome: Ok(ResourceRef::new(kind, id)),
               calls: Arc::new(AtomicU32::new(0)) }
    }

    fn failing(name: &'static str, error: CoreEngineError) -> Self {
        Self { name,
               outcome: Err(error),
               calls: Arc::new(AtomicU32::new(0)) }
    }
}

#[async_trait]
impl PipelineStep for Fixed {
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> StepKind {
        StepKind::Provision
    }

    async fn execute(&self, _ctx: &StepContext) -> StepRunResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone().into()
    }
}

/// Step que exige un plugin producido antes y devuelve un conector derivado.
struct NeedsPlugin;

#[async_trait]
impl PipelineStep for NeedsPlugin {
    fn name(&self) -> &str {
        "create-connector"
    }

    fn kind(&self) -> StepKind {
        StepKind::Provision
    }

    async fn execute(&self, ctx: &StepContext) -> StepRunResult {
        ctx.require(ResourceKind::Plugin)
           .map(|plugin| ResourceRef::new(ResourceKind::Connector, format!("{}/connector", plugin.id())))
           .into()
    }
}

#[tokio::test]
async fn stops_at_first_failure_and_never_runs_the_rest() {
    let c = Fixed::ok("c", ResourceKind::Connector, "c-1");
    let c_calls = Arc::clone(&c.calls);
    let mut executor = PipelineExecutor::new().first_step(Fixed::ok("a", ResourceKind::Plugin, "p-1"))
                                              .add_step(Fixed::failing("b", CoreEngineError::external("ConflictException", "exists")))
                                              .add_step(c)
                                              .build();

    let report = executor.run().await;

    assert!(!report.completed());
    assert_eq!(report.steps().len(), 2);
    assert!(report.steps()[0].ok);
    assert!(!report.steps()[1].ok);
    assert_eq!(report.failed_step().map(|s| s.name.as_str()), Some("b"));
    assert_eq!(c_calls.load(Ordering::SeqCst), 0);
    assert_eq!(report.outputs(), vec![&ResourceRef::new(ResourceKind::Plugin, "p-1")]);

    let events = executor.event_store().list(report.run_id());
    let codes: Vec<&str> = events.iter().map(|e| e.kind.code()).collect();
    assert_eq!(codes, vec!["I", "S", "F", "S", "X", "A"]);
    assert!(matches!(&events.last().unwrap().kind,
                     PipelineEventKind::RunAborted { attempted: 2, failed_step } if failed_step == "b"));
}

#[tokio::test]
async fn repeated_runs_report_the_same_order() {
    let mut executor = PipelineExecutor::new().first_step(Fixed::ok("plugin", ResourceKind::Plugin, "p"))
                                              .add_step(Fixed::ok("heartbeat", ResourceKind::Connector, "hb"))
                                              .add_step(Fixed::ok("checkpoint", ResourceKind::Connector, "cp"))
                                              .build();

    let first = executor.run().await;
    let second = executor.run().await;

    assert!(first.completed() && second.completed());
    assert_eq!(first.step_names(), vec!["plugin", "heartbeat", "checkpoint"]);
    assert_eq!(first.step_names(), second.step_names());
    assert_ne!(first.run_id(), second.run_id());
    assert_eq!(first.definition_hash(), second.definition_hash());
}

#[tokio::test]
async fn outputs_flow_to_later_steps() {
    let mut executor = PipelineExecutor::new().first_step(Fixed::ok("create-plugin", ResourceKind::Plugin, "arn:plugin/mm2"))
                                              .add_step(NeedsPlugin)
                                              .build();

    let report = executor.run().await;

    assert!(report.completed());
    assert_eq!(report.output_of("create-connector").map(|r| r.id()), Some("arn:plugin/mm2/connector"));
}

#[tokio::test]
async fn missing_input_fails_the_consumer_step() {
    let mut executor = PipelineExecutor::new().first_step(NeedsPlugin).build();
    let report = executor.run().await;

    assert!(!report.completed());
    assert!(matches!(report.failed_step().and_then(|s| s.error.clone()), Some(CoreEngineError::Validation(_))));
}

#[tokio::test]
async fn empty_plan_completes_with_no_results() {
    let mut executor = PipelineExecutor::from_steps(Vec::new());
    let report = executor.run().await;

    assert!(report.completed());
    assert!(report.steps().is_empty());
    assert!(report.finished_at().is_some());
}
