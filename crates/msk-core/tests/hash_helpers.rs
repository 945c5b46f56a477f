use async_trait::async_trait;
use msk_core::hashing::{hash_value, to_canonical_json};
use msk_core::{PipelineExecutor, PipelineStep, StepContext, StepKind, StepRunResult};
use serde_json::{json, Value};

/// Step sin efectos cuyo `describe` es configurable.
struct Described(&'static str, Value);

#[async_trait]
impl PipelineStep for Described {
    fn name(&self) -> &str {
        self.0
    }

    fn kind(&self) -> StepKind {
        StepKind::Provision
    }

    fn describe(&self) -> Value {
        self.1.clone()
    }

    async fn execute(&self, _ctx: &StepContext) -> StepRunResult {
        StepRunResult::done()
    }
}

#[test]
fn connector_config_hash_ignores_key_order() {
    let a = json!({"tasks.max": "1", "clusters": "source,target", "replication.factor": "3"});
    let b = json!({"replication.factor": "3", "tasks.max": "1", "clusters": "source,target"});
    let h = hash_value(&a);
    // blake3 en hex: 64 caracteres
    assert_eq!(h.len(), 64);
    assert_eq!(h, hash_value(&b));
    assert_eq!(to_canonical_json(&a), to_canonical_json(&b));
}

#[test]
fn definition_hash_tracks_step_parameters() {
    let plan = |wait: u64| {
        PipelineExecutor::new().first_step(Described("create-plugin", json!({"max_wait_secs": wait})))
                               .add_step(Described("create-heartbeat-connector", json!({"role": "heartbeat"})))
                               .build()
    };
    assert_eq!(plan(600).definition_hash(), plan(600).definition_hash());
    assert_ne!(plan(600).definition_hash(), plan(60).definition_hash());
}
