//! CreateWorkerConfigStep (opcional en la topología de réplica).

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use log::info;
use msk_core::{require_fields, CoreEngineError, PipelineStep, StepContext, StepKind, StepRunResult};
use serde_json::{json, Value};

use crate::ports::ConnectControlPlane;

pub const CREATE_WORKER_CONFIG: &str = "create-worker-config";

/// Cuerpo de archivo de propiedades: una línea `clave=valor` por entrada, en
/// el orden de inserción.
pub fn render_properties(properties: &IndexMap<String, String>) -> String {
    properties.iter()
              .map(|(k, v)| format!("{k}={v}"))
              .collect::<Vec<_>>()
              .join("\n")
}

/// Nombre y propiedades de una worker config, ya validados.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfigBody {
    name: String,
    properties: IndexMap<String, String>,
}

impl WorkerConfigBody {
    /// Falla con `Validation` si falta el nombre o no hay propiedades.
    pub fn new(name: impl Into<String>, properties: IndexMap<String, String>) -> Result<Self, CoreEngineError> {
        let name = name.into();
        require_fields(&[("worker_config_name", name.as_str())])?;
        if properties.is_empty() {
            return Err(CoreEngineError::Validation("worker configuration requires at least one property".into()));
        }
        Ok(Self { name, properties })
    }
}

pub struct CreateWorkerConfigStep {
    plane: Arc<dyn ConnectControlPlane>,
    body: WorkerConfigBody,
}

impl CreateWorkerConfigStep {
    pub fn new(plane: Arc<dyn ConnectControlPlane>, body: WorkerConfigBody) -> Self {
        Self { plane, body }
    }
}

#[async_trait]
impl PipelineStep for CreateWorkerConfigStep {
    fn name(&self) -> &str {
        CREATE_WORKER_CONFIG
    }

    fn kind(&self) -> StepKind {
        StepKind::Provision
    }

    fn describe(&self) -> Value {
        json!({ "name": self.body.name, "properties": self.body.properties })
    }

    async fn execute(&self, _ctx: &StepContext) -> StepRunResult {
        let rendered = render_properties(&self.body.properties);
        let created = self.plane.create_worker_config(&self.body.name, &rendered).await;
        if let Ok(r) = &created {
            info!("create_worker_config:done name={} ref={}", self.body.name, r.id());
        }
        created.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryConnectControlPlane;

    #[test]
    fn properties_render_one_per_line_in_order() {
        let mut props = IndexMap::new();
        props.insert("key.converter".to_string(), "org.apache.kafka.connect.converters.ByteArrayConverter".to_string());
        props.insert("offset.flush.interval.ms".to_string(), "10000".to_string());
        assert_eq!(render_properties(&props),
                   "key.converter=org.apache.kafka.connect.converters.ByteArrayConverter\noffset.flush.interval.ms=10000");
    }

    #[test]
    fn empty_name_or_properties_are_rejected() {
        let mut props = IndexMap::new();
        assert!(WorkerConfigBody::new("wc", props.clone()).is_err());
        props.insert("a".to_string(), "b".to_string());
        let err = WorkerConfigBody::new(" ", props).unwrap_err();
        assert_eq!(err, CoreEngineError::Validation("missing required parameters: worker_config_name".into()));
    }

    #[tokio::test]
    async fn step_creates_the_rendered_body() {
        let plane = Arc::new(InMemoryConnectControlPlane::default());
        let mut props = IndexMap::new();
        props.insert("offset.storage.topic".to_string(), "mm2-offsets".to_string());
        let body = WorkerConfigBody::new("mm2-workers", props).unwrap();
        let step = CreateWorkerConfigStep::new(plane.clone(), body);
        let ctx = StepContext::new(Default::default(), msk_core::CancellationToken::new());

        assert!(matches!(step.execute(&ctx).await, StepRunResult::Success { .. }));
        assert_eq!(plane.worker_config_body("mm2-workers").await.as_deref(), Some("offset.storage.topic=mm2-offsets"));
    }
}
