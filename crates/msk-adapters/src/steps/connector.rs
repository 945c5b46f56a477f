//! CreateConnectorStep: crea uno de los tres conectores MirrorMaker2.
//!
//! Toma el plugin (obligatorio) y la worker config (si existe) del contexto.
//! No espera a que el conector quede RUNNING: esa espera es una operación
//! aparte (`readiness::wait_for_connector_ready`).

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use msk_core::{AuthConfig, CoreEngineError, PipelineStep, ResourceKind, ResourceRef, StepContext, StepKind,
               StepRunResult};
use serde_json::{json, Value};

use crate::mirror::{connector_config, MirrorEndpoints, MirrorRole};
use crate::ports::{Capacity, ConnectControlPlane, ConnectorNetwork, ConnectorRequest, Revisioned};

const PLUGIN_REVISION: u32 = 1;
const WORKER_CONFIG_REVISION: u32 = 1;

/// Parte común de las solicitudes de los tres conectores de una topología.
#[derive(Clone)]
pub struct ConnectorTemplate {
    pub plugin_name: String,
    pub kafka_connect_version: String,
    pub capacity: Capacity,
    pub endpoints: MirrorEndpoints,
    /// `tasks.max` del conector source; los demás usan `endpoints.tasks_max`.
    pub source_tasks_max: u32,
    pub auth: AuthConfig,
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
    pub service_execution_role_arn: String,
}

impl fmt::Debug for ConnectorTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorTemplate")
         .field("plugin_name", &self.plugin_name)
         .field("kafka_connect_version", &self.kafka_connect_version)
         .field("capacity", &self.capacity)
         .field("endpoints", &self.endpoints)
         .field("source_tasks_max", &self.source_tasks_max)
         .field("auth_keys", &self.auth.len())
         .field("subnets", &self.subnets)
         .field("security_groups", &self.security_groups)
         .field("service_execution_role_arn", &self.service_execution_role_arn)
         .finish()
    }
}

impl ConnectorTemplate {
    pub fn request(&self, role: MirrorRole, plugin: &ResourceRef, worker_config: Option<&ResourceRef>) -> ConnectorRequest {
        let endpoints = match role {
            MirrorRole::Source => MirrorEndpoints { tasks_max: self.source_tasks_max,
                                                    ..self.endpoints.clone() },
            _ => self.endpoints.clone(),
        };
        ConnectorRequest { name: role.connector_name(&self.plugin_name),
                           kafka_connect_version: self.kafka_connect_version.clone(),
                           capacity: self.capacity,
                           configuration: connector_config(role, &endpoints, &self.auth),
                           network: ConnectorNetwork { bootstrap_servers: self.endpoints.target_bootstrap_servers.clone(),
                                                       subnets: self.subnets.clone(),
                                                       security_groups: self.security_groups.clone() },
                           client_authentication: "IAM".to_string(),
                           encryption_in_transit: "TLS".to_string(),
                           plugin: Revisioned { resource: plugin.clone(),
                                                revision: PLUGIN_REVISION },
                           worker_config: worker_config.map(|w| Revisioned { resource: w.clone(),
                                                                             revision: WORKER_CONFIG_REVISION }),
                           service_execution_role_arn: self.service_execution_role_arn.clone() }
    }
}

pub struct CreateConnectorStep {
    plane: Arc<dyn ConnectControlPlane>,
    role: MirrorRole,
    step_name: String,
    template: Arc<ConnectorTemplate>,
}

impl CreateConnectorStep {
    pub fn new(plane: Arc<dyn ConnectControlPlane>, role: MirrorRole, template: Arc<ConnectorTemplate>) -> Self {
        Self { plane,
               role,
               step_name: format!("create-{role}-connector"),
               template }
    }

    async fn create(&self, ctx: &StepContext) -> Result<ResourceRef, CoreEngineError> {
        let plugin = ctx.require(ResourceKind::Plugin)?.expect_kind(ResourceKind::Plugin)?;
        let worker_config = ctx.latest(ResourceKind::WorkerConfig);
        let request = self.template.request(self.role, plugin, worker_config);
        let connector = self.plane.create_connector(&request).await?;
        info!("create_connector:done role={} name={} connector={}", self.role, request.name, connector.id());
        Ok(connector)
    }
}

#[async_trait]
impl PipelineStep for CreateConnectorStep {
    fn name(&self) -> &str {
        &self.step_name
    }

    fn kind(&self) -> StepKind {
        StepKind::Provision
    }

    // Sin claves de autenticación: pueden contener contraseñas.
    fn describe(&self) -> Value {
        json!({
            "role": self.role,
            "connector_name": self.role.connector_name(&self.template.plugin_name),
            "connector_class": self.role.connector_class(),
            "kafka_connect_version": self.template.kafka_connect_version,
            "endpoints": self.template.endpoints,
        })
    }

    async fn execute(&self, ctx: &StepContext) -> StepRunResult {
        self.create(ctx).await.into()
    }
}
