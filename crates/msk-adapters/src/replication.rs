//! Pipeline de referencia: topología MirrorMaker2 completa.
//!
//! plugin (crear + esperar ACTIVE) → worker config opcional → heartbeat →
//! checkpoint → source. Toda la validación ocurre en `ReplicationPlan::new`,
//! antes de cualquier llamada externa.

use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;
use msk_core::{build_auth_config, require_fields, AuthSpec, CancellationToken, CoreEngineError, PipelineExecutor,
               ProvisioningConfig};
use serde::{Deserialize, Serialize};

use crate::mirror::{MirrorEndpoints, MirrorRole, SOURCE_ALIAS, TARGET_ALIAS};
use crate::ports::{Capacity, ConnectControlPlane, PluginLocation};
use crate::readiness::plugin_readiness;
use crate::steps::{ConnectorTemplate, CreateConnectorStep, CreatePluginStep, CreateWorkerConfigStep, WorkerConfigBody};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfigSettings {
    pub name: String,
    pub properties: IndexMap<String, String>,
}

/// Entradas de una topología de réplica.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationSettings {
    pub plugin_name: String,
    pub s3_bucket: String,
    pub s3_key: String,
    pub source_bootstrap_servers: String,
    pub target_bootstrap_servers: String,
    pub service_execution_role_arn: String,
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
    pub source_auth: AuthSpec,
    pub target_auth: AuthSpec,
    #[serde(default)]
    pub worker_config: Option<WorkerConfigSettings>,
}

/// Plan validado, listo para producir executors.
#[derive(Debug, Clone)]
pub struct ReplicationPlan {
    plugin_name: String,
    location: PluginLocation,
    plugin_wait: msk_core::WaitSpec,
    worker_config: Option<WorkerConfigBody>,
    template: Arc<ConnectorTemplate>,
}

impl ReplicationPlan {
    pub fn new(settings: ReplicationSettings, config: &ProvisioningConfig) -> Result<Self, CoreEngineError> {
        require_fields(&[("plugin_name", settings.plugin_name.as_str()),
                         ("s3_bucket", settings.s3_bucket.as_str()),
                         ("s3_key", settings.s3_key.as_str()),
                         ("source_bootstrap_servers", settings.source_bootstrap_servers.as_str()),
                         ("target_bootstrap_servers", settings.target_bootstrap_servers.as_str()),
                         ("service_execution_role_arn", settings.service_execution_role_arn.as_str())])?;
        if settings.subnets.is_empty() || settings.security_groups.is_empty() {
            return Err(CoreEngineError::Validation("VPC subnets and security groups cannot be empty".into()));
        }
        let worker_config = settings.worker_config
                                    .map(|wc| WorkerConfigBody::new(wc.name, wc.properties))
                                    .transpose()?;

        let mut auth = build_auth_config(SOURCE_ALIAS, &settings.source_auth)?;
        auth.extend(build_auth_config(TARGET_ALIAS, &settings.target_auth)?);

        let template = ConnectorTemplate { plugin_name: settings.plugin_name.clone(),
                                           kafka_connect_version: config.kafka_connect_version.clone(),
                                           capacity: Capacity { mcu_count: config.mcu_count,
                                                                worker_count: config.worker_count },
                                           endpoints: MirrorEndpoints { source_bootstrap_servers: settings.source_bootstrap_servers,
                                                                        target_bootstrap_servers: settings.target_bootstrap_servers,
                                                                        replication_factor: config.replication_factor,
                                                                        tasks_max: config.tasks_max },
                                           source_tasks_max: config.source_tasks_max,
                                           auth,
                                           subnets: settings.subnets,
                                           security_groups: settings.security_groups,
                                           service_execution_role_arn: settings.service_execution_role_arn };

        debug!("replication_plan:built plugin={} worker_config={}",
               settings.plugin_name,
               worker_config.is_some());
        Ok(Self { location: PluginLocation::s3(&settings.s3_bucket, &settings.s3_key),
                  plugin_wait: plugin_readiness(config),
                  plugin_name: settings.plugin_name,
                  worker_config,
                  template: Arc::new(template) })
    }

    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    pub fn connector_names(&self) -> Vec<String> {
        MirrorRole::ALL.iter().map(|r| r.connector_name(&self.plugin_name)).collect()
    }

    /// Executor con los steps del plan contra `plane`.
    pub fn executor(&self, plane: Arc<dyn ConnectControlPlane>) -> PipelineExecutor {
        self.build(plane, None)
    }

    /// Igual que `executor` pero con un token externo (deadline, shutdown).
    pub fn executor_with_cancellation(&self, plane: Arc<dyn ConnectControlPlane>, cancel: CancellationToken) -> PipelineExecutor {
        self.build(plane, Some(cancel))
    }

    fn build(&self, plane: Arc<dyn ConnectControlPlane>, cancel: Option<CancellationToken>) -> PipelineExecutor {
        let worker_config = self.worker_config
                                .clone()
                                .map(|body| CreateWorkerConfigStep::new(Arc::clone(&plane), body));
        let connector = |role| CreateConnectorStep::new(Arc::clone(&plane), role, Arc::clone(&self.template));

        let mut builder = PipelineExecutor::new().first_step(CreatePluginStep::new(Arc::clone(&plane),
                                                                                   self.plugin_name.clone(),
                                                                                   self.location.clone(),
                                                                                   self.plugin_wait.clone()))
                                                 .add_optional_step(worker_config)
                                                 .add_step(connector(MirrorRole::Heartbeat))
                                                 .add_step(connector(MirrorRole::Checkpoint))
                                                 .add_step(connector(MirrorRole::Source));
        if let Some(token) = cancel {
            builder = builder.with_cancellation(token);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msk_core::ErrorKind;

    fn settings() -> ReplicationSettings {
        ReplicationSettings { plugin_name: "mm2".into(),
                              s3_bucket: "mm2-plugins".into(),
                              s3_key: "mm2.zip".into(),
                              source_bootstrap_servers: "b-1.src:9098".into(),
                              target_bootstrap_servers: "b-1.dst:9098".into(),
                              service_execution_role_arn: "arn:aws:iam::000000000000:role/mm2".into(),
                              subnets: vec!["subnet-a".into(), "subnet-b".into()],
                              security_groups: vec!["sg-1".into()],
                              source_auth: AuthSpec::iam("arn:aws:iam::000000000000:role/src").unwrap(),
                              target_auth: AuthSpec::iam("arn:aws:iam::000000000000:role/dst").unwrap(),
                              worker_config: None }
    }

    #[test]
    fn missing_inputs_are_reported_together() {
        let mut s = settings();
        s.s3_bucket.clear();
        s.service_execution_role_arn = " ".into();
        let err = ReplicationPlan::new(s, &ProvisioningConfig::default()).unwrap_err();
        assert_eq!(err,
                   CoreEngineError::Validation("missing required parameters: s3_bucket, service_execution_role_arn".into()));
    }

    #[test]
    fn empty_network_is_rejected() {
        let mut s = settings();
        s.security_groups.clear();
        let err = ReplicationPlan::new(s, &ProvisioningConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn invalid_auth_is_caught_when_planning() {
        let mut s = settings();
        s.target_auth.role_arn = None;
        let err = ReplicationPlan::new(s, &ProvisioningConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAuthSpec);
    }

    #[test]
    fn worker_config_without_properties_fails_planning() {
        let mut s = settings();
        s.worker_config = Some(WorkerConfigSettings { name: "mm2-workers".into(),
                                                      properties: IndexMap::new() });
        let err = ReplicationPlan::new(s, &ProvisioningConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn every_executor_carries_the_worker_config_step() {
        let mut s = settings();
        let mut properties = IndexMap::new();
        properties.insert("offset.storage.topic".to_string(), "mm2-offsets".to_string());
        s.worker_config = Some(WorkerConfigSettings { name: "mm2-workers".into(),
                                                      properties });
        let with = ReplicationPlan::new(s, &ProvisioningConfig::default()).unwrap();
        let without = ReplicationPlan::new(settings(), &ProvisioningConfig::default()).unwrap();
        let plane = || -> Arc<dyn ConnectControlPlane> { Arc::new(crate::memory::InMemoryConnectControlPlane::default()) };

        let first = with.executor(plane());
        let second = with.executor_with_cancellation(plane(), CancellationToken::new());
        assert_eq!(first.definition_hash(), second.definition_hash());
        assert_ne!(first.definition_hash(), without.executor(plane()).definition_hash());
    }

    #[test]
    fn connector_names_derive_from_plugin() {
        let plan = ReplicationPlan::new(settings(), &ProvisioningConfig::default()).unwrap();
        assert_eq!(plan.connector_names(), vec!["mm2-heartbeat", "mm2-checkpoint", "mm2-source"]);
    }
}
