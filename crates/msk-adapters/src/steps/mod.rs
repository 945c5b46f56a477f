//! Steps concretos de aprovisionamiento de la topología de réplica.

pub mod connector;
pub mod plugin;
pub mod worker_config;

pub use connector::{ConnectorTemplate, CreateConnectorStep};
pub use plugin::{CreatePluginStep, CREATE_PLUGIN};
pub use worker_config::{render_properties, CreateWorkerConfigStep, WorkerConfigBody, CREATE_WORKER_CONFIG};

#[cfg(test)]
pub(crate) mod tests_support {
    use msk_core::ResourceRef;

    use super::ConnectorTemplate;
    use crate::mirror::{MirrorEndpoints, MirrorRole};
    use crate::ports::{Capacity, ConnectorRequest};

    pub fn template() -> ConnectorTemplate {
        ConnectorTemplate { plugin_name: "mm2".into(),
                            kafka_connect_version: "2.7.1".into(),
                            capacity: Capacity { mcu_count: 1, worker_count: 1 },
                            endpoints: MirrorEndpoints { source_bootstrap_servers: "b-1.src:9092".into(),
                                                         target_bootstrap_servers: "b-1.dst:9098".into(),
                                                         replication_factor: 3,
                                                         tasks_max: 1 },
                            source_tasks_max: 2,
                            auth: Default::default(),
                            subnets: vec!["subnet-a".into()],
                            security_groups: vec!["sg-1".into()],
                            service_execution_role_arn: "arn:aws:iam::000000000000:role/mm2".into() }
    }

    /// Solicitud de heartbeat con el nombre dado, para tests de puertos.
    pub fn request(name: &str, plugin: &ResourceRef) -> ConnectorRequest {
        ConnectorRequest { name: name.to_string(),
                           ..template().request(MirrorRole::Heartbeat, plugin, None) }
    }
}
