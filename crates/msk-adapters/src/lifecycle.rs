//! Operaciones de ciclo de vida sobre recursos ya creados.
//!
//! Validan el tipo de referencia y los campos obligatorios antes de delegar
//! en el control plane. Sirven también para limpiar a mano lo que dejó una
//! corrida parcial (no hay rollback automático).

use std::collections::BTreeMap;

use log::{debug, info};
use msk_core::{require_fields, CoreEngineError, ProvisioningConfig, ResourceKind, ResourceRef};

use crate::ports::{Capacity, ConnectControlPlane, ConnectorUpdate, ResourceStatus};

/// Actualiza configuración (y capacidad) de un conector.
///
/// Sin `capacity` se usa la capacidad por defecto de `config`.
pub async fn update_connector(plane: &dyn ConnectControlPlane,
                              connector: &ResourceRef,
                              configuration: BTreeMap<String, String>,
                              current_version: &str,
                              capacity: Option<Capacity>,
                              config: &ProvisioningConfig)
                              -> Result<ResourceStatus, CoreEngineError> {
    connector.expect_kind(ResourceKind::Connector)?;
    require_fields(&[("current_version", current_version)])?;
    if configuration.is_empty() {
        return Err(CoreEngineError::Validation("connector configuration must not be empty".into()));
    }
    let update = ConnectorUpdate { current_version: current_version.to_string(),
                                   configuration,
                                   capacity: capacity.unwrap_or(Capacity { mcu_count: config.mcu_count,
                                                                           worker_count: config.worker_count }) };
    debug!("update_connector:start connector={} version={current_version}", connector.id());
    let status = plane.update_connector(connector, &update).await?;
    info!("update_connector:done connector={} state={}", connector.id(), status.state);
    Ok(status)
}

pub async fn delete_connector(plane: &dyn ConnectControlPlane,
                              connector: &ResourceRef,
                              current_version: &str)
                              -> Result<ResourceStatus, CoreEngineError> {
    connector.expect_kind(ResourceKind::Connector)?;
    require_fields(&[("current_version", current_version)])?;
    let status = plane.delete_connector(connector, current_version).await?;
    info!("delete_connector:done connector={} state={}", connector.id(), status.state);
    Ok(status)
}

pub async fn delete_plugin(plane: &dyn ConnectControlPlane, plugin: &ResourceRef) -> Result<ResourceStatus, CoreEngineError> {
    plugin.expect_kind(ResourceKind::Plugin)?;
    let status = plane.delete_plugin(plugin).await?;
    info!("delete_plugin:done plugin={} state={}", plugin.id(), status.state);
    Ok(status)
}

pub async fn delete_worker_config(plane: &dyn ConnectControlPlane,
                                  worker_config: &ResourceRef)
                                  -> Result<ResourceStatus, CoreEngineError> {
    worker_config.expect_kind(ResourceKind::WorkerConfig)?;
    let status = plane.delete_worker_config(worker_config).await?;
    info!("delete_worker_config:done worker_config={} state={}", worker_config.id(), status.state);
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryConnectControlPlane;
    use crate::ports::PluginLocation;
    use crate::steps::tests_support;

    async fn plane_with_connector() -> (InMemoryConnectControlPlane, ResourceRef) {
        let plane = InMemoryConnectControlPlane::default();
        let plugin = plane.create_plugin("mm2", &PluginLocation::s3("b", "k")).await.unwrap();
        let connector = plane.create_connector(&tests_support::request("mm2-heartbeat", &plugin)).await.unwrap();
        (plane, connector)
    }

    #[tokio::test]
    async fn update_requires_version_and_configuration() {
        let (plane, connector) = plane_with_connector().await;
        let cfg = ProvisioningConfig::default();
        let mut conf = BTreeMap::new();

        let err = update_connector(&plane, &connector, conf.clone(), "1", None, &cfg).await.unwrap_err();
        assert!(err.is_pre_flight());

        conf.insert("tasks.max".to_string(), "4".to_string());
        let err = update_connector(&plane, &connector, conf.clone(), "", None, &cfg).await.unwrap_err();
        assert_eq!(err, CoreEngineError::Validation("missing required parameters: current_version".into()));

        let status = update_connector(&plane, &connector, conf, "1", None, &cfg).await.unwrap();
        assert_eq!(status.state, "UPDATING");
        assert_eq!(plane.connector_request("mm2-heartbeat").await.unwrap().configuration["tasks.max"], "4");
    }

    #[tokio::test]
    async fn stale_version_surfaces_collaborator_error() {
        let (plane, connector) = plane_with_connector().await;
        let err = delete_connector(&plane, &connector, "7").await.unwrap_err();
        assert!(matches!(err, CoreEngineError::ExternalCallFailure { ref code, .. } if code == "BadRequestException"));
        assert!(delete_connector(&plane, &connector, "1").await.is_ok());
    }

    #[tokio::test]
    async fn delete_rejects_wrong_reference_kind() {
        let (plane, connector) = plane_with_connector().await;
        assert!(delete_plugin(&plane, &connector).await.unwrap_err().is_pre_flight());
        assert!(delete_worker_config(&plane, &connector).await.unwrap_err().is_pre_flight());
        assert!(plane.operations().await.iter().all(|op| !op.starts_with("delete")));
    }
}
