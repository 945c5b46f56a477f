//! Esperas de disponibilidad de plugins y conectores.
//!
//! Capa explícita sobre el State Poller: el pipeline de réplica sólo espera al
//! plugin; la espera de cada conector la invoca el llamador cuando la necesita.
//! Espera máxima e intervalo salen de `ProvisioningConfig`.

use msk_core::{wait_for, CancellationToken, CoreEngineError, PollOutcome, ProvisioningConfig, ResourceKind, ResourceRef,
               WaitSpec};

use crate::ports::ConnectControlPlane;

pub fn plugin_readiness(config: &ProvisioningConfig) -> WaitSpec {
    WaitSpec::new("Plugin", &["ACTIVE"], &["CREATE_FAILED", "DELETING"]).with_max_wait(config.plugin_wait)
                                                                        .with_interval(config.plugin_poll_interval)
}

pub fn connector_readiness(config: &ProvisioningConfig) -> WaitSpec {
    WaitSpec::new("Connector", &["RUNNING"], &["FAILED", "DELETING"]).with_max_wait(config.connector_wait)
                                                                     .with_interval(config.connector_poll_interval)
}

/// Espera a que el plugin quede `ACTIVE`.
///
/// `Err` sólo si la referencia no es de un plugin; cualquier otro desenlace
/// (timeout, estado terminal, fallo de la consulta) viene en el `PollOutcome`.
pub async fn wait_for_plugin_ready(plane: &dyn ConnectControlPlane,
                                   plugin: &ResourceRef,
                                   config: &ProvisioningConfig,
                                   cancel: &CancellationToken)
                                   -> Result<PollOutcome, CoreEngineError> {
    poll_plugin(plane, plugin, &plugin_readiness(config), cancel).await
}

/// Espera a que el conector quede `RUNNING`.
pub async fn wait_for_connector_ready(plane: &dyn ConnectControlPlane,
                                      connector: &ResourceRef,
                                      config: &ProvisioningConfig,
                                      cancel: &CancellationToken)
                                      -> Result<PollOutcome, CoreEngineError> {
    poll_connector(plane, connector, &connector_readiness(config), cancel).await
}

pub(crate) async fn poll_plugin(plane: &dyn ConnectControlPlane,
                                plugin: &ResourceRef,
                                spec: &WaitSpec,
                                cancel: &CancellationToken)
                                -> Result<PollOutcome, CoreEngineError> {
    plugin.expect_kind(ResourceKind::Plugin)?;
    Ok(wait_for(spec, cancel, || plane.describe_plugin_state(plugin)).await)
}

pub(crate) async fn poll_connector(plane: &dyn ConnectControlPlane,
                                   connector: &ResourceRef,
                                   spec: &WaitSpec,
                                   cancel: &CancellationToken)
                                   -> Result<PollOutcome, CoreEngineError> {
    connector.expect_kind(ResourceKind::Connector)?;
    Ok(wait_for(spec, cancel, || plane.describe_connector_state(connector)).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryConnectControlPlane;
    use crate::ports::PluginLocation;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn plugin_becomes_active_after_creating() {
        let plane = InMemoryConnectControlPlane::default().with_plugin_states(&["CREATING", "CREATING", "ACTIVE"]);
        let plugin = plane.create_plugin("mm2", &PluginLocation::s3("b", "k")).await.unwrap();
        let config = ProvisioningConfig::default();
        let outcome = wait_for_plugin_ready(&plane, &plugin, &config, &CancellationToken::new()).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.attempts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn wrong_reference_kind_is_rejected_before_polling() {
        let plane = InMemoryConnectControlPlane::default();
        let not_a_plugin = ResourceRef::new(ResourceKind::Connector, "arn:connector");
        let config = ProvisioningConfig::default();
        let err = wait_for_plugin_ready(&plane, &not_a_plugin, &config, &CancellationToken::new()).await.unwrap_err();
        assert!(err.is_pre_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_connector_is_terminal() {
        let plane = InMemoryConnectControlPlane::default().with_connector_states(&["CREATING", "FAILED"]);
        let plugin = plane.create_plugin("mm2", &PluginLocation::s3("b", "k")).await.unwrap();
        let request = crate::steps::tests_support::request("mm2-heartbeat", &plugin);
        let connector = plane.create_connector(&request).await.unwrap();

        let config = ProvisioningConfig::default();
        let outcome = wait_for_connector_ready(&plane, &connector, &config, &CancellationToken::new()).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.final_state, "FAILED");
        assert_eq!(outcome.error.map(|e| e.kind()), Some(msk_core::ErrorKind::TerminalState));
    }

    #[tokio::test(start_paused = true)]
    async fn connector_wait_comes_from_config() {
        let plane = InMemoryConnectControlPlane::default().with_connector_states(&["CREATING"]);
        let plugin = plane.create_plugin("mm2", &PluginLocation::s3("b", "k")).await.unwrap();
        let request = crate::steps::tests_support::request("mm2-heartbeat", &plugin);
        let connector = plane.create_connector(&request).await.unwrap();
        let config = ProvisioningConfig::from_lookup(|k| {
            match k {
                "MSKFLOW_CONNECTOR_WAIT_SECS" => Some("90".to_string()),
                "MSKFLOW_CONNECTOR_POLL_SECS" => Some("10".to_string()),
                _ => None,
            }
        });

        let started = tokio::time::Instant::now();
        let outcome = wait_for_connector_ready(&plane, &connector, &config, &CancellationToken::new()).await.unwrap();
        assert!(outcome.is_timeout());
        assert_eq!(started.elapsed(), Duration::from_secs(90));
        // t=0, 10, ..., 80
        assert_eq!(outcome.attempts, 9);
        assert_eq!(outcome.message, "Connector did not reach target state within 90 seconds");
    }
}
