//! Configuración de aprovisionamiento.
//!
//! Estructura explícita que se entrega a cada colaborador en su constructor;
//! no existe un singleton de proceso. `from_env` lee variables de entorno y
//! cae a los valores por defecto si faltan o no se pueden parsear.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningConfig {
    /// Espera máxima hasta que el plugin quede `ACTIVE`.
    pub plugin_wait: Duration,
    pub plugin_poll_interval: Duration,
    /// Espera máxima hasta que un conector quede `RUNNING`.
    pub connector_wait: Duration,
    pub connector_poll_interval: Duration,
    pub kafka_connect_version: String,
    /// TTL de los registros DNS de brokers.
    pub record_ttl: u32,
    pub mcu_count: u32,
    pub worker_count: u32,
    pub replication_factor: u32,
    pub tasks_max: u32,
    /// `tasks.max` del conector de réplica de topics (el más cargado).
    pub source_tasks_max: u32,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self { plugin_wait: Duration::from_secs(10 * 60),
               plugin_poll_interval: Duration::from_secs(15),
               connector_wait: Duration::from_secs(15 * 60),
               connector_poll_interval: Duration::from_secs(30),
               kafka_connect_version: "2.7.1".to_string(),
               record_ttl: 300,
               mcu_count: 1,
               worker_count: 1,
               replication_factor: 3,
               tasks_max: 1,
               source_tasks_max: 2 }
    }
}

impl ProvisioningConfig {
    /// Construye la configuración a partir del entorno del proceso.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Variante testeable: `lookup` resuelve cada clave.
    pub fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        let d = Self::default();
        let secs = |key: &str, fallback: Duration| {
            lookup(key).and_then(|v| v.trim().parse::<u64>().ok())
                       .map(Duration::from_secs)
                       .unwrap_or(fallback)
        };
        let num = |key: &str, fallback: u32| lookup(key).and_then(|v| v.trim().parse::<u32>().ok()).unwrap_or(fallback);

        Self { plugin_wait: secs("MSKFLOW_PLUGIN_WAIT_SECS", d.plugin_wait),
               plugin_poll_interval: secs("MSKFLOW_PLUGIN_POLL_SECS", d.plugin_poll_interval),
               connector_wait: secs("MSKFLOW_CONNECTOR_WAIT_SECS", d.connector_wait),
               connector_poll_interval: secs("MSKFLOW_CONNECTOR_POLL_SECS", d.connector_poll_interval),
               kafka_connect_version: lookup("MSKFLOW_KAFKA_CONNECT_VERSION").filter(|v| !v.trim().is_empty())
                                                                              .unwrap_or(d.kafka_connect_version.clone()),
               record_ttl: num("MSKFLOW_RECORD_TTL", d.record_ttl),
               ..d }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn lookup_overrides_and_falls_back() {
        let vars: HashMap<&str, &str> = [("MSKFLOW_CONNECTOR_WAIT_SECS", "120"),
                                         ("MSKFLOW_RECORD_TTL", "not-a-number"),
                                         ("MSKFLOW_KAFKA_CONNECT_VERSION", "3.7.x")].into_iter()
                                                                                   .collect();
        let cfg = ProvisioningConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.connector_wait, Duration::from_secs(120));
        assert_eq!(cfg.record_ttl, 300);
        assert_eq!(cfg.kafka_connect_version, "3.7.x");
        assert_eq!(cfg.connector_poll_interval, Duration::from_secs(30));
        assert_eq!(cfg.plugin_wait, Duration::from_secs(600));
    }
}
