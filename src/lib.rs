//! MSKFlow Rust Library
//!
//! Punto de entrada del workspace:
//! - `msk_core`: motor de pasos, poller y configuración de autenticación.
//! - `msk_adapters`: pipeline MirrorMaker2, colaboradores y conmutación DNS.
//! - `config`: `AppConfig` cargada desde el entorno (.env).
//!
//! Las capas CLI/API que invocan estas operaciones viven fuera del workspace.

pub mod config;

pub use config::AppConfig;
pub use msk_adapters;
pub use msk_core;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    #[test]
    fn app_config_reads_region_and_provisioning_values() {
        let vars: HashMap<&str, &str> = [("AWS_REGION", " us-west-2 "), ("MSKFLOW_PLUGIN_WAIT_SECS", "30")].into_iter()
                                                                                                           .collect();
        let cfg = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.default_region.as_deref(), Some("us-west-2"));
        assert_eq!(cfg.provisioning.plugin_wait, Duration::from_secs(30));
        assert_eq!(cfg.provisioning.record_ttl, 300);
    }

    #[test]
    fn blank_region_is_ignored() {
        let cfg = AppConfig::from_lookup(|k| (k == "AWS_REGION").then(|| "  ".to_string()));
        assert_eq!(cfg, AppConfig::default());
    }
}
