//! Configuración de la aplicación.
//! Carga variables de entorno (.env) y arma una estructura que se entrega
//! explícitamente a los colaboradores. No hay instancia global.
use log::debug;
use msk_core::ProvisioningConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Esperas y valores por defecto de aprovisionamiento.
    pub provisioning: ProvisioningConfig,
    /// Región por defecto (`AWS_REGION`), si está definida.
    pub default_region: Option<String>,
}

impl AppConfig {
    /// Lee `.env` si existe y luego el entorno del proceso.
    pub fn load() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("config:dotenv loaded path={}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        let default_region = lookup("AWS_REGION").map(|r| r.trim().to_string())
                                                 .filter(|r| !r.is_empty());
        Self { provisioning: ProvisioningConfig::from_lookup(&lookup),
               default_region }
    }
}

