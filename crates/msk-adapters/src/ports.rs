//! Puertos hacia los colaboradores externos.
//!
//! Tres interfaces angostas: directorio de clusters, control plane de
//! Kafka Connect y directorio DNS. Las implementaciones reales (SDK de nube)
//! quedan fuera de este workspace; `crate::memory` provee las de prueba.
//! Todas son `Send + Sync` para poder compartirse entre steps vía `Arc`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use msk_core::{CoreEngineError, ResourceRef};
use serde::{Deserialize, Serialize};

pub type PortResult<T> = Result<T, CoreEngineError>;

/// Direcciones de brokers por tipo de listener.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerAddresses {
    pub plain: Vec<String>,
    pub tls: Vec<String>,
    pub iam_sasl: Vec<String>,
}

impl BrokerAddresses {
    /// Primera lista no vacía en orden plain → tls → iam_sasl.
    pub fn preferred(&self) -> Option<&[String]> {
        [&self.plain, &self.tls, &self.iam_sasl].into_iter()
                                                 .find(|list| !list.is_empty())
                                                 .map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcInfo {
    pub vpc_id: String,
    pub subnet_id: String,
}

#[async_trait]
pub trait ClusterDirectory: Send + Sync {
    async fn resolve_cluster_arn(&self, region: &str, cluster_name: &str) -> PortResult<ResourceRef>;
    async fn get_broker_addresses(&self, cluster: &ResourceRef) -> PortResult<BrokerAddresses>;
    async fn resolve_vpc(&self, cluster: &ResourceRef) -> PortResult<VpcInfo>;
}

/// Ubicación del paquete del plugin en S3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginLocation {
    pub bucket_arn: String,
    pub file_key: String,
}

impl PluginLocation {
    pub fn s3(bucket: &str, key: &str) -> Self {
        Self { bucket_arn: format!("arn:aws:s3:::{bucket}"),
               file_key: key.to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub mcu_count: u32,
    pub worker_count: u32,
}

/// Red del cluster destino donde corren los workers del conector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorNetwork {
    pub bootstrap_servers: String,
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
}

/// Referencia versionada (plugin o worker config) usada por un conector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revisioned {
    pub resource: ResourceRef,
    pub revision: u32,
}

/// Solicitud completa de creación de un conector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorRequest {
    pub name: String,
    pub kafka_connect_version: String,
    pub capacity: Capacity,
    pub configuration: BTreeMap<String, String>,
    pub network: ConnectorNetwork,
    /// Autenticación cliente hacia el cluster (siempre `IAM`).
    pub client_authentication: String,
    /// Cifrado en tránsito (siempre `TLS`).
    pub encryption_in_transit: String,
    pub plugin: Revisioned,
    pub worker_config: Option<Revisioned>,
    pub service_execution_role_arn: String,
}

/// Cambios aplicables a un conector existente.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorUpdate {
    pub current_version: String,
    pub configuration: BTreeMap<String, String>,
    pub capacity: Capacity,
}

/// Respuesta de operaciones de ciclo de vida: recurso y estado reportado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStatus {
    pub resource: ResourceRef,
    pub state: String,
}

#[async_trait]
pub trait ConnectControlPlane: Send + Sync {
    async fn create_plugin(&self, name: &str, location: &PluginLocation) -> PortResult<ResourceRef>;
    async fn describe_plugin_state(&self, plugin: &ResourceRef) -> PortResult<String>;
    /// `properties` es el cuerpo `clave=valor` ya renderizado.
    async fn create_worker_config(&self, name: &str, properties: &str) -> PortResult<ResourceRef>;
    async fn create_connector(&self, request: &ConnectorRequest) -> PortResult<ResourceRef>;
    async fn describe_connector_state(&self, connector: &ResourceRef) -> PortResult<String>;
    async fn update_connector(&self, connector: &ResourceRef, update: &ConnectorUpdate) -> PortResult<ResourceStatus>;
    async fn delete_connector(&self, connector: &ResourceRef, current_version: &str) -> PortResult<ResourceStatus>;
    async fn delete_plugin(&self, plugin: &ResourceRef) -> PortResult<ResourceStatus>;
    async fn delete_worker_config(&self, worker_config: &ResourceRef) -> PortResult<ResourceStatus>;
}

/// Asociación de una red (región + id) a una zona privada.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Association {
    pub region: String,
    pub network_id: String,
}

impl Association {
    pub fn new(region: impl Into<String>, network_id: impl Into<String>) -> Self {
        Self { region: region.into(),
               network_id: network_id.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSpec {
    pub name: String,
    pub value: String,
    pub ttl: u32,
}

#[async_trait]
pub trait DnsDirectory: Send + Sync {
    async fn resolve_zone_id(&self, zone_name: &str) -> PortResult<String>;
    async fn list_associations(&self, zone_id: &str) -> PortResult<Vec<Association>>;
    /// Devuelve `Conflict` si la asociación ya existe.
    async fn associate(&self, zone_id: &str, association: &Association) -> PortResult<()>;
    async fn disassociate(&self, zone_id: &str, association: &Association) -> PortResult<()>;
    /// UPSERT en un único lote; devuelve el id de seguimiento del cambio.
    async fn upsert_records(&self, zone_id: &str, records: &[RecordSpec]) -> PortResult<String>;
}
