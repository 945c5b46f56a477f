//! msk-adapters: steps concretos, puertos hacia los servicios externos y
//! orquestaciones DNS sobre el motor de `msk-core`.
//!
//! - `ports`: contratos de los colaboradores (clusters, Kafka Connect, DNS).
//! - `memory`: implementaciones en memoria de esos contratos.
//! - `steps` + `replication`: pipeline MirrorMaker2.
//! - `dns`: dominio personalizado y conmutación de sitio.
pub mod dns;
pub mod lifecycle;
pub mod memory;
pub mod mirror;
pub mod ports;
pub mod readiness;
pub mod replication;
pub mod steps;

pub use dns::{create_custom_domain, DomainRecords, SiteRole, SiteSpec, SwitchOutcome, SwitchReport, SwitchRequest,
              TopologySwitch};
pub use memory::{InMemoryClusterDirectory, InMemoryConnectControlPlane, InMemoryDnsDirectory};
pub use mirror::MirrorRole;
pub use ports::{Association, BrokerAddresses, ClusterDirectory, ConnectControlPlane, DnsDirectory, VpcInfo};
pub use readiness::{wait_for_connector_ready, wait_for_plugin_ready};
pub use replication::{ReplicationPlan, ReplicationSettings, WorkerConfigSettings};
