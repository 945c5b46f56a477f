//! Dominio DNS de los clusters: dominio personalizado y conmutación de sitio.
//!
//! Ambas operaciones comparten la misma secuencia base: resolver el sitio
//! (cluster + red), resolver la zona, asociar la red a la zona (un conflicto
//! cuenta como éxito) y escribir un CNAME por broker en un único lote.

pub mod custom_domain;
pub mod records;
pub mod switch;

use log::warn;
use msk_core::{require_fields, CoreEngineError, ResourceRef};
use serde::{Deserialize, Serialize};

use crate::ports::{Association, ClusterDirectory, DnsDirectory};

pub use custom_domain::{create_custom_domain, DomainRecords};
pub use records::{broker_host, broker_records, display_name, normalize_zone_name};
pub use switch::{SiteRole, SwitchOutcome, SwitchReport, SwitchRequest, TopologySwitch};

/// Un cluster y, opcionalmente, la red a asociar (si falta se resuelve).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSpec {
    pub region: String,
    pub cluster_name: String,
    #[serde(default)]
    pub vpc_id: Option<String>,
}

impl SiteSpec {
    pub fn new(region: impl Into<String>, cluster_name: impl Into<String>) -> Self {
        Self { region: region.into(),
               cluster_name: cluster_name.into(),
               vpc_id: None }
    }

    pub fn with_vpc(mut self, vpc_id: impl Into<String>) -> Self {
        self.vpc_id = Some(vpc_id.into());
        self
    }

    pub(crate) fn validate(&self, label: &str) -> Result<(), CoreEngineError> {
        let region = format!("{label}_region");
        let cluster = format!("{label}_cluster_name");
        require_fields(&[(region.as_str(), self.region.as_str()), (cluster.as_str(), self.cluster_name.as_str())])
    }
}

/// Sitio resuelto: cluster y asociación (región + red).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedSite {
    pub cluster: ResourceRef,
    pub association: Association,
}

pub(crate) async fn resolve_site(clusters: &dyn ClusterDirectory, site: &SiteSpec) -> Result<ResolvedSite, CoreEngineError> {
    let cluster = clusters.resolve_cluster_arn(&site.region, &site.cluster_name).await?;
    let network_id = match site.vpc_id.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(vpc) => vpc.to_string(),
        None => clusters.resolve_vpc(&cluster).await?.vpc_id,
    };
    Ok(ResolvedSite { cluster,
                      association: Association::new(site.region.clone(), network_id) })
}

/// Hosts de brokers del cluster en orden de preferencia de listener.
pub(crate) async fn broker_addresses(clusters: &dyn ClusterDirectory, cluster: &ResourceRef) -> Result<Vec<String>, CoreEngineError> {
    clusters.get_broker_addresses(cluster)
            .await?
            .preferred()
            .map(<[String]>::to_vec)
            .ok_or_else(|| CoreEngineError::NotFound(format!("no broker addresses for cluster {}", cluster.id())))
}

/// Asocia la red a la zona. `Conflict` (ya asociada) se absorbe.
pub(crate) async fn attach(dns: &dyn DnsDirectory, zone_id: &str, association: &Association) -> Result<(), CoreEngineError> {
    match dns.associate(zone_id, association).await {
        Ok(()) => Ok(()),
        Err(CoreEngineError::Conflict(msg)) => {
            warn!("attach:conflict absorbed zone={zone_id} network={} region={} msg={msg}",
                  association.network_id,
                  association.region);
            Ok(())
        }
        Err(e) => Err(e),
    }
}
