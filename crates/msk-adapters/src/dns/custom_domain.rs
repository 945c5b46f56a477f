//! Dominio personalizado para un único cluster.

use log::{debug, info};
use msk_core::{require_fields, CoreEngineError};
use serde::{Deserialize, Serialize};

use super::{attach, broker_addresses, broker_records, display_name, normalize_zone_name, resolve_site, SiteSpec};
use crate::ports::{ClusterDirectory, DnsDirectory};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecords {
    pub zone_id: String,
    pub change_id: String,
    /// `broker<i>.<zona>` sin punto final.
    pub record_names: Vec<String>,
}

/// Asocia la red del cluster a la zona y publica un CNAME por broker.
///
/// Orden: red del cluster, brokers, zona, asociación, registros. Un fallo
/// corta la secuencia; la asociación ya aplicada no se revierte.
pub async fn create_custom_domain(clusters: &dyn ClusterDirectory,
                                  dns: &dyn DnsDirectory,
                                  site: &SiteSpec,
                                  zone_name: &str,
                                  ttl: u32)
                                  -> Result<DomainRecords, CoreEngineError> {
    site.validate("cluster")?;
    require_fields(&[("zone_name", zone_name)])?;
    let zone_name = normalize_zone_name(zone_name);
    debug!("custom_domain:start cluster={} region={} zone={zone_name}", site.cluster_name, site.region);

    let resolved = resolve_site(clusters, site).await?;
    let brokers = broker_addresses(clusters, &resolved.cluster).await?;
    let zone_id = dns.resolve_zone_id(&zone_name).await?;
    attach(dns, &zone_id, &resolved.association).await?;

    let records = broker_records(&zone_name, &brokers, ttl);
    let change_id = dns.upsert_records(&zone_id, &records).await?;
    info!("custom_domain:done zone={zone_name} records={} change={change_id}", records.len());

    Ok(DomainRecords { zone_id,
                       change_id,
                       record_names: records.iter().map(display_name).collect() })
}
