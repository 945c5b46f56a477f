//! Topology Switch Orchestrator.
//!
//! Mueve el destino efectivo de una zona de un sitio al otro sin ventana en la
//! que la zona quede sin redes asociadas:
//!
//! 1. `resolve-sites`: cluster y red de ambos sitios.
//! 2. `resolve-zone`: id de la zona.
//! 3. `resolve-brokers`: hosts del sitio activo.
//! 4. `attach-association`: asocia la red activa (conflicto = éxito).
//! 5. `snapshot-associations`: relee las asociaciones tras asociar.
//! 6. `detach-superseded`: desasocia toda red distinta de la activa
//!    (comparando red y región).
//! 7. `upsert-records`: un CNAME por broker en un único lote.
//!
//! Un fallo corta la secuencia y queda registrado en el `RunReport`; lo ya
//! aplicado (p.ej. la asociación nueva) no se revierte.

use std::fmt;
use std::sync::Arc;

use log::{debug, error, info};
use msk_core::hashing::hash_value;
use msk_core::{require_fields, CoreEngineError, ProvisioningConfig, ResourceKind, ResourceRef, RunReport, StepResult};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{attach, broker_addresses, broker_records, display_name, normalize_zone_name, resolve_site, ResolvedSite,
            SiteSpec};
use crate::ports::{Association, ClusterDirectory, DnsDirectory};

pub const RESOLVE_SITES: &str = "resolve-sites";
pub const RESOLVE_ZONE: &str = "resolve-zone";
pub const RESOLVE_BROKERS: &str = "resolve-brokers";
pub const ATTACH_ASSOCIATION: &str = "attach-association";
pub const SNAPSHOT_ASSOCIATIONS: &str = "snapshot-associations";
pub const DETACH_SUPERSEDED: &str = "detach-superseded";
pub const UPSERT_RECORDS: &str = "upsert-records";

const STAGES: [&str; 7] = [RESOLVE_SITES,
                           RESOLVE_ZONE,
                           RESOLVE_BROKERS,
                           ATTACH_ASSOCIATION,
                           SNAPSHOT_ASSOCIATIONS,
                           DETACH_SUPERSEDED,
                           UPSERT_RECORDS];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteRole {
    Primary,
    Secondary,
}

impl fmt::Display for SiteRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
                        Self::Primary => "primary",
                        Self::Secondary => "secondary",
                    })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchRequest {
    pub primary: SiteSpec,
    pub secondary: SiteSpec,
    pub zone_name: String,
    /// `true` activa el sitio secundario (DR); `false` vuelve al primario.
    pub activate_secondary: bool,
}

impl SwitchRequest {
    pub fn active_role(&self) -> SiteRole {
        if self.activate_secondary {
            SiteRole::Secondary
        } else {
            SiteRole::Primary
        }
    }

    fn validate(&self) -> Result<(), CoreEngineError> {
        self.primary.validate("primary")?;
        self.secondary.validate("secondary")?;
        require_fields(&[("zone_name", self.zone_name.as_str())])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchOutcome {
    pub change_id: String,
    /// `broker<i>.<zona>` sin punto final.
    pub record_names: Vec<String>,
    pub active_role: SiteRole,
    pub active: Association,
    /// Asociaciones retiradas en `detach-superseded`.
    pub detached: Vec<Association>,
}

/// Traza de etapas más el resultado, presente sólo si todas terminaron bien.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchReport {
    pub report: RunReport,
    pub outcome: Option<SwitchOutcome>,
}

impl SwitchReport {
    pub fn completed(&self) -> bool {
        self.report.completed()
    }
}

/// Acumula un `StepResult` por etapa; la primera falla detiene el resto.
struct StageTrail {
    results: Vec<StepResult>,
}

impl StageTrail {
    fn new() -> Self {
        Self { results: Vec::with_capacity(STAGES.len()) }
    }

    fn record<T>(&mut self, stage: &str, res: Result<T, CoreEngineError>, output: impl FnOnce(&T) -> Option<ResourceRef>) -> Option<T> {
        match res {
            Ok(value) => {
                debug!("switch:stage ok stage={stage}");
                self.results.push(StepResult::succeeded(stage, output(&value)));
                Some(value)
            }
            Err(e) => {
                error!("switch:stage failed stage={stage} kind={:?} err={e}", e.kind());
                self.results.push(StepResult::failed(stage, e));
                None
            }
        }
    }

    fn finish(self, definition_hash: String, outcome: Option<SwitchOutcome>) -> SwitchReport {
        SwitchReport { report: RunReport::from_results(definition_hash, self.results, STAGES.len()),
                       outcome }
    }
}

/// Orquestador de conmutación entre dos sitios.
pub struct TopologySwitch {
    clusters: Arc<dyn ClusterDirectory>,
    dns: Arc<dyn DnsDirectory>,
    record_ttl: u32,
}

impl TopologySwitch {
    pub fn new(clusters: Arc<dyn ClusterDirectory>, dns: Arc<dyn DnsDirectory>, config: &ProvisioningConfig) -> Self {
        Self { clusters,
               dns,
               record_ttl: config.record_ttl }
    }

    /// Ejecuta la conmutación.
    ///
    /// `Err` sólo para entradas inválidas (antes de cualquier efecto externo);
    /// los fallos de etapa quedan en `SwitchReport::report`.
    pub async fn switch(&self, request: &SwitchRequest) -> Result<SwitchReport, CoreEngineError> {
        request.validate()?;
        let zone_name = normalize_zone_name(&request.zone_name);
        let role = request.active_role();
        let definition_hash = hash_value(&json!({
            "operation": "topology-switch",
            "stages": STAGES,
            "request": request,
            "record_ttl": self.record_ttl,
        }));
        let mut trail = StageTrail::new();
        info!("switch:start zone={zone_name} active_role={role}");

        let Some((primary, secondary)) = trail.record(RESOLVE_SITES, self.resolve_sites(request).await, |_| None) else {
            return Ok(trail.finish(definition_hash, None));
        };
        let active = match role {
            SiteRole::Primary => primary,
            SiteRole::Secondary => secondary,
        };

        let Some(zone_id) = trail.record(RESOLVE_ZONE, self.dns.resolve_zone_id(&zone_name).await, |id| {
                                 Some(ResourceRef::new(ResourceKind::Zone, id.clone()))
                             })
        else {
            return Ok(trail.finish(definition_hash, None));
        };

        let Some(brokers) = trail.record(RESOLVE_BROKERS,
                                         broker_addresses(self.clusters.as_ref(), &active.cluster).await,
                                         |_| Some(active.cluster.clone()))
        else {
            return Ok(trail.finish(definition_hash, None));
        };

        let attached = attach(self.dns.as_ref(), &zone_id, &active.association).await;
        let Some(()) = trail.record(ATTACH_ASSOCIATION, attached, |_| {
                           Some(ResourceRef::new(ResourceKind::Vpc, active.association.network_id.clone()))
                       })
        else {
            return Ok(trail.finish(definition_hash, None));
        };

        let Some(current) = trail.record(SNAPSHOT_ASSOCIATIONS, self.dns.list_associations(&zone_id).await, |_| None) else {
            return Ok(trail.finish(definition_hash, None));
        };

        let superseded: Vec<Association> = current.into_iter().filter(|a| *a != active.association).collect();
        let Some(detached) = trail.record(DETACH_SUPERSEDED, self.detach(&zone_id, superseded).await, |_| None) else {
            return Ok(trail.finish(definition_hash, None));
        };

        let records = broker_records(&zone_name, &brokers, self.record_ttl);
        let Some(change_id) = trail.record(UPSERT_RECORDS, self.dns.upsert_records(&zone_id, &records).await, |id| {
                                  Some(ResourceRef::new(ResourceKind::RecordChange, id.clone()))
                              })
        else {
            return Ok(trail.finish(definition_hash, None));
        };

        info!("switch:done zone={zone_name} active_role={role} records={} change={change_id}", records.len());
        let outcome = SwitchOutcome { change_id,
                                      record_names: records.iter().map(display_name).collect(),
                                      active_role: role,
                                      active: active.association,
                                      detached };
        Ok(trail.finish(definition_hash, Some(outcome)))
    }

    async fn resolve_sites(&self, request: &SwitchRequest) -> Result<(ResolvedSite, ResolvedSite), CoreEngineError> {
        let primary = resolve_site(self.clusters.as_ref(), &request.primary).await?;
        let secondary = resolve_site(self.clusters.as_ref(), &request.secondary).await?;
        Ok((primary, secondary))
    }

    async fn detach(&self, zone_id: &str, superseded: Vec<Association>) -> Result<Vec<Association>, CoreEngineError> {
        for association in &superseded {
            debug!("switch:detach zone={zone_id} network={} region={}", association.network_id, association.region);
            self.dns.disassociate(zone_id, association).await?;
        }
        Ok(superseded)
    }
}
