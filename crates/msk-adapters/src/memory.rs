//! Colaboradores en memoria.
//!
//! Implementan los tres puertos sin red, con secuencias de estados guionadas
//! y fallos inyectables por operación. Registran cada operación aplicada
//! para que los tests verifiquen orden y efectos.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use indexmap::IndexMap;
use msk_core::{CoreEngineError, ResourceKind, ResourceRef};
use tokio::sync::Mutex;

use crate::dns::normalize_zone_name;
use crate::ports::{Association, BrokerAddresses, ClusterDirectory, ConnectControlPlane, ConnectorRequest,
                   ConnectorUpdate, DnsDirectory, PluginLocation, PortResult, RecordSpec, ResourceStatus, VpcInfo};

const ACCOUNT: &str = "000000000000";

/// Secuencia de estados: cada consulta consume uno y el último se repite.
#[derive(Debug, Clone)]
struct StateScript(VecDeque<String>);

impl StateScript {
    fn of(states: &[&str]) -> Self {
        Self(states.iter().map(|s| s.to_string()).collect())
    }

    fn next(&mut self) -> String {
        if self.0.len() > 1 {
            self.0.pop_front().unwrap_or_default()
        } else {
            self.0.front().cloned().unwrap_or_default()
        }
    }
}

/// Fallos inyectados por nombre de operación; se consumen en el primer uso.
#[derive(Debug, Default)]
struct Faults(HashMap<String, CoreEngineError>);

impl Faults {
    fn take(&mut self, op: &str) -> PortResult<()> {
        match self.0.remove(op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// ClusterDirectory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct ClusterRecord {
    arn: String,
    brokers: BrokerAddresses,
    vpc: Option<VpcInfo>,
}

/// Directorio de clusters estático: se arma una vez y sólo se lee.
#[derive(Debug, Default)]
pub struct InMemoryClusterDirectory {
    clusters: HashMap<(String, String), ClusterRecord>,
}

impl InMemoryClusterDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cluster(mut self, region: &str, name: &str, brokers: BrokerAddresses, vpc: Option<VpcInfo>) -> Self {
        let arn = format!("arn:aws:kafka:{region}:{ACCOUNT}:cluster/{name}/0");
        self.clusters
            .insert((region.to_string(), name.to_string()), ClusterRecord { arn, brokers, vpc });
        self
    }

    fn by_arn(&self, cluster: &ResourceRef) -> PortResult<&ClusterRecord> {
        self.clusters
            .values()
            .find(|c| c.arn == cluster.id())
            .ok_or_else(|| CoreEngineError::NotFound(format!("cluster {}", cluster.id())))
    }
}

#[async_trait]
impl ClusterDirectory for InMemoryClusterDirectory {
    async fn resolve_cluster_arn(&self, region: &str, cluster_name: &str) -> PortResult<ResourceRef> {
        self.clusters
            .get(&(region.to_string(), cluster_name.to_string()))
            .map(|c| ResourceRef::new(ResourceKind::Cluster, c.arn.clone()))
            .ok_or_else(|| CoreEngineError::NotFound(format!("cluster {cluster_name} in {region}")))
    }

    async fn get_broker_addresses(&self, cluster: &ResourceRef) -> PortResult<BrokerAddresses> {
        Ok(self.by_arn(cluster)?.brokers.clone())
    }

    async fn resolve_vpc(&self, cluster: &ResourceRef) -> PortResult<VpcInfo> {
        self.by_arn(cluster)?
            .vpc
            .clone()
            .ok_or_else(|| CoreEngineError::NotFound(format!("vpc for cluster {}", cluster.id())))
    }
}

// ---------------------------------------------------------------------------
// ConnectControlPlane
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct PluginRecord {
    name: String,
    script: StateScript,
}

#[derive(Debug)]
struct ConnectorRecord {
    request: ConnectorRequest,
    version: u32,
    script: StateScript,
}

#[derive(Debug)]
struct ConnectState {
    plugins: IndexMap<String, PluginRecord>,
    connectors: IndexMap<String, ConnectorRecord>,
    worker_configs: IndexMap<String, (String, String)>,
    plugin_script: StateScript,
    connector_script: StateScript,
    faults: Faults,
    operations: Vec<String>,
    state_checks: u32,
    seq: u32,
}

/// Control plane en memoria. Por defecto un plugin pasa por
/// `CREATING → ACTIVE` y un conector por `CREATING → RUNNING`.
#[derive(Debug)]
pub struct InMemoryConnectControlPlane {
    region: String,
    state: Mutex<ConnectState>,
}

impl Default for InMemoryConnectControlPlane {
    fn default() -> Self {
        Self::new("us-east-1")
    }
}

impl InMemoryConnectControlPlane {
    pub fn new(region: &str) -> Self {
        Self { region: region.to_string(),
               state: Mutex::new(ConnectState { plugins: IndexMap::new(),
                                                connectors: IndexMap::new(),
                                                worker_configs: IndexMap::new(),
                                                plugin_script: StateScript::of(&["CREATING", "ACTIVE"]),
                                                connector_script: StateScript::of(&["CREATING", "RUNNING"]),
                                                faults: Faults::default(),
                                                operations: Vec::new(),
                                                state_checks: 0,
                                                seq: 0 }) }
    }

    /// Estados que recorrerán los plugins creados a partir de ahora.
    pub fn with_plugin_states(mut self, states: &[&str]) -> Self {
        self.state.get_mut().plugin_script = StateScript::of(states);
        self
    }

    pub fn with_connector_states(mut self, states: &[&str]) -> Self {
        self.state.get_mut().connector_script = StateScript::of(states);
        self
    }

    /// La próxima invocación de `op` falla con `err`.
    pub async fn fail_next(&self, op: &str, err: CoreEngineError) {
        self.state.lock().await.faults.0.insert(op.to_string(), err);
    }

    /// Operaciones aplicadas, p.ej. `create_connector:mm2-heartbeat`.
    pub async fn operations(&self) -> Vec<String> {
        self.state.lock().await.operations.clone()
    }

    /// Consultas de estado (plugin o conector) recibidas hasta ahora.
    pub async fn state_checks(&self) -> u32 {
        self.state.lock().await.state_checks
    }

    pub async fn connector_request(&self, name: &str) -> Option<ConnectorRequest> {
        self.state
            .lock()
            .await
            .connectors
            .values()
            .find(|c| c.request.name == name)
            .map(|c| c.request.clone())
    }

    pub async fn connector_names(&self) -> Vec<String> {
        self.state.lock().await.connectors.values().map(|c| c.request.name.clone()).collect()
    }

    /// Cuerpo de propiedades de una worker config por nombre.
    pub async fn worker_config_body(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .await
            .worker_configs
            .values()
            .find(|(n, _)| n == name)
            .map(|(_, body)| body.clone())
    }

    fn arn(&self, kind: &str, name: &str, seq: u32) -> String {
        format!("arn:aws:kafkaconnect:{}:{ACCOUNT}:{kind}/{name}/{seq}", self.region)
    }
}

fn missing(kind: ResourceKind, id: &str) -> CoreEngineError {
    CoreEngineError::NotFound(format!("{kind} {id}"))
}

#[async_trait]
impl ConnectControlPlane for InMemoryConnectControlPlane {
    async fn create_plugin(&self, name: &str, _location: &PluginLocation) -> PortResult<ResourceRef> {
        let mut s = self.state.lock().await;
        s.faults.take("create_plugin")?;
        if s.plugins.values().any(|p| p.name == name) {
            return Err(CoreEngineError::Conflict(format!("custom plugin {name} already exists")));
        }
        s.seq += 1;
        let arn = self.arn("custom-plugin", name, s.seq);
        let script = s.plugin_script.clone();
        s.plugins.insert(arn.clone(), PluginRecord { name: name.to_string(), script });
        s.operations.push(format!("create_plugin:{name}"));
        Ok(ResourceRef::new(ResourceKind::Plugin, arn))
    }

    async fn describe_plugin_state(&self, plugin: &ResourceRef) -> PortResult<String> {
        let mut s = self.state.lock().await;
        s.state_checks += 1;
        s.faults.take("describe_plugin_state")?;
        s.plugins
         .get_mut(plugin.id())
         .map(|p| p.script.next())
         .ok_or_else(|| missing(ResourceKind::Plugin, plugin.id()))
    }

    async fn create_worker_config(&self, name: &str, properties: &str) -> PortResult<ResourceRef> {
        let mut s = self.state.lock().await;
        s.faults.take("create_worker_config")?;
        if s.worker_configs.values().any(|(n, _)| n == name) {
            return Err(CoreEngineError::Conflict(format!("worker configuration {name} already exists")));
        }
        s.seq += 1;
        let arn = self.arn("worker-configuration", name, s.seq);
        s.worker_configs.insert(arn.clone(), (name.to_string(), properties.to_string()));
        s.operations.push(format!("create_worker_config:{name}"));
        Ok(ResourceRef::new(ResourceKind::WorkerConfig, arn))
    }

    async fn create_connector(&self, request: &ConnectorRequest) -> PortResult<ResourceRef> {
        let mut s = self.state.lock().await;
        s.faults.take("create_connector")?;
        if !s.plugins.contains_key(request.plugin.resource.id()) {
            return Err(missing(ResourceKind::Plugin, request.plugin.resource.id()));
        }
        if s.connectors.values().any(|c| c.request.name == request.name) {
            return Err(CoreEngineError::Conflict(format!("connector {} already exists", request.name)));
        }
        s.seq += 1;
        let arn = self.arn("connector", &request.name, s.seq);
        let script = s.connector_script.clone();
        s.connectors.insert(arn.clone(),
                            ConnectorRecord { request: request.clone(),
                                              version: 1,
                                              script });
        s.operations.push(format!("create_connector:{}", request.name));
        Ok(ResourceRef::new(ResourceKind::Connector, arn))
    }

    async fn describe_connector_state(&self, connector: &ResourceRef) -> PortResult<String> {
        let mut s = self.state.lock().await;
        s.state_checks += 1;
        s.faults.take("describe_connector_state")?;
        s.connectors
         .get_mut(connector.id())
         .map(|c| c.script.next())
         .ok_or_else(|| missing(ResourceKind::Connector, connector.id()))
    }

    async fn update_connector(&self, connector: &ResourceRef, update: &ConnectorUpdate) -> PortResult<ResourceStatus> {
        let mut s = self.state.lock().await;
        s.faults.take("update_connector")?;
        let record = s.connectors
                      .get_mut(connector.id())
                      .ok_or_else(|| missing(ResourceKind::Connector, connector.id()))?;
        if record.version.to_string() != update.current_version {
            return Err(CoreEngineError::external("BadRequestException",
                                                 format!("current version {} does not match {}",
                                                         update.current_version, record.version)));
        }
        record.version += 1;
        record.request.configuration = update.configuration.clone();
        record.request.capacity = update.capacity;
        let name = record.request.name.clone();
        s.operations.push(format!("update_connector:{name}"));
        Ok(ResourceStatus { resource: connector.clone(),
                            state: "UPDATING".to_string() })
    }

    async fn delete_connector(&self, connector: &ResourceRef, current_version: &str) -> PortResult<ResourceStatus> {
        let mut s = self.state.lock().await;
        s.faults.take("delete_connector")?;
        let version = s.connectors
                       .get(connector.id())
                       .map(|c| c.version)
                       .ok_or_else(|| missing(ResourceKind::Connector, connector.id()))?;
        if version.to_string() != current_version {
            return Err(CoreEngineError::external("BadRequestException",
                                                 format!("current version {current_version} does not match {version}")));
        }
        if let Some(removed) = s.connectors.shift_remove(connector.id()) {
            s.operations.push(format!("delete_connector:{}", removed.request.name));
        }
        Ok(ResourceStatus { resource: connector.clone(),
                            state: "DELETING".to_string() })
    }

    async fn delete_plugin(&self, plugin: &ResourceRef) -> PortResult<ResourceStatus> {
        let mut s = self.state.lock().await;
        s.faults.take("delete_plugin")?;
        let removed = s.plugins
                       .shift_remove(plugin.id())
                       .ok_or_else(|| missing(ResourceKind::Plugin, plugin.id()))?;
        s.operations.push(format!("delete_plugin:{}", removed.name));
        Ok(ResourceStatus { resource: plugin.clone(),
                            state: "DELETING".to_string() })
    }

    async fn delete_worker_config(&self, worker_config: &ResourceRef) -> PortResult<ResourceStatus> {
        let mut s = self.state.lock().await;
        s.faults.take("delete_worker_config")?;
        let (name, _) = s.worker_configs
                         .shift_remove(worker_config.id())
                         .ok_or_else(|| missing(ResourceKind::WorkerConfig, worker_config.id()))?;
        s.operations.push(format!("delete_worker_config:{name}"));
        Ok(ResourceStatus { resource: worker_config.clone(),
                            state: "DELETING".to_string() })
    }
}

// ---------------------------------------------------------------------------
// DnsDirectory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Zone {
    id: String,
    associations: Vec<Association>,
    records: IndexMap<String, RecordSpec>,
}

#[derive(Debug, Default)]
struct DnsState {
    zones: IndexMap<String, Zone>,
    faults: Faults,
    operations: Vec<String>,
    association_counts: Vec<usize>,
    changes: u32,
}

impl DnsState {
    fn zone_mut(&mut self, zone_id: &str) -> PortResult<&mut Zone> {
        self.zones
            .values_mut()
            .find(|z| z.id == zone_id)
            .ok_or_else(|| missing(ResourceKind::Zone, zone_id))
    }
}

/// Zonas privadas en memoria.
///
/// Como el servicio real, rechaza desasociar la última red de una zona y
/// devuelve `Conflict` al asociar una red ya presente.
#[derive(Debug, Default)]
pub struct InMemoryDnsDirectory {
    state: Mutex<DnsState>,
}

impl InMemoryDnsDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(mut self, zone_name: &str, zone_id: &str, associations: Vec<Association>) -> Self {
        self.state.get_mut().zones.insert(normalize_zone_name(zone_name),
                                          Zone { id: zone_id.to_string(),
                                                 associations,
                                                 records: IndexMap::new() });
        self
    }

    pub async fn fail_next(&self, op: &str, err: CoreEngineError) {
        self.state.lock().await.faults.0.insert(op.to_string(), err);
    }

    pub async fn associations(&self, zone_id: &str) -> Vec<Association> {
        let mut s = self.state.lock().await;
        s.zone_mut(zone_id).map(|z| z.associations.clone()).unwrap_or_default()
    }

    pub async fn records(&self, zone_id: &str) -> Vec<RecordSpec> {
        let mut s = self.state.lock().await;
        s.zone_mut(zone_id)
         .map(|z| z.records.values().cloned().collect())
         .unwrap_or_default()
    }

    pub async fn operations(&self) -> Vec<String> {
        self.state.lock().await.operations.clone()
    }

    /// Cantidad de asociaciones observada tras cada asociar/desasociar.
    pub async fn association_counts(&self) -> Vec<usize> {
        self.state.lock().await.association_counts.clone()
    }
}

#[async_trait]
impl DnsDirectory for InMemoryDnsDirectory {
    async fn resolve_zone_id(&self, zone_name: &str) -> PortResult<String> {
        let mut s = self.state.lock().await;
        s.faults.take("resolve_zone_id")?;
        let key = normalize_zone_name(zone_name);
        s.zones
         .get(&key)
         .map(|z| z.id.clone())
         .ok_or_else(|| CoreEngineError::NotFound(format!("hosted zone {key}")))
    }

    async fn list_associations(&self, zone_id: &str) -> PortResult<Vec<Association>> {
        let mut s = self.state.lock().await;
        s.faults.take("list_associations")?;
        Ok(s.zone_mut(zone_id)?.associations.clone())
    }

    async fn associate(&self, zone_id: &str, association: &Association) -> PortResult<()> {
        let mut s = self.state.lock().await;
        s.faults.take("associate")?;
        let zone = s.zone_mut(zone_id)?;
        if zone.associations.contains(association) {
            return Err(CoreEngineError::Conflict(format!("{} in {} is already associated with {zone_id}",
                                                         association.network_id, association.region)));
        }
        zone.associations.push(association.clone());
        let count = zone.associations.len();
        s.association_counts.push(count);
        s.operations
         .push(format!("associate:{}:{}", association.region, association.network_id));
        Ok(())
    }

    async fn disassociate(&self, zone_id: &str, association: &Association) -> PortResult<()> {
        let mut s = self.state.lock().await;
        s.faults.take("disassociate")?;
        let zone = s.zone_mut(zone_id)?;
        let position = zone.associations
                           .iter()
                           .position(|a| a == association)
                           .ok_or_else(|| CoreEngineError::NotFound(format!("association {} in {}",
                                                                            association.network_id, association.region)))?;
        if zone.associations.len() == 1 {
            return Err(CoreEngineError::external("LastVPCAssociation",
                                                 format!("cannot disassociate the last network from {zone_id}")));
        }
        zone.associations.remove(position);
        let count = zone.associations.len();
        s.association_counts.push(count);
        s.operations
         .push(format!("disassociate:{}:{}", association.region, association.network_id));
        Ok(())
    }

    async fn upsert_records(&self, zone_id: &str, records: &[RecordSpec]) -> PortResult<String> {
        let mut s = self.state.lock().await;
        s.faults.take("upsert_records")?;
        let zone = s.zone_mut(zone_id)?;
        for record in records {
            zone.records.insert(record.name.clone(), record.clone());
        }
        s.changes += 1;
        let change_id = format!("/change/C{:04}", s.changes);
        s.operations.push(format!("upsert_records:{}", records.len()));
        Ok(change_id)
    }
}
