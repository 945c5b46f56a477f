//! Configuraciones de conectores MirrorMaker2.
//!
//! Tres roles: heartbeat, checkpoint y source. Todos comparten el bloque
//! común (alias, bootstrap servers, conversores, tuning de producer/consumer)
//! y reciben fusionadas las claves de autenticación de ambos clusters.

use std::collections::BTreeMap;
use std::fmt;

use msk_core::AuthConfig;
use serde::{Deserialize, Serialize};

pub const SOURCE_ALIAS: &str = "source";
pub const TARGET_ALIAS: &str = "target";

const BYTE_ARRAY_CONVERTER: &str = "org.apache.kafka.connect.converters.ByteArrayConverter";
const CHECKPOINT_TOPICS_EXCLUDE: &str = ".*[-.]internal, .*.replica, __.*, .*-config, .*-status, .*-offset";
const CHECKPOINT_GROUPS_EXCLUDE: &str = "console-consumer-.*, connect-.*, __.*";
const SOURCE_TOPICS_EXCLUDE: &str = ".*[-.]internal,.*.replica,__.*,.*-config,.*-status,.*-offset";
const SOURCE_GROUPS_EXCLUDE: &str = "console-consumer-.*,connect-.*,__.*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorRole {
    Heartbeat,
    Checkpoint,
    Source,
}

impl MirrorRole {
    pub const ALL: [MirrorRole; 3] = [MirrorRole::Heartbeat, MirrorRole::Checkpoint, MirrorRole::Source];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heartbeat => "heartbeat",
            Self::Checkpoint => "checkpoint",
            Self::Source => "source",
        }
    }

    pub fn connector_class(&self) -> &'static str {
        match self {
            Self::Heartbeat => "org.apache.kafka.connect.mirror.MirrorHeartbeatConnector",
            Self::Checkpoint => "org.apache.kafka.connect.mirror.MirrorCheckpointConnector",
            Self::Source => "org.apache.kafka.connect.mirror.MirrorSourceConnector",
        }
    }

    /// `<plugin>-<rol>`.
    pub fn connector_name(&self, plugin_name: &str) -> String {
        format!("{plugin_name}-{}", self.as_str())
    }
}

impl fmt::Display for MirrorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entradas compartidas por los tres conectores de una topología.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorEndpoints {
    pub source_bootstrap_servers: String,
    pub target_bootstrap_servers: String,
    pub replication_factor: u32,
    pub tasks_max: u32,
}

/// Construye la configuración completa de un conector para `role`.
///
/// `auth` son las claves ya construidas y fusionadas de source y target.
pub fn connector_config(role: MirrorRole, endpoints: &MirrorEndpoints, auth: &AuthConfig) -> BTreeMap<String, String> {
    let mut config = BTreeMap::new();
    let mut set = |k: &str, v: &str| {
        config.insert(k.to_string(), v.to_string());
    };

    set("connector.class", role.connector_class());
    set("clusters", &format!("{SOURCE_ALIAS},{TARGET_ALIAS}"));
    set("source.cluster.alias", SOURCE_ALIAS);
    set("target.cluster.alias", TARGET_ALIAS);
    set("source.cluster.bootstrap.servers", &endpoints.source_bootstrap_servers);
    set("target.cluster.bootstrap.servers", &endpoints.target_bootstrap_servers);
    set("key.converter", BYTE_ARRAY_CONVERTER);
    set("value.converter", BYTE_ARRAY_CONVERTER);
    set("producer.linger.ms", "500");
    set("producer.retry.backoff.ms", "1000");
    set("producer.max.block.ms", "10000");
    set("consumer.auto.offset.reset", "earliest");
    set("replication.factor", &endpoints.replication_factor.to_string());
    set("tasks.max", &endpoints.tasks_max.to_string());

    match role {
        MirrorRole::Heartbeat => {}
        MirrorRole::Checkpoint => {
            set("topics", ".*");
            set("topics.exclude", CHECKPOINT_TOPICS_EXCLUDE);
            set("groups.exclude", CHECKPOINT_GROUPS_EXCLUDE);
            set("refresh.groups.enabled", "true");
            set("refresh.groups.interval.seconds", "60");
            set("emit.checkpoints.enabled", "true");
            set("sync.group.offsets.interval.seconds", "5");
        }
        MirrorRole::Source => {
            set("topics", ".*");
            set("topics.exclude", SOURCE_TOPICS_EXCLUDE);
            set("groups.exclude", SOURCE_GROUPS_EXCLUDE);
            set("refresh.groups.enabled", "true");
            set("refresh.groups.interval.seconds", "60");
            set("refresh.topics.enabled", "true");
            set("refresh.topics.interval.seconds", "60");
            set("emit.checkpoints.enabled", "true");
            set("sync.topic.configs.enabled", "true");
            set("sync.topic.configs.interval.seconds", "60");
        }
    }

    config.extend(auth.iter().map(|(k, v)| (k.clone(), v.clone())));
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use msk_core::{build_auth_config, AuthSpec};

    fn endpoints() -> MirrorEndpoints {
        MirrorEndpoints { source_bootstrap_servers: "b-1.src:9098".into(),
                          target_bootstrap_servers: "b-1.dst:9098".into(),
                          replication_factor: 3,
                          tasks_max: 1 }
    }

    #[test]
    fn heartbeat_has_only_common_keys_and_auth() {
        let auth = build_auth_config("source", &AuthSpec::plaintext()).unwrap();
        let cfg = connector_config(MirrorRole::Heartbeat, &endpoints(), &auth);
        assert_eq!(cfg["connector.class"], "org.apache.kafka.connect.mirror.MirrorHeartbeatConnector");
        assert_eq!(cfg["clusters"], "source,target");
        assert!(!cfg.contains_key("topics"));
        assert_eq!(cfg["source.cluster.security.protocol"], "PLAINTEXT");
        assert_eq!(cfg.len(), 14 + 3);
    }

    #[test]
    fn checkpoint_and_source_use_their_own_filters() {
        let auth = AuthConfig::new();
        let checkpoint = connector_config(MirrorRole::Checkpoint, &endpoints(), &auth);
        let source = connector_config(MirrorRole::Source, &endpoints(), &auth);

        assert_eq!(checkpoint["sync.group.offsets.interval.seconds"], "5");
        assert_eq!(checkpoint["groups.exclude"], "console-consumer-.*, connect-.*, __.*");
        assert!(!checkpoint.contains_key("sync.topic.configs.enabled"));

        assert_eq!(source["groups.exclude"], "console-consumer-.*,connect-.*,__.*");
        assert_eq!(source["refresh.topics.enabled"], "true");
        assert_eq!(source["sync.topic.configs.interval.seconds"], "60");
        assert!(!source.contains_key("sync.group.offsets.interval.seconds"));
    }

    #[test]
    fn connector_names_follow_plugin() {
        let names: Vec<String> = MirrorRole::ALL.iter().map(|r| r.connector_name("mm2")).collect();
        assert_eq!(names, vec!["mm2-heartbeat", "mm2-checkpoint", "mm2-source"]);
    }
}
