//! Referencia opaca a un recurso externo.
//!
//! Un `ResourceRef` lo produce el Step que creó o resolvió el recurso y se
//! entrega por valor a los Steps posteriores. Es inmutable: no expone setters
//! y nunca se reconstruye parseando mensajes de texto.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CoreEngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Plugin,
    Connector,
    WorkerConfig,
    Zone,
    Cluster,
    Vpc,
    RecordChange,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plugin => "plugin",
            Self::Connector => "connector",
            Self::WorkerConfig => "worker-config",
            Self::Zone => "zone",
            Self::Cluster => "cluster",
            Self::Vpc => "vpc",
            Self::RecordChange => "record-change",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    kind: ResourceKind,
    id: String,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Identificador externo (ARN, id de zona, etc.).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Falla con `Validation` si la referencia no es del tipo esperado o está vacía.
    pub fn expect_kind(&self, kind: ResourceKind) -> Result<&Self, CoreEngineError> {
        if self.kind != kind {
            return Err(CoreEngineError::Validation(format!("expected a {kind} reference, got {}", self.kind)));
        }
        if self.id.trim().is_empty() {
            return Err(CoreEngineError::Validation(format!("{kind} reference has an empty identifier")));
        }
        Ok(self)
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
