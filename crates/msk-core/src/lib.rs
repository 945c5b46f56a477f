//! msk-core: motor de orquestación de aprovisionamiento (pasos secuenciales,
//! polling de estados y configuración de autenticación).
pub mod auth;
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod model;
pub mod poller;
pub mod step;

pub use auth::{build_auth_config, AuthConfig, AuthMechanism, AuthSpec};
pub use config::ProvisioningConfig;
pub use engine::{ExecutorBuilder, ExecutorBuilderInit, PipelineExecutor, RunReport};
pub use errors::{require_fields, CoreEngineError, ErrorKind};
pub use event::{EventStore, InMemoryEventStore, PipelineEvent, PipelineEventKind};
pub use model::{ResourceKind, ResourceRef, StepContext};
pub use poller::{wait_for, PollOutcome, WaitSpec};
pub use step::{PipelineStep, StepKind, StepResult, StepRunResult};

// Re-export para que los crates de pasos no dependan directamente de tokio-util.
pub use tokio_util::sync::CancellationToken;
