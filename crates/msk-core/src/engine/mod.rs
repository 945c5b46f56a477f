//! Pipeline Executor: corre una secuencia ordenada de Steps, encadena sus
//! outputs por contexto, se detiene en el primer fallo y devuelve la traza
//! completa (`RunReport`).

pub mod builder;
pub mod core;
pub mod report;

pub use builder::{ExecutorBuilder, ExecutorBuilderInit};
pub use core::PipelineExecutor;
pub use report::RunReport;

pub use crate::event::{EventStore, InMemoryEventStore, PipelineEvent, PipelineEventKind};
pub use crate::step::{PipelineStep, StepResult, StepRunResult};
