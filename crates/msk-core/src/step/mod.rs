//! Definiciones relacionadas a Steps.
//!
//! Un Step es una acción de aprovisionamiento con nombre: invoca una operación
//! externa, opcionalmente espera (vía el State Poller) y produce un
//! `ResourceRef` o un fallo. Nunca queda a medias.

pub mod definition;
mod run_result;

pub use definition::{PipelineStep, StepKind};
pub use run_result::{StepResult, StepRunResult};
