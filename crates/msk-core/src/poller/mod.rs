//! State Poller: convierte el estado cambiante de un recurso externo en un
//! resultado síncrono (desde el punto de vista del llamador) con tiempo acotado.
//!
//! - `WaitSpec`: qué estados son objetivo, cuáles son fallo terminal, cuánto
//!   esperar y cada cuánto consultar.
//! - `wait_for`: el loop de polling, cancelable.
//! - `PollOutcome`: resultado inmutable de una espera.

mod outcome;
mod spec;
mod wait;

pub use outcome::PollOutcome;
pub use spec::{WaitSpec, DEFAULT_INTERVAL, DEFAULT_MAX_WAIT};
pub use wait::wait_for;
