//! Builder para `PipelineExecutor`.
//!
//! Obliga a declarar el primer paso antes de poder construir, de modo que un
//! executor armado con el builder nunca tiene un plan vacío.
//!
//! ```ignore
//! let mut executor = PipelineExecutor::new()
//!     .first_step(CreatePluginStep::new(..))
//!     .add_step(CreateConnectorStep::new(..))
//!     .build();
//! let report = executor.run().await;
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::engine::PipelineExecutor;
use crate::event::EventStore;
use crate::step::PipelineStep;

/// Estado inicial: sólo el store de eventos.
#[derive(Debug)]
pub struct ExecutorBuilderInit<E: EventStore> {
    pub event_store: E,
}

impl<E: EventStore> ExecutorBuilderInit<E> {
    #[inline]
    pub fn first_step<S>(self, step: S) -> ExecutorBuilder<E>
        where S: PipelineStep + 'static
    {
        ExecutorBuilder { event_store: self.event_store,
                          steps: vec![Arc::new(step)],
                          cancel: None }
    }
}

/// Builder principal que acumula pasos en orden.
pub struct ExecutorBuilder<E: EventStore> {
    event_store: E,
    steps: Vec<Arc<dyn PipelineStep>>,
    cancel: Option<CancellationToken>,
}

impl<E: EventStore> ExecutorBuilder<E> {
    #[inline]
    pub fn add_step<S>(mut self, next: S) -> Self
        where S: PipelineStep + 'static
    {
        self.steps.push(Arc::new(next));
        self
    }

    /// Agrega el paso sólo si está presente (p.ej. la worker config opcional).
    #[inline]
    pub fn add_optional_step<S>(self, next: Option<S>) -> Self
        where S: PipelineStep + 'static
    {
        match next {
            Some(step) => self.add_step(step),
            None => self,
        }
    }

    /// Token externo (deadline de la request, shutdown). Cada corrida usa un hijo.
    #[inline]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[inline]
    pub fn build(self) -> PipelineExecutor<E> {
        let mut executor = PipelineExecutor::with_store(self.steps, self.event_store);
        if let Some(token) = self.cancel {
            executor.set_cancellation(token);
        }
        executor
    }
}
