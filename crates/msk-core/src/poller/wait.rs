use std::future::Future;

use log::{debug, warn};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use super::{PollOutcome, WaitSpec};
use crate::errors::CoreEngineError;

/// Espera a que `check` devuelva un estado objetivo o de fallo.
///
/// Contrato:
/// - La primera consulta es inmediata (sin sleep inicial).
/// - Estado objetivo: éxito inmediato. Estado de fallo: fallo terminal
///   inmediato, sin reintentar.
/// - Cualquier otro estado (p.ej. `CREATING`) duerme `interval` (recortado al
///   tiempo restante) y vuelve a consultar hasta agotar `max_wait`.
/// - Si `check` falla, el error es terminal: sólo se reintentan estados que no
///   coinciden, nunca errores de la llamada.
/// - `cancel` se revisa en cada iteración y se compite tanto contra la
///   consulta como contra el sleep.
/// - `max_wait` es un plazo absoluto: una consulta colgada no lo extiende.
pub async fn wait_for<F, Fut>(spec: &WaitSpec, cancel: &CancellationToken, mut check: F) -> PollOutcome
    where F: FnMut() -> Fut,
          Fut: Future<Output = Result<String, CoreEngineError>>
{
    if let Err(e) = spec.validate() {
        return PollOutcome::errored(e, 0);
    }
    let name = spec.name.as_str();
    let deadline = Instant::now() + spec.max_wait;
    let mut attempts = 0u32;

    debug!("wait_for:start name={name} max_wait={:?} interval={:?}", spec.max_wait, spec.interval);
    loop {
        if cancel.is_cancelled() {
            return PollOutcome::cancelled(name, attempts);
        }

        attempts += 1;
        let polled = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::cancelled(name, attempts),
            res = check() => res,
            _ = sleep_until(deadline) => {
                warn!("wait_for:check hung name={name} attempt={attempts}");
                return PollOutcome::timed_out(name, spec.max_wait, attempts);
            }
        };

        let state = match polled {
            Ok(state) => state,
            Err(e) => {
                warn!("wait_for:check error name={name} attempt={attempts} err={e}");
                return PollOutcome::errored(e, attempts);
            }
        };

        if spec.is_target(&state) {
            debug!("wait_for:done name={name} state={state} attempts={attempts}");
            return PollOutcome::reached(name, state, attempts);
        }
        if spec.is_failure(&state) {
            warn!("wait_for:failed name={name} state={state} attempts={attempts}");
            return PollOutcome::failed(name, state, attempts);
        }

        let now = Instant::now();
        if now >= deadline {
            return PollOutcome::timed_out(name, spec.max_wait, attempts);
        }
        let wake = (now + spec.interval).min(deadline);
        debug!("wait_for:pending name={name} state={state} attempt={attempts} sleeping={:?}", wake - now);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::cancelled(name, attempts),
            _ = sleep_until(wake) => {}
        }

        if Instant::now() >= deadline {
            return PollOutcome::timed_out(name, spec.max_wait, attempts);
        }
    }
}
