//! Constantes del motor core.
//!
//! `ENGINE_VERSION` participa en el `definition_hash` de cada plan: un cambio
//! de versión produce hashes distintos aunque los pasos sean los mismos.

pub const ENGINE_VERSION: &str = "M1.0";

/// Estado sintético de un poll que agotó su tiempo máximo.
pub const STATE_TIMEOUT: &str = "TIMEOUT";
/// Estado sintético de un poll cuyo `check` falló.
pub const STATE_ERROR: &str = "ERROR";
/// Estado sintético de un poll cancelado desde fuera.
pub const STATE_CANCELLED: &str = "CANCELLED";
