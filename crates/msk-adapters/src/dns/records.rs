//! Nombres de zona y registros CNAME de brokers.

use crate::ports::RecordSpec;

/// Agrega el punto final si falta: `kafka.internal` → `kafka.internal.`.
pub fn normalize_zone_name(zone_name: &str) -> String {
    let trimmed = zone_name.trim();
    if trimmed.ends_with('.') {
        trimmed.to_string()
    } else {
        format!("{trimmed}.")
    }
}

/// Host de una dirección `host:puerto`; sin puerto se devuelve tal cual.
pub fn broker_host(address: &str) -> &str {
    let address = address.trim();
    match address.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => address,
    }
}

/// Un CNAME `broker<i>.<zona>` por broker, numerados desde 1.
pub fn broker_records(zone_name: &str, brokers: &[String], ttl: u32) -> Vec<RecordSpec> {
    let zone = normalize_zone_name(zone_name);
    brokers.iter()
           .enumerate()
           .map(|(i, addr)| RecordSpec { name: format!("broker{}.{zone}", i + 1),
                                         value: broker_host(addr).to_string(),
                                         ttl })
           .collect()
}

/// Nombre visible de un registro (sin el punto final).
pub fn display_name(record: &RecordSpec) -> String {
    record.name.trim_end_matches('.').to_string()
}
