//! Capability Configuration Builder.
//!
//! Produce las claves de seguridad (protocolo, mecanismo SASL, credenciales)
//! de un endpoint Kafka, para la conexión base y para los roles producer y
//! consumer. Las claves van prefijadas por `<alias>.cluster.` para que dos
//! endpoints ("source" y "target") nunca colisionen al fusionarse.

mod builder;
mod spec;

pub use builder::{build_auth_config, AuthConfig};
pub use spec::{AuthMechanism, AuthSpec};
