use std::collections::BTreeMap;

use super::spec::present;
use super::{AuthMechanism, AuthSpec};
use crate::errors::CoreEngineError;

/// Mapeo clave → valor listo para fusionarse en la configuración de un conector.
pub type AuthConfig = BTreeMap<String, String>;

const SASL_SSL: &str = "SASL_SSL";
const PLAINTEXT: &str = "PLAINTEXT";
const IAM_MECHANISM: &str = "AWS_MSK_IAM";
const SCRAM_MECHANISM: &str = "SCRAM-SHA-512";
const IAM_CALLBACK_HANDLER: &str = "software.amazon.msk.auth.iam.IAMClientCallbackHandler";

/// Prefijos de los tres roles: conexión base, producer y consumer.
const ROLES: [&str; 3] = ["", "producer.", "consumer."];

/// Construye la configuración de autenticación para un endpoint.
///
/// Función pura: mismas entradas, mismo mapeo. Falla con `Validation` si el
/// alias está vacío y con `InvalidAuthSpec` si falta un campo que el
/// mecanismo exige.
pub fn build_auth_config(alias: &str, spec: &AuthSpec) -> Result<AuthConfig, CoreEngineError> {
    let alias = alias.trim();
    if alias.is_empty() {
        return Err(CoreEngineError::Validation("cluster alias must not be empty".into()));
    }
    spec.validate_for(alias)?;

    let mut config = AuthConfig::new();
    let mut put = |suffix: &str, value: &str| {
        for role in ROLES {
            config.insert(format!("{alias}.cluster.{role}{suffix}"), value.to_string());
        }
    };

    match spec.mechanism {
        AuthMechanism::Iam => {
            let role_arn = present(&spec.role_arn).unwrap_or_default();
            let jaas = format!(r#"software.amazon.msk.auth.iam.IAMLoginModule required awsRoleArn="{role_arn}" awsDebugCreds=true;"#);
            put("security.protocol", SASL_SSL);
            put("sasl.mechanism", IAM_MECHANISM);
            put("sasl.jaas.config", &jaas);
            put("sasl.client.callback.handler.class", IAM_CALLBACK_HANDLER);
        }
        AuthMechanism::Plaintext => {
            put("security.protocol", PLAINTEXT);
        }
        AuthMechanism::Scram => {
            let username = present(&spec.username).unwrap_or_default();
            let password = present(&spec.password).unwrap_or_default();
            let jaas = format!(r#"org.apache.kafka.common.security.scram.ScramLoginModule required username="{username}" password="{password}";"#);
            put("security.protocol", SASL_SSL);
            put("sasl.mechanism", SCRAM_MECHANISM);
            put("sasl.jaas.config", &jaas);
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scram_without_credentials_is_invalid() {
        let spec = AuthSpec { mechanism: AuthMechanism::Scram,
                              role_arn: None,
                              username: None,
                              password: None };
        let err = build_auth_config("source", &spec).unwrap_err();
        assert_eq!(err,
                   CoreEngineError::InvalidAuthSpec("username and password are required for SCRAM authentication on source cluster".into()));
    }

    #[test]
    fn scram_keys_are_namespaced_by_alias() {
        let cfg = build_auth_config("source", &AuthSpec::scram("u", "p").unwrap()).unwrap();
        assert_eq!(cfg.len(), 9);
        assert!(cfg.keys().all(|k| k.starts_with("source.cluster.")));
        assert_eq!(cfg["source.cluster.consumer.sasl.mechanism"], "SCRAM-SHA-512");
        assert_eq!(cfg["source.cluster.sasl.jaas.config"],
                   r#"org.apache.kafka.common.security.scram.ScramLoginModule required username="u" password="p";"#);
    }

    #[test]
    fn iam_emits_callback_handler_for_every_role() {
        let arn = "arn:aws:iam::123456789012:role/mm2";
        let cfg = build_auth_config("target", &AuthSpec::iam(arn).unwrap()).unwrap();
        assert_eq!(cfg.len(), 12);
        for role in ROLES {
            assert_eq!(cfg[&format!("target.cluster.{role}security.protocol")], "SASL_SSL");
            assert_eq!(cfg[&format!("target.cluster.{role}sasl.client.callback.handler.class")], IAM_CALLBACK_HANDLER);
            assert!(cfg[&format!("target.cluster.{role}sasl.jaas.config")].contains(arn));
        }
    }

    #[test]
    fn plaintext_only_sets_protocol() {
        let cfg = build_auth_config("target", &AuthSpec::plaintext()).unwrap();
        assert_eq!(cfg.len(), 3);
        assert!(cfg.values().all(|v| v == "PLAINTEXT"));
    }

    #[test]
    fn source_and_target_never_collide() {
        let mut merged = build_auth_config("source", &AuthSpec::plaintext()).unwrap();
        let target = build_auth_config("target", &AuthSpec::iam("arn:role").unwrap()).unwrap();
        let expected = merged.len() + target.len();
        merged.extend(target);
        assert_eq!(merged.len(), expected);
    }

    #[test]
    fn same_inputs_same_mapping() {
        let spec = AuthSpec::iam("arn:role").unwrap();
        assert_eq!(build_auth_config("source", &spec).unwrap(), build_auth_config("source", &spec).unwrap());
    }

    #[test]
    fn empty_alias_is_a_validation_error() {
        assert!(matches!(build_auth_config(" ", &AuthSpec::plaintext()), Err(CoreEngineError::Validation(_))));
    }
}
