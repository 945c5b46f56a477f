use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreEngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMechanism {
    Iam,
    Plaintext,
    Scram,
}

impl FromStr for AuthMechanism {
    type Err = CoreEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iam" => Ok(Self::Iam),
            "plaintext" => Ok(Self::Plaintext),
            "scram" => Ok(Self::Scram),
            other => Err(CoreEngineError::UnsupportedAuthType(other.to_string())),
        }
    }
}

impl fmt::Display for AuthMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
                        Self::Iam => "iam",
                        Self::Plaintext => "plaintext",
                        Self::Scram => "scram",
                    })
    }
}

/// Especificación de autenticación de un endpoint.
///
/// - `Iam` requiere `role_arn`.
/// - `Scram` requiere `username` y `password`.
/// - `Plaintext` no requiere nada.
///
/// Los constructores validan; los campos son públicos para permitir
/// deserialización, por eso `build_auth_config` vuelve a validar.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSpec {
    pub mechanism: AuthMechanism,
    #[serde(default)]
    pub role_arn: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl AuthSpec {
    pub fn new(mechanism: AuthMechanism,
               role_arn: Option<String>,
               username: Option<String>,
               password: Option<String>)
               -> Result<Self, CoreEngineError> {
        let spec = Self { mechanism,
                          role_arn,
                          username,
                          password };
        spec.validate()?;
        Ok(spec)
    }

    pub fn iam(role_arn: impl Into<String>) -> Result<Self, CoreEngineError> {
        Self::new(AuthMechanism::Iam, Some(role_arn.into()), None, None)
    }

    pub fn scram(username: impl Into<String>, password: impl Into<String>) -> Result<Self, CoreEngineError> {
        Self::new(AuthMechanism::Scram, None, Some(username.into()), Some(password.into()))
    }

    pub fn plaintext() -> Self {
        Self { mechanism: AuthMechanism::Plaintext,
               role_arn: None,
               username: None,
               password: None }
    }

    /// Parsea el mecanismo desde texto (`iam`, `plaintext`, `scram`) y valida.
    pub fn parse(mechanism: &str,
                 role_arn: Option<String>,
                 username: Option<String>,
                 password: Option<String>)
                 -> Result<Self, CoreEngineError> {
        Self::new(mechanism.parse()?, role_arn, username, password)
    }

    pub fn validate(&self) -> Result<(), CoreEngineError> {
        self.validate_for("")
    }

    pub(crate) fn validate_for(&self, alias: &str) -> Result<(), CoreEngineError> {
        let on = if alias.is_empty() { String::new() } else { format!(" on {alias} cluster") };
        match self.mechanism {
            AuthMechanism::Iam if present(&self.role_arn).is_none() => {
                Err(CoreEngineError::InvalidAuthSpec(format!("IAM role ARN is required for IAM authentication{on}")))
            }
            AuthMechanism::Scram if present(&self.username).is_none() || present(&self.password).is_none() => {
                Err(CoreEngineError::InvalidAuthSpec(format!("username and password are required for SCRAM authentication{on}")))
            }
            _ => Ok(()),
        }
    }
}

pub(crate) fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.trim().is_empty())
}

// La contraseña nunca aparece en logs.
impl fmt::Debug for AuthSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSpec")
         .field("mechanism", &self.mechanism)
         .field("role_arn", &self.role_arn)
         .field("username", &self.username)
         .field("password", &self.password.as_ref().map(|_| "***"))
         .finish()
    }
}
