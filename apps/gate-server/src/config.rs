use access_gate::{AccessGateConfig, RoleRulesConfig};
use serde::{Deserialize, Serialize};

fn default_bind_addr() -> String {
    "127.0.0.1:8087".to_owned()
}

/// Demo server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind_addr: String,

    /// Access gate configuration (login redirect).
    pub gate: AccessGateConfig,

    /// Role rules forwarded to the decider.
    pub authorization: RoleRulesConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            gate: AccessGateConfig::default(),
            authorization: RoleRulesConfig::default(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config: ServerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8087");
        assert!(config.gate.login_redirect.is_none());
        assert_eq!(config.authorization.protected_resources, "");
        assert!(!config.authorization.deny_by_default);
    }

    #[test]
    fn config_rejects_unknown_fields() {
        let result: Result<ServerConfig, _> = serde_json::from_str(r#"{"bindAddr":"x"}"#);
        assert!(result.is_err());
    }
}
