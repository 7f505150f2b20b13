use serde::{Deserialize, Serialize};

fn default_login_fragment() -> String {
    "#login".to_owned()
}

/// Login location for unauthenticated callers, constructed as
/// `<base_path><fragment>`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRedirect {
    /// Application base path prepended to the fragment, e.g. `/app`.
    #[serde(default)]
    pub base_path: String,

    /// Fragment appended to the base path.
    #[serde(default = "default_login_fragment")]
    pub fragment: String,
}

impl Default for LoginRedirect {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            fragment: default_login_fragment(),
        }
    }
}

impl LoginRedirect {
    /// The full redirect location.
    #[must_use]
    pub fn location(&self) -> String {
        format!("{}{}", self.base_path, self.fragment)
    }
}

/// Access gate configuration.
///
/// Supplied once at startup and immutable for the gate's lifetime. The gate
/// accepts this configuration but does not interpret role rules itself;
/// those belong to the decider (see [`crate::rules::RoleRulesConfig`]).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AccessGateConfig {
    /// Where to send unauthenticated callers on denial.
    /// When absent (API deployments) the gate responds `401 Unauthorized`
    /// instead of redirecting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_redirect: Option<LoginRedirect>,
}
