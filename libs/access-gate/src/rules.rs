//! Role/path rule table: the shipped [`AccessDecider`] implementation.
//!
//! Rules map a path pattern to the set of roles that may access it. A
//! request matching no rule is allowed unless `deny_by_default` is set, in
//! which case unmatched paths still require an authenticated identity.

use async_trait::async_trait;
use gate_security::IdentityContext;
use http::Method;
use serde::{Deserialize, Serialize};

use crate::decision::{AccessDecision, DenialReason};
use crate::errors::{DeciderError, RulesError};
use crate::traits::AccessDecider;

/// Path-pattern to required-roles table.
///
/// Built once at startup and immutable thereafter. Patterns use matchit
/// syntax (`{param}`, `{*rest}`); the compact string form accepted by
/// [`RoleRules::parse`] additionally converts a trailing `/*` wildcard.
#[derive(Clone, Debug)]
pub struct RoleRules {
    matcher: matchit::Router<Vec<String>>,
    deny_by_default: bool,
}

impl RoleRules {
    /// Create a new `RoleRules` builder.
    #[must_use]
    pub fn builder() -> RoleRulesBuilder {
        RoleRulesBuilder::default()
    }

    /// Parse the compact rule form:
    /// `/admin/*:Administrator!Operator, /reports:Auditor`.
    ///
    /// Entries are comma separated; each maps a path pattern to one or more
    /// `!`-separated roles. A trailing `/*` is converted to a matchit
    /// catch-all that also covers the bare prefix, so `/admin/*` protects
    /// `/admin` itself as well as everything under it. An empty string
    /// yields an empty (allow-everything) table.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError`] for entries without a `pattern:roles` shape,
    /// empty patterns or role lists, and patterns the matcher rejects
    /// (malformed or conflicting).
    pub fn parse(input: &str) -> Result<Self, RulesError> {
        let mut builder = Self::builder();
        for entry in input.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let Some((pattern, roles)) = entry.split_once(':') else {
                return Err(RulesError::InvalidEntry {
                    entry: entry.to_owned(),
                    detail: "expected 'pattern:Role!Role' form".to_owned(),
                });
            };
            let pattern = pattern.trim();
            if pattern.is_empty() {
                return Err(RulesError::InvalidEntry {
                    entry: entry.to_owned(),
                    detail: "empty path pattern".to_owned(),
                });
            }
            let roles: Vec<&str> = roles
                .split('!')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .collect();
            if roles.is_empty() {
                return Err(RulesError::InvalidEntry {
                    entry: entry.to_owned(),
                    detail: "no roles listed".to_owned(),
                });
            }
            for expanded in expand_trailing_wildcard(pattern) {
                builder = builder.rule(&expanded, roles.iter().copied())?;
            }
        }
        Ok(builder.build())
    }

    /// Evaluate a path against the rule table for the given identity.
    ///
    /// A trailing slash is ignored during matching, so `/admin/` hits the
    /// same rule as `/admin`.
    #[must_use]
    pub fn decide(&self, path: &str, identity: &IdentityContext) -> AccessDecision {
        let lookup = match path.strip_suffix('/') {
            Some(prefix) if !prefix.is_empty() => prefix,
            _ => path,
        };
        let Some(required) = self.matcher.at(lookup).ok().map(|m| m.value) else {
            // Unmatched path: default allow, or AuthN-only when hardened
            if self.deny_by_default && !identity.is_logged_in() {
                return AccessDecision::Denied(Some(DenialReason::Unauthenticated));
            }
            return AccessDecision::Allowed;
        };

        if required.iter().any(|role| identity.has_role(role)) {
            AccessDecision::Allowed
        } else if identity.is_logged_in() {
            AccessDecision::Denied(Some(DenialReason::MissingRole))
        } else {
            AccessDecision::Denied(Some(DenialReason::Unauthenticated))
        }
    }
}

#[async_trait]
impl AccessDecider for RoleRules {
    async fn is_allowed(
        &self,
        _method: &Method,
        path: &str,
        identity: &IdentityContext,
    ) -> Result<AccessDecision, DeciderError> {
        Ok(self.decide(path, identity))
    }
}

/// Builder for [`RoleRules`].
#[derive(Default)]
pub struct RoleRulesBuilder {
    matcher: matchit::Router<Vec<String>>,
    deny_by_default: bool,
}

impl RoleRulesBuilder {
    /// Add a rule mapping a matchit path pattern to acceptable roles.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::InvalidPattern`] if the matcher rejects the
    /// pattern (malformed syntax or a conflict with an earlier rule).
    pub fn rule<I, S>(mut self, pattern: &str, roles: I) -> Result<Self, RulesError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles: Vec<String> = roles.into_iter().map(Into::into).collect();
        self.matcher
            .insert(pattern, roles)
            .map_err(|source| RulesError::InvalidPattern {
                pattern: pattern.to_owned(),
                source,
            })?;
        Ok(self)
    }

    /// Require an authenticated identity for paths matching no rule.
    #[must_use]
    pub fn deny_by_default(mut self, deny: bool) -> Self {
        self.deny_by_default = deny;
        self
    }

    /// Finish building the rule table.
    #[must_use]
    pub fn build(self) -> RoleRules {
        RoleRules {
            matcher: self.matcher,
            deny_by_default: self.deny_by_default,
        }
    }
}

/// Role rules configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoleRulesConfig {
    /// Protected resources in the compact `pattern:Role!Role, ...` form.
    #[serde(default)]
    pub protected_resources: String,

    /// Require an authenticated identity for paths matching no rule.
    #[serde(default)]
    pub deny_by_default: bool,
}

impl RoleRulesConfig {
    /// Compile the configuration into a [`RoleRules`] table.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError`] if `protected_resources` cannot be parsed.
    pub fn compile(&self) -> Result<RoleRules, RulesError> {
        let rules = RoleRules::parse(&self.protected_resources)?;
        Ok(RoleRules {
            matcher: rules.matcher,
            deny_by_default: self.deny_by_default,
        })
    }
}

/// Expand a trailing servlet-style `/*` wildcard into matchit patterns.
///
/// Matchit's `{*rest}` catch-all requires a non-empty remainder, so the
/// bare prefix is registered alongside it: `/admin/*` protects `/admin`
/// as well as the subtree below it.
fn expand_trailing_wildcard(pattern: &str) -> Vec<String> {
    match pattern.strip_suffix("/*") {
        Some("") => vec!["/{*rest}".to_owned(), "/".to_owned()],
        Some(prefix) => vec![format!("{prefix}/{{*rest}}"), prefix.to_owned()],
        None => vec![pattern.to_owned()],
    }
}
