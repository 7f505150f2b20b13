//! Collaborator traits consumed by the gate.
//!
//! Both collaborators are shared, externally synchronized singletons the
//! gate only reads from; implementations must be cheap to query per request.

use async_trait::async_trait;
use gate_security::IdentityContext;
use http::{Method, request::Parts};

use crate::decision::AccessDecision;
use crate::errors::DeciderError;

/// Resolves the caller's identity context for the current request.
///
/// Infallible by design: the absence of an established identity is the
/// anonymous context, not an error.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the identity context from the request head.
    async fn resolve(&self, parts: &Parts) -> IdentityContext;
}

/// Maps a request to an allow/deny decision.
///
/// Configured out-of-band (e.g. with a path-pattern to required-roles
/// table, see [`crate::rules::RoleRules`]) and immutable for the gate's
/// lifetime.
#[async_trait]
pub trait AccessDecider: Send + Sync {
    /// Decide whether the request is permitted for the given identity.
    ///
    /// # Errors
    ///
    /// - `ServiceUnavailable` if the decider's backing service is down
    /// - `Internal` for unexpected failures
    ///
    /// Both map to a generic server error at the gate; a denial must be
    /// returned as `Ok(AccessDecision::Denied(..))`.
    async fn is_allowed(
        &self,
        method: &Method,
        path: &str,
        identity: &IdentityContext,
    ) -> Result<AccessDecision, DeciderError>;
}
