//! Header-based identity provider for the demo server.
//!
//! Trusts `x-demo-subject` and `x-demo-roles` headers verbatim. Demo only:
//! a real deployment resolves identity from a session or validated token.

use async_trait::async_trait;
use gate_security::IdentityContext;
use http::request::Parts;
use uuid::Uuid;

pub const SUBJECT_HEADER: &str = "x-demo-subject";
pub const ROLES_HEADER: &str = "x-demo-roles";

pub struct HeaderIdentityProvider;

#[async_trait]
impl access_gate::IdentityProvider for HeaderIdentityProvider {
    async fn resolve(&self, parts: &Parts) -> IdentityContext {
        let subject_id = parts
            .headers
            .get(SUBJECT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s.trim()).ok());

        let Some(subject_id) = subject_id else {
            return IdentityContext::anonymous();
        };

        let roles: Vec<String> = parts
            .headers
            .get(ROLES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        IdentityContext::builder()
            .subject_id(subject_id)
            .subject_type("user")
            .roles(roles)
            .build()
    }
}
