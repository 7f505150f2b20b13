#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Role/path-based access-control gate for axum request pipelines.
//!
//! The gate intercepts every inbound request before the rest of the router
//! runs, asks an [`AccessDecider`] whether the request is permitted, and
//! produces exactly one of three outcomes: pass-through to the inner
//! service, a redirect to a configured login location, or a rejection
//! status.
//!
//! Collaborators are injected explicitly:
//!
//! ```ignore
//! let gate = AccessGateLayer::new(identity_provider, decider, config);
//! let router = router.layer(gate);
//! ```

pub mod config;
pub mod decision;
pub mod errors;
pub mod gate;
pub mod rules;
pub mod traits;

pub use config::{AccessGateConfig, LoginRedirect};
pub use decision::{AccessDecision, DenialReason};
pub use errors::{DeciderError, GateError, RulesError};
pub use gate::{AccessGateLayer, AccessGateService, CurrentIdentity};
pub use rules::{RoleRules, RoleRulesBuilder, RoleRulesConfig};
pub use traits::{AccessDecider, IdentityProvider};
