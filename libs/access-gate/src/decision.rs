//! Decision model for the access gate.
//!
//! Access denial is expressed via [`AccessDecision::Denied`], not as an
//! error variant. Decider errors represent infrastructure failures only and
//! must never be conflated with a denial.

use serde::{Deserialize, Serialize};

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// The caller has no established identity.
    Unauthenticated,
    /// The caller is authenticated but lacks a required role.
    MissingRole,
}

/// Outcome of an authorization query, created fresh per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    /// The request may proceed down the pipeline.
    Allowed,
    /// The request is denied. The reason is optional; deciders that cannot
    /// distinguish leave it `None` and the gate falls back to the identity's
    /// login state.
    Denied(Option<DenialReason>),
}

impl AccessDecision {
    /// Whether this decision permits the request.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }
}
