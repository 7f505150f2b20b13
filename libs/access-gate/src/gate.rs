//! Tower middleware implementing the access gate.

use axum::{
    body::Body,
    extract::{FromRequestParts, Request},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use gate_security::IdentityContext;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};

use crate::config::AccessGateConfig;
use crate::decision::{AccessDecision, DenialReason};
use crate::errors::{DeciderError, GateError};
use crate::traits::{AccessDecider, IdentityProvider};

/// Extractor for `IdentityContext` - validates that the gate has run
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub IdentityContext);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IdentityContext>()
            .cloned()
            .map(CurrentIdentity)
            .ok_or(GateError::MissingIdentity)
    }
}

/// Shared state for the access gate middleware.
struct GateState {
    identity: Arc<dyn IdentityProvider>,
    decider: Arc<dyn AccessDecider>,
    config: AccessGateConfig,
}

/// Layer that applies the access gate to services.
///
/// Collaborators are injected explicitly at construction; the gate holds no
/// other state and is reentrant across concurrent requests.
///
/// # Example
/// ```ignore
/// router = router.layer(AccessGateLayer::new(identity, decider, config));
/// ```
#[derive(Clone)]
pub struct AccessGateLayer {
    state: Arc<GateState>,
}

impl AccessGateLayer {
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        decider: Arc<dyn AccessDecider>,
        config: AccessGateConfig,
    ) -> Self {
        Self {
            state: Arc::new(GateState {
                identity,
                decider,
                config,
            }),
        }
    }
}

impl<S> Layer<S> for AccessGateLayer {
    type Service = AccessGateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AccessGateService {
            inner,
            state: self.state.clone(),
        }
    }
}

/// Service that decides, per request, between pass-through, redirect, and
/// rejection.
#[derive(Clone)]
pub struct AccessGateService<S> {
    inner: S,
    state: Arc<GateState>,
}

impl<S> Service<Request<Body>> for AccessGateService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let state = self.state.clone();
        let not_ready_inner = self.inner.clone();
        let mut ready_inner = std::mem::replace(&mut self.inner, not_ready_inner);

        Box::pin(async move {
            // CORS preflights carry no credentials and grant nothing
            if is_preflight_request(request.method(), request.headers()) {
                return ready_inner.call(request).await;
            }

            let (parts, body) = request.into_parts();
            let identity = state.identity.resolve(&parts).await;
            let method = parts.method.clone();
            let path = parts.uri.path().to_owned();
            let decision = state.decider.is_allowed(&method, &path, &identity).await;

            match decision {
                Ok(AccessDecision::Allowed) => {
                    // The only path that executes downstream logic; the
                    // response and any error propagate verbatim.
                    let mut request = Request::from_parts(parts, body);
                    request.extensions_mut().insert(identity);
                    ready_inner.call(request).await
                }
                Ok(AccessDecision::Denied(reason)) => {
                    Ok(denial_response(&state.config, reason, &identity, &path))
                }
                Err(err) => Ok(decider_error_response(&err)),
            }
        })
    }
}

/// Convert a denial into a redirect or a rejection.
///
/// A denial tagged `Unauthenticated`, or any denial against an identity
/// that is not logged in, is answered with the configured login redirect
/// (or 401 when no redirect is configured). A logged-in caller lacking a
/// required role gets 403.
fn denial_response(
    config: &AccessGateConfig,
    reason: Option<DenialReason>,
    identity: &IdentityContext,
    path: &str,
) -> Response {
    let unauthenticated =
        matches!(reason, Some(DenialReason::Unauthenticated)) || !identity.is_logged_in();

    if unauthenticated {
        tracing::debug!(path, "denied unauthenticated request");
        match &config.login_redirect {
            Some(redirect) => redirect_response(&redirect.location()),
            None => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
        }
    } else {
        tracing::debug!(path, "denied request lacking a required role");
        (StatusCode::FORBIDDEN, "Forbidden").into_response()
    }
}

/// Build a `302 Found` response to the login location.
fn redirect_response(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(err) => {
            tracing::error!("invalid login redirect location '{location}': {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Convert a decider failure into a generic server error.
///
/// Never conflated with a denial; no internal detail leaks into the body.
fn decider_error_response(err: &DeciderError) -> Response {
    match err {
        DeciderError::ServiceUnavailable(msg) => {
            tracing::error!("access decider unavailable: {msg}");
        }
        DeciderError::Internal(msg) => {
            tracing::error!("access decider internal error: {msg}");
        }
    }
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

/// Check if this is a CORS preflight request
///
/// Preflight requests are OPTIONS requests with:
/// - Origin header present
/// - Access-Control-Request-Method header present
fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(header::ORIGIN)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::LoginRedirect;
    use uuid::Uuid;

    fn redirect_config(base_path: &str) -> AccessGateConfig {
        AccessGateConfig {
            login_redirect: Some(LoginRedirect {
                base_path: base_path.to_owned(),
                fragment: "#login".to_owned(),
            }),
        }
    }

    #[test]
    fn anonymous_denial_redirects_when_configured() {
        let response = denial_response(
            &redirect_config("/app"),
            Some(DenialReason::Unauthenticated),
            &IdentityContext::anonymous(),
            "/admin",
        );

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/app#login"
        );
    }

    #[test]
    fn anonymous_denial_without_redirect_is_401() {
        let response = denial_response(
            &AccessGateConfig::default(),
            None,
            &IdentityContext::anonymous(),
            "/admin",
        );

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn logged_in_denial_is_403() {
        let identity = IdentityContext::builder().subject_id(Uuid::new_v4()).build();
        let response = denial_response(
            &redirect_config("/app"),
            Some(DenialReason::MissingRole),
            &identity,
            "/admin",
        );

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn unauthenticated_reason_wins_over_login_state() {
        // A decider may tag a denial unauthenticated even for a logged-in
        // identity (e.g. step-up requirements); the gate redirects.
        let identity = IdentityContext::builder().subject_id(Uuid::new_v4()).build();
        let response = denial_response(
            &redirect_config("/app"),
            Some(DenialReason::Unauthenticated),
            &identity,
            "/admin",
        );

        assert_eq!(response.status(), StatusCode::FOUND);
    }

    #[test]
    fn decider_errors_map_to_500() {
        let response =
            decider_error_response(&DeciderError::Internal("boom".to_owned()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response =
            decider_error_response(&DeciderError::ServiceUnavailable("down".to_owned()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn preflight_detection_requires_all_markers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ORIGIN, HeaderValue::from_static("https://x.test"));
        assert!(!is_preflight_request(&Method::OPTIONS, &headers));

        headers.insert(
            header::ACCESS_CONTROL_REQUEST_METHOD,
            HeaderValue::from_static("GET"),
        );
        assert!(is_preflight_request(&Method::OPTIONS, &headers));
        assert!(!is_preflight_request(&Method::GET, &headers));
    }
}
