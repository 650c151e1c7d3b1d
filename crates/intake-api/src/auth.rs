//! Request identity and origin extractors
//!
//! Authentication happens upstream; the identity layer forwards the principal id in
//! a configured header. This module only reads it.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use intake_core::models::{Principal, RequestMeta};
use intake_core::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::ip_extraction::extract_client_ip;

/// Principal if the request carries one. A present but malformed header is rejected.
#[derive(Debug, Clone, Copy)]
pub struct MaybePrincipal(pub Option<Principal>);

/// Principal that must be present (401 otherwise).
#[derive(Debug, Clone, Copy)]
pub struct RequirePrincipal(pub Principal);

/// Audit metadata for the request.
#[derive(Debug, Clone)]
pub struct RequestOrigin(pub RequestMeta);

fn principal_from_parts(parts: &Parts, state: &AppState) -> Result<Option<Principal>, AppError> {
    let Some(value) = parts.headers.get(&state.request.principal_header) else {
        return Ok(None);
    };

    let id = value
        .to_str()
        .ok()
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .ok_or_else(|| AppError::Unauthorized("Malformed principal header".to_string()))?;

    Ok(Some(Principal(id)))
}

impl FromRequestParts<Arc<AppState>> for MaybePrincipal {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybePrincipal(principal_from_parts(parts, state)?))
    }
}

impl FromRequestParts<Arc<AppState>> for RequirePrincipal {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        principal_from_parts(parts, state)?
            .map(RequirePrincipal)
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized(
                    "Authentication is required".to_string(),
                ))
            })
    }
}

impl FromRequestParts<Arc<AppState>> for RequestOrigin {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let socket_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        let ip_address = extract_client_ip(
            &parts.headers,
            socket_addr.as_ref(),
            state.request.trusted_proxy_count,
        );
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok());

        Ok(RequestOrigin(RequestMeta::new(ip_address, user_agent)))
    }
}
