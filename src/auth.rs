//! Operator identity and role capability checks.
//!
//! There is no authentication here by design: a trusted upstream proxy
//! authenticates the operator and forwards their email in a header. This
//! module resolves that claim against the profile table and gates route
//! groups on the stored role.

use axum::{
    extract::{Request, State},
    http::request::Parts,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use std::str::FromStr;

use crate::domain::Role;
use crate::errors::ServiceError;
use crate::AppState;

/// The resolved operator for a request. Inserted into request extensions by
/// [`identity_middleware`] when the identity header matches a profile.
#[derive(Debug, Clone)]
pub struct OperatorIdentity {
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

impl<S> axum::extract::FromRequestParts<S> for OperatorIdentity
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<OperatorIdentity>()
            .cloned()
            .ok_or_else(|| ServiceError::Unauthorized("operator identity required".into()))
    }
}

/// Resolves the identity header against the profile table and attaches the
/// operator to the request. Requests without a known identity pass through
/// unauthenticated; gated routes reject them later.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let header = state.config.identity_header.clone();
    let email = req
        .headers()
        .get(header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty());

    if let Some(email) = email {
        match state.services.profiles.get_by_email(&email).await {
            Ok(Some(profile)) => {
                let role = Role::from_str(&profile.role).unwrap_or(Role::Viewer);
                req.extensions_mut().insert(OperatorIdentity {
                    email: profile.email,
                    full_name: profile.full_name,
                    role,
                });
            }
            Ok(None) => {}
            Err(e) => return e.into_response(),
        }
    }

    next.run(req).await
}

fn check_role(req: &Request, required: Role) -> Result<(), ServiceError> {
    let identity = req
        .extensions()
        .get::<OperatorIdentity>()
        .ok_or_else(|| ServiceError::Unauthorized("operator identity required".into()))?;
    // Admins may do anything; everyone else needs the exact capability.
    if identity.role == Role::Admin || identity.role == required {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "role {} required",
            required
        )))
    }
}

/// Router extension applying a role capability check to a route group.
pub trait RoleRouterExt {
    fn with_role(self, role: Role) -> Self;
    /// Requires any resolved identity, regardless of role.
    fn with_identity(self) -> Self;
}

impl RoleRouterExt for Router<AppState> {
    fn with_role(self, role: Role) -> Self {
        self.layer(middleware::from_fn(move |req: Request, next: Next| async move {
            match check_role(&req, role) {
                Ok(()) => next.run(req).await,
                Err(e) => e.into_response(),
            }
        }))
    }

    fn with_identity(self) -> Self {
        self.layer(middleware::from_fn(|req: Request, next: Next| async move {
            if req.extensions().get::<OperatorIdentity>().is_none() {
                return ServiceError::Unauthorized("operator identity required".into())
                    .into_response();
            }
            next.run(req).await
        }))
    }
}
