use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::OperatorIdentity;
use crate::domain::Role;
use crate::entities::user_profile;
use crate::errors::ServiceError;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProfileRequest {
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub role: Option<Role>,
}

#[utoipa::path(
    get,
    path = "/api/v1/profiles",
    responses(
        (status = 200, description = "All profiles", body = [user_profile::Model]),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "profiles"
)]
pub async fn list_profiles(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let profiles = state.services.profiles.list().await?;
    Ok(Json(profiles))
}

/// The caller's own resolved profile. Available to any known operator.
#[utoipa::path(
    get,
    path = "/api/v1/profiles/me",
    responses(
        (status = 200, description = "Caller profile", body = user_profile::Model),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "profiles"
)]
pub async fn get_me(
    State(state): State<AppState>,
    identity: OperatorIdentity,
) -> Result<impl IntoResponse, ServiceError> {
    let profile = state
        .services
        .profiles
        .get_by_email(&identity.email)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("profile {} not found", identity.email)))?;
    Ok(Json(profile))
}

#[utoipa::path(
    post,
    path = "/api/v1/profiles",
    request_body = CreateProfileRequest,
    responses(
        (status = 201, description = "Profile created", body = user_profile::Model),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse)
    ),
    tag = "profiles"
)]
pub async fn create_profile(
    State(state): State<AppState>,
    Json(payload): Json<CreateProfileRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let profile = state
        .services
        .profiles
        .create(&payload.email, &payload.full_name, payload.role)
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[utoipa::path(
    put,
    path = "/api/v1/profiles/{id}",
    params(("id" = Uuid, Path, description = "Profile id")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = user_profile::Model),
        (status = 404, description = "Profile not found", body = crate::errors::ErrorResponse)
    ),
    tag = "profiles"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let profile = state
        .services
        .profiles
        .update(id, payload.full_name, payload.role)
        .await?;
    Ok(Json(profile))
}
