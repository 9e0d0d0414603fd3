//! Staff account management (super admin only).

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use serde::Deserialize;
use tracing::instrument;

use bloom_bouquet_core::{AdminId, AdminRole};

use crate::db::AdminRepository;
use crate::error::{AppError, FieldErrors, Result};
use crate::middleware::RequireSuperAdmin;
use crate::models::Admin;
use crate::services::AuthService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin-users", get(index).post(create))
        .route("/api/admin-users/{id}", delete(destroy))
}

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: AdminRole,
}

const fn default_role() -> AdminRole {
    AdminRole::Admin
}

pub async fn index(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Admin>>> {
    Ok(Json(AdminRepository::new(state.pool()).list_all().await?))
}

#[instrument(skip(state, body), fields(email = %body.email, role = %body.role))]
pub async fn create(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<Admin>)> {
    let mut errors = FieldErrors::new();
    if body.name.trim().is_empty() {
        errors.add("name", "The name field is required.");
    }
    errors.into_result()?;

    let created = AuthService::new(state.pool())
        .create_admin(&body.email, &body.name, body.role, &body.password)
        .await?;

    tracing::info!(created_by = %admin.id, admin_id = %created.id, "Created admin");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Remove a staff account. Admins cannot delete themselves and the last
/// super admin cannot be removed.
#[instrument(skip(state))]
pub async fn destroy(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<AdminId>,
) -> Result<StatusCode> {
    if id == admin.id {
        return Err(AppError::Conflict(
            "You cannot delete your own account".to_string(),
        ));
    }

    let repo = AdminRepository::new(state.pool());
    let target = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;

    if target.is_super_admin() && repo.count_super_admins().await? <= 1 {
        return Err(AppError::Conflict(
            "Cannot delete the last super admin".to_string(),
        ));
    }

    repo.delete(id).await?;
    tracing::info!(deleted_by = %admin.id, admin_id = %id, "Deleted admin");
    Ok(StatusCode::NO_CONTENT)
}
