use actix_web::{web, HttpRequest, HttpResponse};

use crate::core::normalize_skills;
use crate::error::ApiError;
use crate::models::UpdateProfileRequest;
use crate::state::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/user/profile", web::get().to(get_profile))
        .route("/user/profile", web::put().to(update_profile))
        .route("/user/applications", web::get().to(list_applications));
}

/// GET /api/user/profile
async fn get_profile(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let caller = state.authenticate(&http_req).await?;

    let profile = state
        .store
        .get_profile(&caller.user_id)
        .await
        .map_err(ApiError::internal("Failed to fetch profile"))?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    Ok(HttpResponse::Ok().json(profile))
}

/// PUT /api/user/profile
///
/// Replaces the skills list. Entries are trimmed and case-insensitive
/// repeats dropped before storing.
async fn update_profile(
    state: web::Data<AppState>,
    req: web::Json<UpdateProfileRequest>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let caller = state.authenticate(&http_req).await?;
    let skills = normalize_skills(req.into_inner().skills);

    let profile = state
        .store
        .update_skills(&caller.user_id, &skills)
        .await
        .map_err(ApiError::internal("Failed to update profile"))?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    tracing::info!("Profile updated for {} ({} skills)", profile.id, profile.skills.len());

    Ok(HttpResponse::Ok().json(profile))
}

/// GET /api/user/applications
async fn list_applications(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let caller = state.authenticate(&http_req).await?;

    let applications = state
        .store
        .list_applications(&caller.user_id)
        .await
        .map_err(ApiError::internal("Failed to fetch applications"))?;

    Ok(HttpResponse::Ok().json(applications))
}
