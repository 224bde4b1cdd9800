use actix_web::{web, HttpRequest, HttpResponse};

use crate::core::{catalog_facets, filter_catalog};
use crate::error::ApiError;
use crate::models::{CatalogFilter, MessageResponse};
use crate::state::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/internships", web::get().to(list_internships))
        .route("/internships/facets", web::get().to(get_facets))
        .route("/internships/{id}/apply", web::post().to(apply))
        .route("/recommendations", web::get().to(get_recommendations));
}

/// Catalog endpoint
///
/// GET /api/internships?q=&location=&domain=
async fn list_internships(
    state: web::Data<AppState>,
    query: web::Query<CatalogFilter>,
) -> Result<HttpResponse, ApiError> {
    let catalog = state
        .catalog
        .postings()
        .await
        .map_err(ApiError::internal("Failed to fetch internships"))?;

    Ok(HttpResponse::Ok().json(filter_catalog(&catalog, &query)))
}

/// GET /api/internships/facets
async fn get_facets(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let catalog = state
        .catalog
        .postings()
        .await
        .map_err(ApiError::internal("Failed to fetch internships"))?;

    Ok(HttpResponse::Ok().json(catalog_facets(&catalog)))
}

/// Recommendations endpoint
///
/// GET /api/recommendations
///
/// Every posting, ranked by overlap with the caller's skills.
async fn get_recommendations(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let caller = state.authenticate(&http_req).await?;

    let profile = state
        .store
        .get_profile(&caller.user_id)
        .await
        .map_err(ApiError::internal("Failed to fetch recommendations"))?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    let catalog = state
        .catalog
        .postings()
        .await
        .map_err(ApiError::internal("Failed to fetch recommendations"))?;

    let recommendations = state.matcher.rank(&profile.skills, &catalog);

    tracing::debug!(
        "Ranked {} postings for {} (top score {})",
        recommendations.len(),
        profile.id,
        recommendations.first().map(|r| r.match_score).unwrap_or(0)
    );

    Ok(HttpResponse::Ok().json(recommendations))
}

/// Apply endpoint
///
/// POST /api/internships/{id}/apply
///
/// Each call records a new application, repeats included.
async fn apply(
    state: web::Data<AppState>,
    path: web::Path<String>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let caller = state.authenticate(&http_req).await?;
    let internship_id = path.into_inner();

    state
        .store
        .get_posting(&internship_id)
        .await
        .map_err(ApiError::internal("Failed to apply"))?
        .ok_or_else(|| ApiError::not_found("Internship not found"))?;

    let record = state
        .store
        .create_application(&caller.user_id, &internship_id)
        .await
        .map_err(ApiError::internal("Failed to apply"))?;

    tracing::info!("Application {} recorded: {} -> {}", record.id, caller.user_id, internship_id);

    Ok(HttpResponse::Ok().json(MessageResponse::new("Application submitted successfully")))
}
