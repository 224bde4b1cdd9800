use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::error::ApiError;
use crate::models::{MessageResponse, WishlistRequest};
use crate::state::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/wishlist", web::post().to(add_to_wishlist))
        .route("/wishlist", web::get().to(get_wishlist))
        .route("/wishlist/ids", web::get().to(get_wishlist_ids))
        .route("/wishlist/{internship_id}", web::delete().to(remove_from_wishlist));
}

/// Add to wishlist
///
/// POST /api/wishlist
///
/// Request body:
/// ```json
/// { "internship_id": "string" }
/// ```
///
/// Adding the same posting twice is a no-op.
async fn add_to_wishlist(
    state: web::Data<AppState>,
    req: web::Json<WishlistRequest>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let caller = state.authenticate(&http_req).await?;

    if let Err(errors) = req.validate() {
        return Err(ApiError::validation(errors.to_string()));
    }

    state
        .store
        .get_posting(&req.internship_id)
        .await
        .map_err(ApiError::internal("Failed to add to wishlist"))?
        .ok_or_else(|| ApiError::not_found("Internship not found"))?;

    let created = state
        .store
        .add_to_wishlist(&caller.user_id, &req.internship_id)
        .await
        .map_err(ApiError::internal("Failed to add to wishlist"))?;

    if !created {
        tracing::debug!("{} already wishlisted {}", caller.user_id, req.internship_id);
    }

    Ok(HttpResponse::Ok().json(MessageResponse::new("Added to wishlist")))
}

/// DELETE /api/wishlist/{internship_id}
async fn remove_from_wishlist(
    state: web::Data<AppState>,
    path: web::Path<String>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let caller = state.authenticate(&http_req).await?;
    let internship_id = path.into_inner();

    state
        .store
        .remove_from_wishlist(&caller.user_id, &internship_id)
        .await
        .map_err(ApiError::internal("Failed to remove from wishlist"))?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Removed from wishlist")))
}

/// GET /api/wishlist
async fn get_wishlist(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let caller = state.authenticate(&http_req).await?;

    let postings = state
        .store
        .wishlist_postings(&caller.user_id)
        .await
        .map_err(ApiError::internal("Failed to fetch wishlist"))?;

    Ok(HttpResponse::Ok().json(postings))
}

/// GET /api/wishlist/ids
async fn get_wishlist_ids(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let caller = state.authenticate(&http_req).await?;

    let ids = state
        .store
        .wishlist_ids(&caller.user_id)
        .await
        .map_err(ApiError::internal("Failed to fetch wishlist ids"))?;

    Ok(HttpResponse::Ok().json(ids))
}
