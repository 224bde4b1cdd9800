use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::core::normalize_skills;
use crate::error::ApiError;
use crate::models::{LoginRequest, NewUser, RegisterRequest, RegisterResponse, RegisteredUserView};
use crate::state::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/register", web::post().to(register))
        .route("/auth/login", web::post().to(login));
}

/// Register endpoint
///
/// POST /api/auth/register
///
/// Request body:
/// ```json
/// {
///   "name": "string",
///   "email": "string",
///   "password": "string",
///   "skills": ["string"]
/// }
/// ```
async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for register request: {}", errors);
        return Err(ApiError::validation(errors.to_string()));
    }

    let req = req.into_inner();
    let email = req.email.trim().to_string();
    let skills = normalize_skills(req.skills.unwrap_or_default());

    let existing = state
        .store
        .find_credentials(&email)
        .await
        .map_err(ApiError::internal("Failed to register"))?;
    if existing.is_some() {
        return Err(ApiError::validation(format!("Email already registered: {}", email)));
    }

    let registered = state
        .identity
        .register(&req.name, &email, &req.password)
        .await?;
    let user_id = registered.user_id.clone();

    let created = state
        .store
        .create_user(NewUser {
            id: registered.user_id,
            name: req.name,
            email,
            skills,
            password_hash: registered.password_hash,
        })
        .await;

    let profile = match created {
        Ok(profile) => profile,
        Err(e) => {
            // Don't leave an account behind that has no profile
            if let Err(cleanup) = state.identity.delete_user(&user_id).await {
                tracing::error!(
                    "Failed to remove account {} after store error: {}",
                    user_id,
                    cleanup
                );
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        "User registered: {} via {} ({} skills)",
        profile.id,
        state.identity.provider(),
        profile.skills.len()
    );

    Ok(HttpResponse::Ok().json(RegisterResponse {
        message: "Registration successful".to_string(),
        user: RegisteredUserView {
            id: profile.id,
            name: profile.name,
            email: profile.email,
        },
    }))
}

/// Login endpoint
///
/// POST /api/auth/login
///
/// Returns `{accessToken, userName}`; wrong credentials give 401.
async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = req.validate() {
        return Err(ApiError::validation(errors.to_string()));
    }

    let session = state.identity.login(req.email.trim(), &req.password).await?;

    tracing::debug!("Issued session for {}", session.user_name);

    Ok(HttpResponse::Ok().json(session))
}
