use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration request
///
/// Fields default to empty so a missing field is reported by validation
/// rather than as a JSON payload error.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "name is required"))]
    #[serde(default)]
    pub name: String,
    #[validate(email(message = "a valid email is required"))]
    #[serde(default)]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    #[serde(default)]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    #[serde(default)]
    pub password: String,
}

/// Profile update request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub skills: Vec<String>,
}

/// Wishlist add request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WishlistRequest {
    #[validate(length(min = 1, message = "internship_id is required"))]
    #[serde(alias = "internshipId")]
    pub internship_id: String,
}

/// Catalog query parameters
///
/// `all` or an empty value disables a filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFilter {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}
