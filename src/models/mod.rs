// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    ApplicationRecord, ApplicationSummary, CatalogFacets, Credentials, Identity,
    InternshipPosting, NewUser, RecommendationResult, UserProfile, WishlistEntry,
    DEFAULT_APPLICATION_STATUS,
};
pub use requests::{
    CatalogFilter, LoginRequest, RegisterRequest, UpdateProfileRequest, WishlistRequest,
};
pub use responses::{
    ErrorResponse, HealthResponse, MessageResponse, RegisterResponse, RegisteredUserView, Session,
};
