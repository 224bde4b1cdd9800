//! Intern Match - internship matching service
//!
//! Students register, list their skills, browse a fixed catalog of
//! internship postings and receive recommendations ranked by how many
//! of a posting's required skills they already have. Wishlist and
//! application tracking sit alongside.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod startup;
pub mod state;

// Re-export commonly used types
pub use crate::core::{default_catalog, Matcher};
pub use models::{InternshipPosting, RecommendationResult, UserProfile};
pub use state::AppState;
