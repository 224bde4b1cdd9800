use serde::{Deserialize, Serialize};

/// Status recorded on a freshly created application
pub const DEFAULT_APPLICATION_STATUS: &str = "applied";

/// User profile with the skills list used for matching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Internship catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternshipPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub domain: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "requiredSkills", default)]
    pub required_skills: Vec<String>,
}

/// Ranked posting for a user. Serializes flat: the posting's fields plus
/// `matchScore` and `matchingSkills`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationResult {
    #[serde(flatten)]
    pub posting: InternshipPosting,
    #[serde(rename = "matchingSkills")]
    pub matching_skills: Vec<String>,
    #[serde(rename = "matchScore")]
    pub match_score: u32,
}

/// Saved posting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub user_id: String,
    pub internship_id: String,
}

/// One apply action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: String,
    pub user_id: String,
    pub internship_id: String,
    pub application_date: chrono::DateTime<chrono::Utc>,
    pub status: String,
}

impl ApplicationRecord {
    pub fn new(user_id: &str, internship_id: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            internship_id: internship_id.to_string(),
            application_date: chrono::Utc::now(),
            status: DEFAULT_APPLICATION_STATUS.to_string(),
        }
    }
}

/// Application joined with its posting, as listed to the applicant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSummary {
    pub title: String,
    pub company: String,
    pub application_date: chrono::DateTime<chrono::Utc>,
    pub status: String,
}

/// User row as written at registration
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub skills: Vec<String>,
    /// Absent when an external identity service owns the password
    pub password_hash: Option<String>,
}

impl NewUser {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            skills: self.skills.clone(),
        }
    }
}

/// Login lookup result
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
}

/// Caller identity established from a session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Distinct filter values present in the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFacets {
    pub locations: Vec<String>,
    pub domains: Vec<String>,
}
