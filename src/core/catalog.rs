use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

use crate::models::InternshipPosting;

/// Built-in catalog seeded when no seed file is configured
const DEFAULT_CATALOG_JSON: &str = include_str!("../../data/internships.json");

/// Errors that can occur when loading a catalog seed
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate posting id in catalog: {0}")]
    DuplicateId(String),
}

/// The built-in sample catalog
pub fn default_catalog() -> Result<Vec<InternshipPosting>, CatalogError> {
    parse_catalog(DEFAULT_CATALOG_JSON)
}

/// Load a catalog from a JSON file containing an array of postings
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<InternshipPosting>, CatalogError> {
    let json = std::fs::read_to_string(path)?;
    parse_catalog(&json)
}

fn parse_catalog(json: &str) -> Result<Vec<InternshipPosting>, CatalogError> {
    let postings: Vec<InternshipPosting> = serde_json::from_str(json)?;

    let mut ids = HashSet::new();
    for posting in &postings {
        if !ids.insert(posting.id.as_str()) {
            return Err(CatalogError::DuplicateId(posting.id.clone()));
        }
    }

    Ok(postings)
}
