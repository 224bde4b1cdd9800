use std::collections::HashSet;

use crate::models::{CatalogFacets, CatalogFilter, InternshipPosting};

/// Value that disables a location or domain filter
const ANY: &str = "all";

/// Check if a posting passes every active catalog filter
///
/// * `q` - case-insensitive substring of the title or company
/// * `location`, `domain` - exact match
#[inline]
pub fn matches_filter(posting: &InternshipPosting, filter: &CatalogFilter) -> bool {
    if let Some(q) = active(&filter.q) {
        let needle = q.to_lowercase();
        if !posting.title.to_lowercase().contains(&needle)
            && !posting.company.to_lowercase().contains(&needle)
        {
            return false;
        }
    }

    if let Some(location) = active(&filter.location) {
        if posting.location != location {
            return false;
        }
    }

    if let Some(domain) = active(&filter.domain) {
        if posting.domain != domain {
            return false;
        }
    }

    true
}

/// Apply a catalog filter, keeping catalog order
pub fn filter_catalog(
    postings: &[InternshipPosting],
    filter: &CatalogFilter,
) -> Vec<InternshipPosting> {
    postings
        .iter()
        .filter(|posting| matches_filter(posting, filter))
        .cloned()
        .collect()
}

/// Distinct locations and domains in first-seen order
pub fn catalog_facets(postings: &[InternshipPosting]) -> CatalogFacets {
    let mut seen_locations = HashSet::new();
    let mut seen_domains = HashSet::new();
    let mut facets = CatalogFacets::default();

    for posting in postings {
        if seen_locations.insert(posting.location.as_str()) {
            facets.locations.push(posting.location.clone());
        }
        if seen_domains.insert(posting.domain.as_str()) {
            facets.domains.push(posting.domain.clone());
        }
    }

    facets
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(ANY))
}
