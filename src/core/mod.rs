// Core algorithm exports
pub mod catalog;
pub mod filters;
pub mod matcher;
pub mod skills;

pub use catalog::{default_catalog, load_catalog};
pub use filters::{catalog_facets, filter_catalog, matches_filter};
pub use matcher::{score_posting, Matcher};
pub use skills::{normalize_skills, skill_key, SkillSet};
