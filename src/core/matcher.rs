use std::collections::HashSet;

use crate::core::skills::{skill_key, SkillSet};
use crate::models::{InternshipPosting, RecommendationResult};

/// Skill-overlap ranker
///
/// Every posting is scored by how many of its required skills appear in the
/// user's skill set, compared case-insensitively. Results come back in
/// descending score order; equal scores keep catalog order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher;

impl Matcher {
    pub fn new() -> Self {
        Self
    }

    /// Rank a catalog for one user
    ///
    /// # Arguments
    /// * `user_skills` - The user's skills, any casing
    /// * `postings` - The catalog in insertion order
    ///
    /// # Returns
    /// One result per posting, highest score first
    pub fn rank<S: AsRef<str>>(
        &self,
        user_skills: &[S],
        postings: &[InternshipPosting],
    ) -> Vec<RecommendationResult> {
        let user_set = SkillSet::new(user_skills);

        let mut results: Vec<RecommendationResult> = postings
            .iter()
            .map(|posting| score_posting(&user_set, posting))
            .collect();

        // sort_by is stable, so ties stay in catalog order
        results.sort_by(|a, b| b.match_score.cmp(&a.match_score));

        results
    }
}

/// Matching skills and score for a single posting
pub fn score_posting(user_set: &SkillSet, posting: &InternshipPosting) -> RecommendationResult {
    let mut counted = HashSet::new();
    let matching_skills: Vec<String> = posting
        .required_skills
        .iter()
        .filter(|skill| user_set.contains(skill) && counted.insert(skill_key(skill)))
        .cloned()
        .collect();

    RecommendationResult {
        posting: posting.clone(),
        match_score: matching_skills.len() as u32,
        matching_skills,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_posting(id: &str, skills: &[&str]) -> InternshipPosting {
        InternshipPosting {
            id: id.to_string(),
            title: format!("Posting {}", id),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            domain: "Web Dev".to_string(),
            description: String::new(),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_rank_partial_overlap() {
        let matcher = Matcher::new();
        let postings = vec![create_posting("1", &["React", "JavaScript", "CSS", "TypeScript"])];

        let results = matcher.rank(&["React", "CSS"], &postings);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].matching_skills, vec!["React", "CSS"]);
        assert_eq!(results[0].match_score, 2);
    }

    #[test]
    fn test_rank_is_case_insensitive() {
        let matcher = Matcher::new();
        let postings = vec![create_posting("1", &["Node.js", "PostgreSQL"])];

        let results = matcher.rank(&["node.JS", "postgresql"], &postings);

        assert_eq!(results[0].match_score, 2);
        // Posting spelling is kept
        assert_eq!(results[0].matching_skills, vec!["Node.js", "PostgreSQL"]);
    }

    #[test]
    fn test_rank_sorted_by_score() {
        let matcher = Matcher::new();
        let postings = vec![
            create_posting("low", &["Python", "Docker"]),
            create_posting("high", &["React", "CSS", "JavaScript"]),
        ];

        let results = matcher.rank(&["React", "CSS", "JavaScript", "Python"], &postings);

        assert_eq!(results[0].posting.id, "high");
        assert_eq!(results[0].match_score, 3);
        assert_eq!(results[1].posting.id, "low");
        assert_eq!(results[1].match_score, 1);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let matcher = Matcher::new();
        let postings = vec![
            create_posting("a", &["Go"]),
            create_posting("b", &["Rust", "Go"]),
            create_posting("c", &["Go", "SQL"]),
            create_posting("d", &["Rust"]),
        ];

        let results = matcher.rank(&["go", "rust"], &postings);
        let ids: Vec<&str> = results.iter().map(|r| r.posting.id.as_str()).collect();

        assert_eq!(ids, vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_empty_user_skills() {
        let matcher = Matcher::new();
        let postings = vec![create_posting("1", &["React"]), create_posting("2", &["Go"])];

        let results = matcher.rank::<String>(&[], &postings);

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.match_score == 0 && r.matching_skills.is_empty()));
        assert_eq!(results[0].posting.id, "1");
        assert_eq!(results[1].posting.id, "2");
    }

    #[test]
    fn test_empty_catalog() {
        let matcher = Matcher::new();
        let results = matcher.rank(&["React"], &[]);
        assert!(results.is_empty());
    }

    #[test]
    fn test_repeated_required_skill_counts_once() {
        let matcher = Matcher::new();
        let postings = vec![create_posting("1", &["React", "react", "CSS"])];

        let results = matcher.rank(&["REACT"], &postings);

        assert_eq!(results[0].match_score, 1);
        assert_eq!(results[0].matching_skills, vec!["React"]);
    }
}
