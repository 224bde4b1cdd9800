use std::collections::HashSet;

/// Case-insensitive set of skills
#[derive(Debug, Clone, Default)]
pub struct SkillSet {
    keys: HashSet<String>,
}

impl SkillSet {
    pub fn new<I, S>(skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keys: skills.into_iter().map(|s| skill_key(s.as_ref())).collect(),
        }
    }

    #[inline]
    pub fn contains(&self, skill: &str) -> bool {
        self.keys.contains(&skill_key(skill))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Comparison key for a skill
#[inline]
pub fn skill_key(skill: &str) -> String {
    skill.to_lowercase()
}

/// Clean up a user-entered skills list
///
/// Trims each entry, drops blanks and drops case-insensitive repeats
/// (the first spelling wins). Order is preserved.
pub fn normalize_skills<I, S>(skills: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    skills
        .into_iter()
        .filter_map(|skill| {
            let trimmed = skill.as_ref().trim();
            if trimmed.is_empty() || !seen.insert(skill_key(trimmed)) {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}
