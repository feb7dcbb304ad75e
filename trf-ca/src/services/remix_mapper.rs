// Genre → Remix Target Mapping
//
// Ordered substring rules: the first rule whose keyword is contained in the
// genre string (case-insensitive) wins. Unmatched genres, including "Unknown",
// get the default target.

use serde::Deserialize;

use crate::models::TagSuggestion;

/// One mapping rule
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemixRule {
    /// Substring searched for in the genre (case-insensitive)
    pub keyword: String,
    /// Remix category, e.g. "House"
    pub category: String,
    pub bpm_min: u16,
    pub bpm_max: u16,
}

impl RemixRule {
    pub fn new(keyword: &str, category: &str, bpm_min: u16, bpm_max: u16) -> Self {
        Self {
            keyword: keyword.to_string(),
            category: category.to_string(),
            bpm_min,
            bpm_max,
        }
    }

    fn target(&self) -> TagSuggestion {
        TagSuggestion::new(self.category.clone(), self.bpm_min, self.bpm_max)
    }
}

/// Heuristic genre → remix target mapper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemixMapper {
    rules: Vec<RemixRule>,
    fallback: TagSuggestion,
}

impl RemixMapper {
    pub fn new(rules: Vec<RemixRule>, fallback: TagSuggestion) -> Self {
        Self { rules, fallback }
    }

    /// Built-in rule table
    pub fn default_rules() -> Vec<RemixRule> {
        vec![
            RemixRule::new("Pop", "House", 120, 128),
            RemixRule::new("Hip-Hop", "Techno", 125, 135),
            RemixRule::new("Rap", "Trap / Drill", 130, 150),
            RemixRule::new("Rock", "Drum & Bass", 160, 180),
            RemixRule::new("Country", "House", 120, 128),
            RemixRule::new("Electronic", "Trance", 130, 140),
            RemixRule::new("R&B", "House", 120, 128),
            RemixRule::new("Latin", "Techno", 125, 135),
            RemixRule::new("Dance", "House", 120, 128),
        ]
    }

    pub fn default_fallback() -> TagSuggestion {
        TagSuggestion::new("House", 120, 128)
    }

    pub fn rules(&self) -> &[RemixRule] {
        &self.rules
    }

    pub fn fallback(&self) -> &TagSuggestion {
        &self.fallback
    }

    /// Map a genre string to a remix target
    pub fn suggest(&self, genre: &str) -> TagSuggestion {
        let genre_lower = genre.to_lowercase();

        self.rules
            .iter()
            .filter(|rule| !rule.keyword.trim().is_empty())
            .find(|rule| genre_lower.contains(&rule.keyword.to_lowercase()))
            .map(RemixRule::target)
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// Distinct target labels in rule order, fallback included
    pub fn categories(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        let targets = self
            .rules
            .iter()
            .map(RemixRule::target)
            .chain(std::iter::once(self.fallback.clone()));

        for target in targets {
            let label = target.label();
            if !labels.contains(&label) {
                labels.push(label);
            }
        }

        labels
    }
}

impl Default for RemixMapper {
    fn default() -> Self {
        Self::new(Self::default_rules(), Self::default_fallback())
    }
}
