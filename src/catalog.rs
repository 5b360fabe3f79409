//! The fixed universe of conjugation items and the named sets over it.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ConjugationFamily, ConjugationItem, GrammaticalClass, Tense};

/// Bundled conjugation table: 15 verbs, 5 persons, present and preterite.
const BUNDLED_CONJUGATIONS: &str = include_str!("../bundled/conjugations.json");

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog data is not valid JSON")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate item id in catalog: {0}")]
    DuplicateId(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

/// A predefined grouping of items, addressed by a stable id.
#[derive(Debug, Clone, PartialEq)]
pub struct VerbSet {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub tags: Vec<String>,
    /// Infinitives in the set. Empty means every verb.
    pub verbs: Vec<String>,
    /// Restricts the set to one tense when present.
    pub tense: Option<Tense>,
}

impl VerbSet {
    pub fn contains(&self, item: &ConjugationItem) -> bool {
        (self.verbs.is_empty() || self.verbs.iter().any(|v| *v == item.verb))
            && self.tense.map_or(true, |t| t == item.tense)
    }
}

/// Predicate over items. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<GrammaticalClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<ConjugationFamily>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tense: Option<Tense>,
    /// Case-insensitive substring of the verb or either translation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ItemFilter {
    pub fn is_empty(&self) -> bool {
        self.class.is_none()
            && self.family.is_none()
            && self.tense.is_none()
            && self.text.as_deref().map_or(true, |t| t.trim().is_empty())
    }

    pub fn matches(&self, item: &ConjugationItem) -> bool {
        if self.class.is_some_and(|c| c != item.grammatical_class) {
            return false;
        }
        if self.family.is_some_and(|f| f != item.family) {
            return false;
        }
        if self.tense.is_some_and(|t| t != item.tense) {
            return false;
        }
        match self.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => {
                let needle = text.to_lowercase();
                item.verb.to_lowercase().contains(&needle)
                    || item.english.to_lowercase().contains(&needle)
                    || item.spanish.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

/// Per-verb summary used by the custom verb picker.
#[derive(Debug, Clone, PartialEq)]
pub struct VerbGroup {
    pub verb: String,
    pub english: String,
    pub grammatical_class: GrammaticalClass,
    pub family: ConjugationFamily,
    pub present_count: usize,
    pub preterite_count: usize,
}

impl VerbGroup {
    /// Matches the picker filters: class, family, and text against the
    /// infinitive or its gloss. Tense only narrows the counts, never hides a verb.
    pub fn matches(&self, filter: &ItemFilter) -> bool {
        if filter.class.is_some_and(|c| c != self.grammatical_class) {
            return false;
        }
        if filter.family.is_some_and(|f| f != self.family) {
            return false;
        }
        match filter.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => {
                let needle = text.to_lowercase();
                self.verb.to_lowercase().contains(&needle)
                    || self.english.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }

    pub fn count_for(&self, tense: Option<Tense>) -> usize {
        match tense {
            None => self.present_count + self.preterite_count,
            Some(Tense::Present) => self.present_count,
            Some(Tense::Preterite) => self.preterite_count,
        }
    }
}

/// Immutable item catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<ConjugationItem>,
    sets: Vec<VerbSet>,
}

impl Catalog {
    /// The catalog compiled into the binary, with the default named sets.
    pub fn bundled() -> Result<Self, CatalogError> {
        let items: Vec<ConjugationItem> = serde_json::from_str(BUNDLED_CONJUGATIONS)?;
        Self::new(items, default_sets())
    }

    pub fn new(items: Vec<ConjugationItem>, sets: Vec<VerbSet>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.id.as_str()) {
                return Err(CatalogError::DuplicateId(item.id.clone()));
            }
        }
        let items = items.iter().map(ConjugationItem::fresh_clone).collect();
        Ok(Self { items, sets })
    }

    pub fn items(&self) -> &[ConjugationItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn sets(&self) -> &[VerbSet] {
        &self.sets
    }

    pub fn set(&self, id: &str) -> Option<&VerbSet> {
        self.sets.iter().find(|s| s.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&ConjugationItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Items matching `filter`, in catalog order.
    pub fn filter(&self, filter: &ItemFilter) -> Vec<&ConjugationItem> {
        self.items.iter().filter(|i| filter.matches(i)).collect()
    }

    /// One summary per verb, sorted by infinitive.
    pub fn verb_groups(&self) -> Vec<VerbGroup> {
        let mut groups: BTreeMap<&str, VerbGroup> = BTreeMap::new();

        for item in &self.items {
            let group = groups.entry(item.verb.as_str()).or_insert_with(|| VerbGroup {
                verb: item.verb.clone(),
                english: gloss(&item.english),
                grammatical_class: item.grammatical_class,
                family: item.family,
                present_count: 0,
                preterite_count: 0,
            });
            match item.tense {
                Tense::Present => group.present_count += 1,
                Tense::Preterite => group.preterite_count += 1,
            }
        }

        groups.into_values().collect()
    }
}

/// Strips the subject and any trailing note: "I speak" -> "speak",
/// "he/she speaks, you speak (formal)" -> "speaks".
fn gloss(english: &str) -> String {
    let first_clause = english.split(',').next().unwrap_or(english);
    first_clause
        .split_whitespace()
        .skip(1)
        .take_while(|w| !w.starts_with('('))
        .collect::<Vec<_>>()
        .join(" ")
}

/// The predefined named sets.
pub fn default_sets() -> Vec<VerbSet> {
    fn verbs(list: &[&str]) -> Vec<String> {
        list.iter().map(|v| v.to_string()).collect()
    }
    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    vec![
        VerbSet {
            id: "beginner-present".to_string(),
            name: "Beginner Present Tense".to_string(),
            description: "Essential present tense verbs for beginners".to_string(),
            difficulty: Difficulty::Beginner,
            tags: tags(&["present", "essential", "beginner"]),
            verbs: verbs(&[
                "hablar", "caminar", "comer", "beber", "vivir", "tener", "estar", "ir",
            ]),
            tense: Some(Tense::Present),
        },
        VerbSet {
            id: "intermediate-present".to_string(),
            name: "Intermediate Present Tense".to_string(),
            description: "More challenging present tense verbs".to_string(),
            difficulty: Difficulty::Intermediate,
            tags: tags(&["present", "intermediate"]),
            verbs: Vec::new(),
            tense: Some(Tense::Present),
        },
        VerbSet {
            id: "beginner-preterite".to_string(),
            name: "Beginner Preterite Tense".to_string(),
            description: "Essential preterite tense verbs for beginners".to_string(),
            difficulty: Difficulty::Beginner,
            tags: tags(&["preterite", "essential", "beginner"]),
            verbs: verbs(&["hablar", "comer", "vivir", "tener", "ir"]),
            tense: Some(Tense::Preterite),
        },
        VerbSet {
            id: "all-verbs".to_string(),
            name: "All Verbs".to_string(),
            description: "Complete collection of all verbs and tenses".to_string(),
            difficulty: Difficulty::Advanced,
            tags: tags(&["complete", "all-tenses", "advanced"]),
            verbs: Vec::new(),
            tense: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_item;

    #[test]
    fn bundled_catalog_loads() {
        let catalog = Catalog::bundled().unwrap();
        assert_eq!(catalog.len(), 150);
        assert!(catalog.items().iter().all(|i| !i.mastered));
        assert_eq!(catalog.verb_groups().len(), 15);
        assert!(catalog.get("hablar-yo-present").is_some());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Catalog::new(vec![test_item("a"), test_item("a")], Vec::new()).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn empty_filter_returns_everything() {
        let catalog = Catalog::bundled().unwrap();
        let filter = ItemFilter::default();
        assert!(filter.is_empty());
        assert_eq!(catalog.filter(&filter).len(), catalog.len());
    }

    #[test]
    fn filters_combine() {
        let catalog = Catalog::bundled().unwrap();

        let irregular_preterite = ItemFilter {
            class: Some(GrammaticalClass::Irregular),
            tense: Some(Tense::Preterite),
            ..Default::default()
        };
        let hits = catalog.filter(&irregular_preterite);
        assert!(!hits.is_empty());
        assert!(hits
            .iter()
            .all(|i| i.is_irregular() && i.tense == Tense::Preterite));

        let text = ItemFilter {
            text: Some("  HABL ".to_string()),
            ..Default::default()
        };
        assert_eq!(catalog.filter(&text).len(), 10);
    }

    #[test]
    fn filter_with_no_hits_is_empty_not_error() {
        let catalog = Catalog::bundled().unwrap();
        let filter = ItemFilter {
            text: Some("zzz".to_string()),
            ..Default::default()
        };
        assert!(catalog.filter(&filter).is_empty());
    }

    #[test]
    fn named_sets_resolve_membership() {
        let catalog = Catalog::bundled().unwrap();
        let set = catalog.set("beginner-preterite").unwrap();
        let members: Vec<_> = catalog.items().iter().filter(|i| set.contains(i)).collect();
        assert_eq!(members.len(), 25);
        assert!(members.iter().all(|i| i.tense == Tense::Preterite));

        let all = catalog.set("all-verbs").unwrap();
        assert!(catalog.items().iter().all(|i| all.contains(i)));
        assert!(catalog.set("nope").is_none());
    }

    #[test]
    fn verb_groups_summarize_counts() {
        let catalog = Catalog::bundled().unwrap();
        let groups = catalog.verb_groups();
        let hablar = groups.iter().find(|g| g.verb == "hablar").unwrap();
        assert_eq!(hablar.english, "speak");
        assert_eq!(hablar.present_count, 5);
        assert_eq!(hablar.preterite_count, 5);
        assert_eq!(hablar.count_for(Some(Tense::Present)), 5);
        assert_eq!(hablar.count_for(None), 10);

        let filter = ItemFilter {
            class: Some(GrammaticalClass::Irregular),
            ..Default::default()
        };
        assert!(!hablar.matches(&filter));
    }

    #[test]
    fn gloss_drops_subject_and_notes() {
        assert_eq!(gloss("I speak"), "speak");
        assert_eq!(gloss("you speak (informal, singular)"), "speak");
        assert_eq!(gloss("he/she speaks, you speak (formal, singular)"), "speaks");
    }
}
