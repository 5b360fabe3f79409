//! Turns a user's choice into a concrete working set.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ItemFilter};
use crate::models::ConjugationItem;

/// What the user chose to practice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    Everything,
    Set { id: String },
    Verbs {
        verbs: Vec<String>,
        #[serde(default)]
        filter: ItemFilter,
    },
}

impl Selection {
    pub fn set(id: impl Into<String>) -> Self {
        Self::Set { id: id.into() }
    }

    /// Human readable name for headers and the resume entry.
    pub fn label(&self, catalog: &Catalog) -> String {
        match self {
            Self::Everything => "Everything".to_string(),
            Self::Set { id } => catalog
                .set(id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| id.clone()),
            Self::Verbs { verbs, filter } => {
                let mut label = match verbs.len() {
                    0 => "No verbs".to_string(),
                    1..=3 => verbs.join(", "),
                    n => format!("{} verbs", n),
                };
                if let Some(tense) = filter.tense {
                    label.push_str(&format!(" ({})", tense.name()));
                }
                label
            }
        }
    }
}

/// Builds a fresh working set: catalog order, every item cloned with
/// `mastered = false`. An unknown set id or a filter with no hits yields an
/// empty set; callers route that to "nothing to practice".
pub fn build_working_set(catalog: &Catalog, selection: &Selection) -> Vec<ConjugationItem> {
    let items = catalog.items().iter();

    let picked: Vec<&ConjugationItem> = match selection {
        Selection::Everything => items.collect(),
        Selection::Set { id } => match catalog.set(id) {
            Some(set) => items.filter(|i| set.contains(i)).collect(),
            None => Vec::new(),
        },
        Selection::Verbs { verbs, filter } => items
            .filter(|i| verbs.iter().any(|v| *v == i.verb) && filter.matches(i))
            .collect(),
    };

    picked.into_iter().map(ConjugationItem::fresh_clone).collect()
}
