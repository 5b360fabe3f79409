//! Data models for conjugation items.

use serde::{Deserialize, Serialize};

/// Whether a verb follows the regular pattern of its family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrammaticalClass {
    Regular,
    Irregular,
}

impl GrammaticalClass {
    pub const ALL: [GrammaticalClass; 2] = [GrammaticalClass::Regular, GrammaticalClass::Irregular];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Irregular => "irregular",
        }
    }

    pub fn color_for_theme(&self, theme: &crate::ui::theme::Theme) -> ratatui::style::Color {
        match self {
            Self::Regular => theme.colors.info,
            Self::Irregular => theme.colors.warning,
        }
    }
}

/// Infinitive ending of a verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConjugationFamily {
    Ar,
    Er,
    Ir,
}

impl ConjugationFamily {
    pub const ALL: [ConjugationFamily; 3] =
        [ConjugationFamily::Ar, ConjugationFamily::Er, ConjugationFamily::Ir];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ar => "-ar",
            Self::Er => "-er",
            Self::Ir => "-ir",
        }
    }
}

/// Grammatical person, singular and plural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Person {
    Yo,
    Tu,
    El,
    Nosotros,
    Ellos,
}

impl Person {
    pub const ALL: [Person; 5] = [
        Person::Yo,
        Person::Tu,
        Person::El,
        Person::Nosotros,
        Person::Ellos,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Yo => "yo",
            Self::Tu => "tú",
            Self::El => "él/ella/usted",
            Self::Nosotros => "nosotros",
            Self::Ellos => "ellos/ellas/ustedes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tense {
    Present,
    Preterite,
}

impl Tense {
    pub const ALL: [Tense; 2] = [Tense::Present, Tense::Preterite];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Preterite => "preterite",
        }
    }
}

/// Which side of an item is shown as the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    EnglishFirst,
    SpanishFirst,
}

impl Direction {
    pub fn from_spanish_first(spanish_first: bool) -> Self {
        if spanish_first {
            Self::SpanishFirst
        } else {
            Self::EnglishFirst
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::EnglishFirst => Self::SpanishFirst,
            Self::SpanishFirst => Self::EnglishFirst,
        }
    }

    pub fn prompt<'a>(&self, item: &'a ConjugationItem) -> &'a str {
        match self {
            Self::EnglishFirst => &item.english,
            Self::SpanishFirst => &item.spanish,
        }
    }

    pub fn answer<'a>(&self, item: &'a ConjugationItem) -> &'a str {
        match self {
            Self::EnglishFirst => &item.spanish,
            Self::SpanishFirst => &item.english,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::EnglishFirst => "English → Spanish",
            Self::SpanishFirst => "Spanish → English",
        }
    }
}

/// A single conjugation prompt.
///
/// Identity is `id`; `mastered` is the only field that changes, and only on
/// a session's own copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConjugationItem {
    pub id: String,
    pub english: String,
    pub spanish: String,
    pub verb: String,
    #[serde(rename = "class")]
    pub grammatical_class: GrammaticalClass,
    pub family: ConjugationFamily,
    pub person: Person,
    pub tense: Tense,
    #[serde(default)]
    pub mastered: bool,
}

impl ConjugationItem {
    /// A copy of this item with progress cleared.
    pub fn fresh_clone(&self) -> Self {
        Self {
            mastered: false,
            ..self.clone()
        }
    }

    pub fn is_irregular(&self) -> bool {
        self.grammatical_class == GrammaticalClass::Irregular
    }
}

#[cfg(test)]
pub(crate) fn test_item(id: &str) -> ConjugationItem {
    ConjugationItem {
        id: id.to_string(),
        english: format!("english {id}"),
        spanish: format!("spanish {id}"),
        verb: "hablar".to_string(),
        grammatical_class: GrammaticalClass::Regular,
        family: ConjugationFamily::Ar,
        person: Person::Yo,
        tense: Tense::Present,
        mastered: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_swaps_prompt_and_answer() {
        let item = test_item("a");
        let dir = Direction::EnglishFirst;
        assert_eq!(dir.prompt(&item), "english a");
        assert_eq!(dir.answer(&item), "spanish a");

        let flipped = dir.toggled();
        assert_eq!(flipped.prompt(&item), "spanish a");
        assert_eq!(flipped.answer(&item), "english a");
        assert_eq!(flipped.toggled(), Direction::EnglishFirst);
    }

    #[test]
    fn item_deserializes_without_mastered_flag() {
        let json = r#"{
            "id": "tener-yo-present",
            "english": "I have",
            "spanish": "tengo",
            "verb": "tener",
            "class": "irregular",
            "family": "er",
            "person": "yo",
            "tense": "present"
        }"#;
        let item: ConjugationItem = serde_json::from_str(json).unwrap();
        assert!(!item.mastered);
        assert!(item.is_irregular());
        assert_eq!(item.person.label(), "yo");
    }

    #[test]
    fn fresh_clone_clears_mastery() {
        let mut item = test_item("a");
        item.mastered = true;
        assert!(!item.fresh_clone().mastered);
    }
}
