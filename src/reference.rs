//! Reference tables: regular ending patterns and irregular verb forms.

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogError;
use crate::models::{Person, Tense};

/// Bundled irregular verb tables.
const BUNDLED_IRREGULAR: &str = include_str!("../bundled/irregular_tables.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndingRow {
    pub person: Person,
    pub ending: &'static str,
    pub example: &'static str,
}

/// Endings of one regular family in one tense, with a model verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndingPattern {
    pub key: &'static str,
    pub title: &'static str,
    pub tense: Tense,
    pub model_verb: &'static str,
    pub rows: [EndingRow; 5],
}

const fn row(person: Person, ending: &'static str, example: &'static str) -> EndingRow {
    EndingRow {
        person,
        ending,
        example,
    }
}

pub const ENDING_PATTERNS: [EndingPattern; 5] = [
    EndingPattern {
        key: "present-ar",
        title: "-ar verbs (present)",
        tense: Tense::Present,
        model_verb: "hablar",
        rows: [
            row(Person::Yo, "-o", "hablo"),
            row(Person::Tu, "-as", "hablas"),
            row(Person::El, "-a", "habla"),
            row(Person::Nosotros, "-amos", "hablamos"),
            row(Person::Ellos, "-an", "hablan"),
        ],
    },
    EndingPattern {
        key: "present-er",
        title: "-er verbs (present)",
        tense: Tense::Present,
        model_verb: "comer",
        rows: [
            row(Person::Yo, "-o", "como"),
            row(Person::Tu, "-es", "comes"),
            row(Person::El, "-e", "come"),
            row(Person::Nosotros, "-emos", "comemos"),
            row(Person::Ellos, "-en", "comen"),
        ],
    },
    EndingPattern {
        key: "present-ir",
        title: "-ir verbs (present)",
        tense: Tense::Present,
        model_verb: "vivir",
        rows: [
            row(Person::Yo, "-o", "vivo"),
            row(Person::Tu, "-es", "vives"),
            row(Person::El, "-e", "vive"),
            row(Person::Nosotros, "-imos", "vivimos"),
            row(Person::Ellos, "-en", "viven"),
        ],
    },
    EndingPattern {
        key: "preterite-ar",
        title: "-ar verbs (preterite)",
        tense: Tense::Preterite,
        model_verb: "hablar",
        rows: [
            row(Person::Yo, "-é", "hablé"),
            row(Person::Tu, "-aste", "hablaste"),
            row(Person::El, "-ó", "habló"),
            row(Person::Nosotros, "-amos", "hablamos"),
            row(Person::Ellos, "-aron", "hablaron"),
        ],
    },
    EndingPattern {
        key: "preterite-er-ir",
        title: "-er/-ir verbs (preterite)",
        tense: Tense::Preterite,
        model_verb: "comer",
        rows: [
            row(Person::Yo, "-í", "comí"),
            row(Person::Tu, "-iste", "comiste"),
            row(Person::El, "-ió", "comió"),
            row(Person::Nosotros, "-imos", "comimos"),
            row(Person::Ellos, "-ieron", "comieron"),
        ],
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrregularForm {
    pub person: Person,
    pub present: String,
    pub preterite: String,
}

impl IrregularForm {
    pub fn form(&self, tense: Tense) -> &str {
        match tense {
            Tense::Present => &self.present,
            Tense::Preterite => &self.preterite,
        }
    }
}

/// Present and preterite forms of one irregular verb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrregularTable {
    pub verb: String,
    pub english: String,
    pub forms: Vec<IrregularForm>,
}

/// Loads the bundled irregular tables, sorted by infinitive.
pub fn irregular_tables() -> Result<Vec<IrregularTable>, CatalogError> {
    let mut tables: Vec<IrregularTable> = serde_json::from_str(BUNDLED_IRREGULAR)?;
    tables.sort_by(|a, b| a.verb.cmp(&b.verb));
    Ok(tables)
}
