//! Immutable reference data: the question bank and the module/lesson tree.
//!
//! Loaded once at startup and never mutated. Raw category tags are validated
//! into the closed [`Category`] enum here, at the boundary, so the rest of
//! the core never handles open-ended strings.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Number of answer options on every question.
pub const OPTION_COUNT: usize = 4;

/// Topic tag used to classify questions and drive weak-area detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Histoire,
    Institutions,
    Valeurs,
    DroitsDevoirs,
    Geographie,
    Culture,
    Langue,
    ViePratique,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Histoire,
        Category::Institutions,
        Category::Valeurs,
        Category::DroitsDevoirs,
        Category::Geographie,
        Category::Culture,
        Category::Langue,
        Category::ViePratique,
    ];

    /// Parse a raw catalog tag. Returns `None` for tags outside the closed set.
    pub fn parse(tag: &str) -> Option<Category> {
        match tag {
            "histoire" => Some(Category::Histoire),
            "institutions" => Some(Category::Institutions),
            "valeurs" => Some(Category::Valeurs),
            "droits-devoirs" => Some(Category::DroitsDevoirs),
            "geographie" => Some(Category::Geographie),
            "culture" => Some(Category::Culture),
            "langue" => Some(Category::Langue),
            "vie-pratique" => Some(Category::ViePratique),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Category::Histoire => "histoire",
            Category::Institutions => "institutions",
            Category::Valeurs => "valeurs",
            Category::DroitsDevoirs => "droits-devoirs",
            Category::Geographie => "geographie",
            Category::Culture => "culture",
            Category::Langue => "langue",
            Category::ViePratique => "vie-pratique",
        }
    }

    /// Display name shown by presentation layers.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Histoire => "Histoire de France",
            Category::Institutions => "Institutions de la République",
            Category::Valeurs => "Valeurs républicaines",
            Category::DroitsDevoirs => "Droits et devoirs du citoyen",
            Category::Geographie => "Géographie française",
            Category::Culture => "Culture et patrimoine",
            Category::Langue => "Langue française",
            Category::ViePratique => "Vie pratique",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Facile,
    Moyen,
    Difficile,
}

/// Which official exam a question or attempt targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExamType {
    Csp,
    ResidentCard,
}

/// One multiple-choice question. Immutable reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub prompt: String,
    /// Exactly [`OPTION_COUNT`] entries, enforced at catalog load.
    pub options: Vec<String>,
    /// Index of the correct option, within [0, 3].
    pub correct_answer: u8,
    pub explanation: String,
    /// Reference into the Livret du citoyen.
    pub source: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    /// Ids of related questions in the bank.
    #[serde(default)]
    pub related_questions: Vec<String>,
    /// Estimated study time in minutes.
    pub estimated_min: u64,
    pub order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub description: String,
    /// Estimated total time in minutes.
    pub estimated_min: u64,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    /// Ids of modules recommended before this one.
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

impl Module {
    pub fn lesson_by_id(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == lesson_id)
    }
}

/// Raw catalog file shape, before validation. Category tags are still
/// open-ended strings here.
#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    questions: Vec<RawQuestion>,
    #[serde(default)]
    modules: Vec<Module>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    id: String,
    category: String,
    difficulty: Difficulty,
    prompt: String,
    options: Vec<String>,
    correct_answer: u8,
    explanation: String,
    source: String,
    #[serde(default)]
    tags: Vec<String>,
}

/// The validated question bank plus module tree.
#[derive(Debug, Clone)]
pub struct Catalog {
    questions: Vec<Question>,
    modules: Vec<Module>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from already-typed data, enforcing the bank
    /// invariants (4 options, correct index in range, unique ids).
    pub fn new(questions: Vec<Question>, modules: Vec<Module>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(questions.len());
        for (i, q) in questions.iter().enumerate() {
            if q.options.len() != OPTION_COUNT {
                return Err(CatalogError::WrongOptionCount {
                    id: q.id.clone(),
                    found: q.options.len(),
                });
            }
            if q.correct_answer as usize >= OPTION_COUNT {
                return Err(CatalogError::CorrectAnswerOutOfRange {
                    id: q.id.clone(),
                    index: q.correct_answer,
                });
            }
            if by_id.insert(q.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateQuestionId { id: q.id.clone() });
            }
        }
        Ok(Self {
            questions,
            modules,
            by_id,
        })
    }

    /// Load and validate a catalog from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, crate::error::CoreError> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        let mut questions = Vec::with_capacity(raw.questions.len());
        for q in raw.questions {
            let category =
                Category::parse(&q.category).ok_or_else(|| CatalogError::UnknownCategory {
                    id: q.id.clone(),
                    raw: q.category.clone(),
                })?;
            questions.push(Question {
                id: q.id,
                category,
                difficulty: q.difficulty,
                prompt: q.prompt,
                options: q.options,
                correct_answer: q.correct_answer,
                explanation: q.explanation,
                source: q.source,
                tags: q.tags,
            });
        }
        Ok(Self::new(questions, raw.modules)?)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn question_by_id(&self, id: &str) -> Option<&Question> {
        self.by_id.get(id).map(|&i| &self.questions[i])
    }

    pub fn module_by_id(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Categories actually present in the question bank. Weak-category
    /// detection only ever flags a subset of these.
    pub fn categories_present(&self) -> BTreeSet<Category> {
        self.questions.iter().map(|q| q.category).collect()
    }

    /// Resolve a lesson's related questions against the bank, skipping ids
    /// that do not exist.
    pub fn questions_for_lesson<'a>(&'a self, lesson: &Lesson) -> Vec<&'a Question> {
        lesson
            .related_questions
            .iter()
            .filter_map(|id| self.question_by_id(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, category: Category) -> Question {
        Question {
            id: id.into(),
            category,
            difficulty: Difficulty::Facile,
            prompt: format!("Question {id}?"),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_answer: 0,
            explanation: String::new(),
            source: "Livret du citoyen".into(),
            tags: vec![],
        }
    }

    #[test]
    fn category_tags_round_trip() {
        for c in Category::ALL {
            assert_eq!(Category::parse(c.as_tag()), Some(c));
        }
        assert_eq!(Category::parse("mathematiques"), None);
    }

    #[test]
    fn rejects_wrong_option_count() {
        let mut q = question("q1", Category::Histoire);
        q.options.pop();
        let err = Catalog::new(vec![q], vec![]).unwrap_err();
        assert!(matches!(err, CatalogError::WrongOptionCount { found: 3, .. }));
    }

    #[test]
    fn rejects_out_of_range_correct_answer() {
        let mut q = question("q1", Category::Histoire);
        q.correct_answer = 4;
        let err = Catalog::new(vec![q], vec![]).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::CorrectAnswerOutOfRange { index: 4, .. }
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let a = question("q1", Category::Histoire);
        let b = question("q1", Category::Culture);
        let err = Catalog::new(vec![a, b], vec![]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateQuestionId { .. }));
    }

    #[test]
    fn from_json_rejects_unknown_category() {
        let json = r#"{
            "questions": [{
                "id": "q1",
                "category": "astronomie",
                "difficulty": "facile",
                "prompt": "?",
                "options": ["A", "B", "C", "D"],
                "correct_answer": 1,
                "explanation": "",
                "source": ""
            }],
            "modules": []
        }"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            crate::error::CoreError::Catalog(CatalogError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn from_json_loads_valid_bank() {
        let json = r#"{
            "questions": [{
                "id": "q1",
                "category": "droits-devoirs",
                "difficulty": "moyen",
                "prompt": "Quel est l'âge de la majorité ?",
                "options": ["16 ans", "18 ans", "21 ans", "25 ans"],
                "correct_answer": 1,
                "explanation": "La majorité est fixée à 18 ans depuis 1974.",
                "source": "Livret du citoyen, p. 12"
            }],
            "modules": []
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.questions().len(), 1);
        let q = catalog.question_by_id("q1").unwrap();
        assert_eq!(q.category, Category::DroitsDevoirs);
        assert_eq!(q.correct_answer, 1);
    }

    #[test]
    fn lesson_questions_resolve_against_the_bank() {
        let catalog = Catalog::new(
            vec![
                question("q1", Category::Histoire),
                question("q2", Category::Histoire),
            ],
            vec![],
        )
        .unwrap();
        let lesson = Lesson {
            id: "l1".into(),
            title: "1789".into(),
            content: String::new(),
            key_points: vec![],
            related_questions: vec!["q2".into(), "missing".into()],
            estimated_min: 10,
            order: 0,
        };
        let related = catalog.questions_for_lesson(&lesson);
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].id, "q2");
    }

    #[test]
    fn categories_present_reflects_bank() {
        let catalog = Catalog::new(
            vec![
                question("q1", Category::Histoire),
                question("q2", Category::Histoire),
                question("q3", Category::Geographie),
            ],
            vec![],
        )
        .unwrap();
        let present = catalog.categories_present();
        assert_eq!(present.len(), 2);
        assert!(present.contains(&Category::Histoire));
        assert!(present.contains(&Category::Geographie));
    }
}
