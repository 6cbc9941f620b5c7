use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::ids::{QuestionId, QuestionnaireId};

//
// ─── QUESTION KIND ─────────────────────────────────────────────────────────────
//

/// The answer shape a question collects.
///
/// - `Likert`: 1-5 agreement scale
/// - `Grade`: 1-5 numeric grade, aggregated like Likert but weighted separately
/// - `Text`: free-form answer, moderated before it is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Likert,
    Grade,
    Text,
}

impl QuestionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Likert => "likert",
            QuestionKind::Grade => "grade",
            QuestionKind::Text => "text",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    text: String,
    kind: QuestionKind,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, text: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id,
            text: text.into(),
            kind,
        }
    }

    #[must_use]
    pub fn likert(id: QuestionId, text: impl Into<String>) -> Self {
        Self::new(id, text, QuestionKind::Likert)
    }

    #[must_use]
    pub fn grade(id: QuestionId, text: impl Into<String>) -> Self {
        Self::new(id, text, QuestionKind::Grade)
    }

    #[must_use]
    pub fn text_question(id: QuestionId, text: impl Into<String>) -> Self {
        Self::new(id, text, QuestionKind::Text)
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn is_likert(&self) -> bool {
        self.kind == QuestionKind::Likert
    }

    #[must_use]
    pub fn is_grade(&self) -> bool {
        self.kind == QuestionKind::Grade
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        self.kind == QuestionKind::Text
    }

    /// Likert and grade questions share the 1-5 rating storage.
    #[must_use]
    pub fn is_rating(&self) -> bool {
        self.is_likert() || self.is_grade()
    }
}

//
// ─── QUESTIONNAIRE ─────────────────────────────────────────────────────────────
//

/// A named, ordered group of questions administered together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Questionnaire {
    id: QuestionnaireId,
    name: String,
    questions: Vec<Question>,
}

impl Questionnaire {
    #[must_use]
    pub fn new(id: QuestionnaireId, name: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id,
            name: name.into(),
            questions,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionnaireId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn rating_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(|q| q.is_rating())
    }

    pub fn text_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(|q| q.is_text())
    }
}
