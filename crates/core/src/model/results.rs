//! Summaries produced for display.
//!
//! Every statistic is `None` exactly when there was nothing to summarize, so
//! "no data" is never confused with a real value of zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::answer::TextAnswer;
use crate::model::ids::UserId;
use crate::model::question::{Question, Questionnaire};

/// Summary of the ratings given to one Likert or grade question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingResult {
    pub question: Question,
    pub count: usize,
    pub average: Option<f64>,
    pub median: Option<f64>,
    pub variance: Option<f64>,
    /// Percentage of answers per value 1..=5; `None` without answers.
    pub distribution: Option<BTreeMap<u8, f64>>,
    pub warning: bool,
}

/// Moderated free-text answers to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextResult {
    pub question: Question,
    pub answers: Vec<TextAnswer>,
}

/// Must stay externally tagged: the integer keys of `distribution` do not
/// survive the buffering serde does for internally tagged enums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionResult {
    Likert(RatingResult),
    Grade(RatingResult),
    Text(TextResult),
}

impl QuestionResult {
    #[must_use]
    pub fn question(&self) -> &Question {
        match self {
            QuestionResult::Likert(r) | QuestionResult::Grade(r) => &r.question,
            QuestionResult::Text(r) => &r.question,
        }
    }

    #[must_use]
    pub fn is_likert(&self) -> bool {
        matches!(self, QuestionResult::Likert(_))
    }

    #[must_use]
    pub fn is_grade(&self) -> bool {
        matches!(self, QuestionResult::Grade(_))
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, QuestionResult::Text(_))
    }

    /// The rating summary, for Likert and grade results.
    #[must_use]
    pub fn as_rating(&self) -> Option<&RatingResult> {
        match self {
            QuestionResult::Likert(r) | QuestionResult::Grade(r) => Some(r),
            QuestionResult::Text(_) => None,
        }
    }
}

/// All results of one questionnaire for one contributor (or the course itself).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSection {
    pub questionnaire: Questionnaire,
    pub contributor: Option<UserId>,
    pub results: Vec<QuestionResult>,
    pub average_likert: Option<f64>,
    pub median_likert: Option<f64>,
    pub average_grade: Option<f64>,
    pub median_grade: Option<f64>,
    pub average_total: Option<f64>,
    pub median_total: Option<f64>,
    pub warning: bool,
}

impl ResultSection {
    /// Copy of this section with `results` swapped out; the statistics are kept as computed.
    #[must_use]
    pub fn with_results(&self, results: Vec<QuestionResult>) -> Self {
        Self {
            questionnaire: self.questionnaire.clone(),
            contributor: self.contributor,
            results,
            average_likert: self.average_likert,
            median_likert: self.median_likert,
            average_grade: self.average_grade,
            median_grade: self.median_grade,
            average_total: self.average_total,
            median_total: self.median_total,
            warning: self.warning,
        }
    }

    pub fn likert_results(&self) -> impl Iterator<Item = &RatingResult> {
        self.results.iter().filter_map(|r| match r {
            QuestionResult::Likert(rating) => Some(rating),
            _ => None,
        })
    }

    pub fn grade_results(&self) -> impl Iterator<Item = &RatingResult> {
        self.results.iter().filter_map(|r| match r {
            QuestionResult::Grade(rating) => Some(rating),
            _ => None,
        })
    }
}

/// Course-wide grade combined from every section.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FinalGrades {
    pub average: Option<f64>,
    pub median: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::answer::TextAnswerState;
    use crate::model::ids::{ContributionId, QuestionId, QuestionnaireId};

    fn rating(question: Question) -> RatingResult {
        RatingResult {
            question,
            count: 1,
            average: Some(2.0),
            median: Some(2.0),
            variance: Some(0.0),
            distribution: Some(BTreeMap::from([
                (1, 0.0),
                (2, 100.0),
                (3, 0.0),
                (4, 0.0),
                (5, 0.0),
            ])),
            warning: false,
        }
    }

    fn section() -> ResultSection {
        let likert = Question::likert(QuestionId::new(1), "structure");
        let text = Question::text_question(QuestionId::new(2), "comments");
        ResultSection {
            questionnaire: Questionnaire::new(
                QuestionnaireId::new(1),
                "Lecture",
                vec![likert.clone(), text.clone()],
            ),
            contributor: Some(UserId::new(3)),
            results: vec![
                QuestionResult::Likert(rating(likert)),
                QuestionResult::Text(TextResult {
                    question: text,
                    answers: vec![TextAnswer::new(
                        ContributionId::new(1),
                        QuestionId::new(2),
                        "great",
                        TextAnswerState::Published,
                    )],
                }),
            ],
            average_likert: Some(2.0),
            median_likert: Some(2.0),
            average_grade: None,
            median_grade: None,
            average_total: Some(2.0),
            median_total: Some(2.0),
            warning: true,
        }
    }

    #[test]
    fn with_results_keeps_statistics() {
        let original = section();
        let replaced = original.with_results(
            original
                .results
                .iter()
                .filter(|r| !r.is_text())
                .cloned()
                .collect(),
        );

        assert_eq!(replaced.results.len(), 1);
        assert_eq!(replaced.average_total, original.average_total);
        assert!(replaced.warning);
        assert_eq!(replaced.contributor, original.contributor);
    }

    #[test]
    fn dispatch_by_kind() {
        let s = section();
        assert!(s.results[0].is_likert());
        assert!(s.results[0].as_rating().is_some());
        assert!(s.results[1].is_text());
        assert!(s.results[1].as_rating().is_none());
        assert_eq!(s.results[1].question().id(), QuestionId::new(2));
        assert_eq!(s.likert_results().count(), 1);
        assert_eq!(s.grade_results().count(), 0);
    }

    #[test]
    fn section_with_distribution_survives_json() {
        let s = section();
        let json = serde_json::to_string(&s).unwrap();
        let back: ResultSection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);

        let QuestionResult::Likert(rating) = &back.results[0] else {
            panic!("expected a likert result");
        };
        assert_eq!(rating.distribution.as_ref().unwrap()[&2], 100.0);
    }

    #[test]
    fn results_are_tagged_by_kind() {
        let json = serde_json::to_value(&section().results).unwrap();
        assert!(json[0].get("likert").is_some());
        assert!(json[1].get("text").is_some());
    }
}
