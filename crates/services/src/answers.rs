//! Typed access to the answers of one (contribution, question) pair.

use evaluation_core::model::{Contribution, Question, Rating, TextAnswer, TextAnswerState};
use storage::repository::AnswerRepository;

use crate::error::AnswerAccessError;

/// Rating answers of a Likert or grade question.
///
/// # Errors
///
/// Returns `AnswerAccessError::QuestionKindMismatch` for text questions and
/// `AnswerAccessError::Storage` if the repository fails.
pub async fn get_rating_answers(
    answers: &dyn AnswerRepository,
    contribution: &Contribution,
    question: &Question,
) -> Result<Vec<Rating>, AnswerAccessError> {
    if !question.is_rating() {
        return Err(AnswerAccessError::QuestionKindMismatch {
            question: question.id(),
            expected: "rating",
            actual: question.kind(),
        });
    }
    Ok(answers
        .rating_answers(contribution.id(), question.id())
        .await?)
}

/// Number of rating answers of a Likert or grade question.
///
/// # Errors
///
/// Same as [`get_rating_answers`].
pub async fn count_rating_answers(
    answers: &dyn AnswerRepository,
    contribution: &Contribution,
    question: &Question,
) -> Result<usize, AnswerAccessError> {
    if !question.is_rating() {
        return Err(AnswerAccessError::QuestionKindMismatch {
            question: question.id(),
            expected: "rating",
            actual: question.kind(),
        });
    }
    Ok(answers
        .count_rating_answers(contribution.id(), question.id())
        .await?)
}

/// Text answers of a text question, optionally restricted to `filter_states`.
///
/// # Errors
///
/// Returns `AnswerAccessError::QuestionKindMismatch` for rating questions and
/// `AnswerAccessError::Storage` if the repository fails.
pub async fn get_text_answers(
    answers: &dyn AnswerRepository,
    contribution: &Contribution,
    question: &Question,
    filter_states: Option<&[TextAnswerState]>,
) -> Result<Vec<TextAnswer>, AnswerAccessError> {
    if !question.is_text() {
        return Err(AnswerAccessError::QuestionKindMismatch {
            question: question.id(),
            expected: "text",
            actual: question.kind(),
        });
    }
    Ok(answers
        .text_answers(contribution.id(), question.id(), filter_states)
        .await?)
}
