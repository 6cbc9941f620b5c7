//! Shared error types for the services crate.

use thiserror::Error;

use evaluation_core::model::{QuestionId, QuestionKind};
use storage::repository::StorageError;

/// Errors emitted by the answer accessors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnswerAccessError {
    /// The caller asked for answers of the wrong shape; this is a bug, not bad data.
    #[error("question {question} is a {actual} question, expected {expected} answers")]
    QuestionKindMismatch {
        question: QuestionId,
        expected: &'static str,
        actual: QuestionKind,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ResultsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResultsError {
    #[error(transparent)]
    Answers(#[from] AnswerAccessError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `NotificationService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NotificationError {
    #[error(transparent)]
    Answers(#[from] AnswerAccessError),
}
