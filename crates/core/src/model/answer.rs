use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ContributionId, QuestionId};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("rating must be between 1 and 5, got {0}")]
    OutOfRange(i64),
    #[error("unknown text answer state: {0}")]
    UnknownState(String),
}

//
// ─── RATING ───────────────────────────────────────────────────────────────────
//

/// A single Likert or grade answer on the 1-5 scale.
///
/// The "no answer" choice is never stored, so aggregation only ever sees 1-5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// The five bucket values of every distribution, in order.
    pub const VALUES: [u8; 5] = [1, 2, 3, 4, 5];

    /// # Errors
    ///
    /// Returns `AnswerError::OutOfRange` if `value` is not in 1..=5.
    pub fn new(value: i64) -> Result<Self, AnswerError> {
        match u8::try_from(value) {
            Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Self(v)),
            _ => Err(AnswerError::OutOfRange(value)),
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }
}

impl TryFrom<i64> for Rating {
    type Error = AnswerError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> Self {
        i64::from(rating.0)
    }
}

//
// ─── TEXT ANSWERS ─────────────────────────────────────────────────────────────
//

/// Moderation state of a free-text answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnswerState {
    /// Rejected during review; never shown.
    Hidden,
    Published,
    /// Only shown to the contributor it is about.
    Private,
    NotReviewed,
}

impl TextAnswerState {
    /// States that are included in results and count as visible to contributors.
    pub const VISIBLE: [TextAnswerState; 2] =
        [TextAnswerState::Private, TextAnswerState::Published];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            TextAnswerState::Hidden => "HI",
            TextAnswerState::Published => "PU",
            TextAnswerState::Private => "PR",
            TextAnswerState::NotReviewed => "NR",
        }
    }

    /// # Errors
    ///
    /// Returns `AnswerError::UnknownState` for codes other than HI/PU/PR/NR.
    pub fn from_code(code: &str) -> Result<Self, AnswerError> {
        match code {
            "HI" => Ok(TextAnswerState::Hidden),
            "PU" => Ok(TextAnswerState::Published),
            "PR" => Ok(TextAnswerState::Private),
            "NR" => Ok(TextAnswerState::NotReviewed),
            other => Err(AnswerError::UnknownState(other.to_string())),
        }
    }

    #[must_use]
    pub fn is_visible(self) -> bool {
        Self::VISIBLE.contains(&self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAnswer {
    pub contribution_id: ContributionId,
    pub question_id: QuestionId,
    pub text: String,
    pub state: TextAnswerState,
}

impl TextAnswer {
    #[must_use]
    pub fn new(
        contribution_id: ContributionId,
        question_id: QuestionId,
        text: impl Into<String>,
        state: TextAnswerState,
    ) -> Self {
        Self {
            contribution_id,
            question_id,
            text: text.into(),
            state,
        }
    }
}
