mod answer;
mod course;
mod ids;
mod question;
mod results;
mod settings;

pub use ids::{ContributionId, CourseId, ParseIdError, QuestionId, QuestionnaireId, UserId};

pub use answer::{AnswerError, Rating, TextAnswer, TextAnswerState};
pub use course::{Contribution, Course, CourseError};
pub use question::{Question, QuestionKind, Questionnaire};
pub use results::{FinalGrades, QuestionResult, RatingResult, ResultSection, TextResult};
pub use settings::{ResultsSettings, ResultsSettingsDraft, SettingsError};
