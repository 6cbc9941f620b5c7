use std::sync::Arc;

use async_trait::async_trait;
use evaluation_core::model::{
    Contribution, ContributionId, Course, CourseId, Question, QuestionId, Questionnaire,
    QuestionnaireId, Rating, ResultsSettings, TextAnswer, TextAnswerState, UserId,
};
use evaluation_core::time::fixed_clock;
use services::{NotificationError, NotificationService, ResultsError, ResultsService};
use storage::repository::{AnswerRepository, InMemoryResultCache, StorageError};

struct UnreachableAnswers;

#[async_trait]
impl AnswerRepository for UnreachableAnswers {
    async fn count_rating_answers(
        &self,
        _contribution: ContributionId,
        _question: QuestionId,
    ) -> Result<usize, StorageError> {
        Err(StorageError::Connection("database is down".into()))
    }

    async fn rating_answers(
        &self,
        _contribution: ContributionId,
        _question: QuestionId,
    ) -> Result<Vec<Rating>, StorageError> {
        Err(StorageError::Connection("database is down".into()))
    }

    async fn text_answers(
        &self,
        _contribution: ContributionId,
        _question: QuestionId,
        _states: Option<&[TextAnswerState]>,
    ) -> Result<Vec<TextAnswer>, StorageError> {
        Err(StorageError::Connection("database is down".into()))
    }
}

fn course() -> Course {
    let questionnaire = Questionnaire::new(
        QuestionnaireId::new(1),
        "Seminar",
        vec![
            Question::likert(QuestionId::new(1), "pace"),
            Question::text_question(QuestionId::new(2), "remarks"),
        ],
    );
    Course::new(
        CourseId::new(3),
        "Seminar",
        UserId::new(1),
        vec![Contribution::general(ContributionId::new(1), vec![questionnaire])],
        vec![UserId::new(2)],
        vec![],
    )
    .expect("valid course")
}

#[tokio::test]
async fn results_surface_answer_source_failures() {
    let cache = InMemoryResultCache::new(fixed_clock());
    let service = ResultsService::new(
        ResultsSettings::default(),
        Arc::new(UnreachableAnswers),
        Arc::new(cache.clone()),
    );

    let err = service.calculate_results(&course()).await.unwrap_err();
    assert!(matches!(err, ResultsError::Answers(_)));
    assert_eq!(cache.sets(), 0);
}

#[tokio::test]
async fn notifications_surface_answer_source_failures() {
    let service =
        NotificationService::new(ResultsSettings::default(), Arc::new(UnreachableAnswers));

    let err = service
        .partition_notifications(&[course()])
        .await
        .unwrap_err();
    assert!(matches!(err, NotificationError::Answers(_)));
}
