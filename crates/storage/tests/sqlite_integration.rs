use chrono::Duration;
use evaluation_core::model::{
    ContributionId, Question, QuestionId, QuestionResult, Questionnaire, QuestionnaireId, Rating,
    RatingResult, ResultSection, TextAnswer, TextAnswerState, TextResult,
};
use evaluation_core::stats::distribution;
use evaluation_core::time::{fixed_clock, fixed_now};
use evaluation_core::Clock;
use storage::repository::{AnswerRepository, ResultCache};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str, clock: Clock) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url)
        .await
        .expect("connect")
        .with_clock(clock);
    repo.migrate().await.expect("migrate");
    repo
}

fn section() -> ResultSection {
    let likert = Question::likert(QuestionId::new(1), "The lecture was well structured");
    let text = Question::text_question(QuestionId::new(2), "What should change?");
    let ratings: Vec<Rating> = [1, 2].into_iter().map(|v| Rating::new(v).unwrap()).collect();
    ResultSection {
        questionnaire: Questionnaire::new(
            QuestionnaireId::new(1),
            "Lecture",
            vec![likert.clone(), text.clone()],
        ),
        contributor: None,
        results: vec![
            QuestionResult::Likert(RatingResult {
                question: likert,
                count: 2,
                average: Some(1.5),
                median: Some(2.0),
                variance: Some(0.25),
                distribution: distribution(&ratings),
                warning: true,
            }),
            QuestionResult::Text(TextResult {
                question: text,
                answers: vec![TextAnswer::new(
                    ContributionId::new(1),
                    QuestionId::new(2),
                    "more exercises",
                    TextAnswerState::Private,
                )],
            }),
        ],
        average_likert: Some(1.5),
        median_likert: Some(2.0),
        average_grade: None,
        median_grade: None,
        average_total: Some(1.5),
        median_total: Some(2.0),
        warning: false,
    }
}

#[tokio::test]
async fn sqlite_counts_and_returns_ratings_in_order() {
    let repo = connect("memdb_ratings", fixed_clock()).await;
    let (c, q) = (ContributionId::new(1), QuestionId::new(10));

    for value in [4, 1, 5] {
        repo.insert_rating_answer(c, q, Rating::new(value).unwrap())
            .await
            .unwrap();
    }
    repo.insert_rating_answer(ContributionId::new(2), q, Rating::new(3).unwrap())
        .await
        .unwrap();

    assert_eq!(repo.count_rating_answers(c, q).await.unwrap(), 3);
    let values: Vec<u8> = repo
        .rating_answers(c, q)
        .await
        .unwrap()
        .into_iter()
        .map(Rating::value)
        .collect();
    assert_eq!(values, vec![4, 1, 5]);
    assert_eq!(
        repo.count_rating_answers(c, QuestionId::new(11)).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn sqlite_filters_text_answers_by_state() {
    let repo = connect("memdb_texts", fixed_clock()).await;
    let (c, q) = (ContributionId::new(1), QuestionId::new(20));

    for (text, state) in [
        ("Great examples", TextAnswerState::Published),
        ("Rude remark", TextAnswerState::Hidden),
        ("Speak slower", TextAnswerState::Private),
        ("Not looked at yet", TextAnswerState::NotReviewed),
    ] {
        repo.insert_text_answer(&TextAnswer::new(c, q, text, state))
            .await
            .unwrap();
    }

    let all = repo.text_answers(c, q, None).await.unwrap();
    assert_eq!(all.len(), 4);

    let visible = repo
        .text_answers(c, q, Some(TextAnswerState::VISIBLE.as_slice()))
        .await
        .unwrap();
    let texts: Vec<_> = visible.iter().map(|a| a.text.as_str()).collect();
    assert_eq!(texts, vec!["Great examples", "Speak slower"]);
    assert_eq!(visible[1].state, TextAnswerState::Private);

    let none = repo
        .text_answers(c, q, Some(&[] as &[TextAnswerState]))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn sqlite_cache_round_trips_and_expires() {
    let repo = connect("memdb_cache", Clock::fixed(fixed_now())).await;
    let sections = vec![section()];

    assert!(repo.get("course-1").await.unwrap().is_none());

    repo.set("course-1", &sections, Duration::hours(24))
        .await
        .unwrap();
    let cached = repo.get("course-1").await.unwrap().expect("cached sections");
    assert_eq!(cached, sections);
    let QuestionResult::Likert(likert) = &cached[0].results[0] else {
        panic!("expected a likert result");
    };
    assert_eq!(likert.distribution.as_ref().unwrap()[&1], 50.0);

    let later = repo
        .clone()
        .with_clock(Clock::fixed(fixed_now() + Duration::hours(25)));
    assert!(later.get("course-1").await.unwrap().is_none());
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice", fixed_clock()).await;
    repo.migrate().await.expect("second migrate");
}
