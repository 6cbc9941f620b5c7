use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use evaluation_core::model::{
    Contribution, Course, CourseId, ResultsSettings, TextAnswerState, UserId,
};
use storage::repository::AnswerRepository;

use crate::answers::get_text_answers;
use crate::error::NotificationError;

/// Users to notify when results are published, with the courses each one cares about.
pub type Notifications = BTreeMap<UserId, BTreeSet<CourseId>>;

/// Decides who hears about newly published results.
#[derive(Clone)]
pub struct NotificationService {
    settings: ResultsSettings,
    answers: Arc<dyn AnswerRepository>,
}

impl NotificationService {
    #[must_use]
    pub fn new(settings: ResultsSettings, answers: Arc<dyn AnswerRepository>) -> Self {
        Self { settings, answers }
    }

    /// Group `courses` by the users that should be notified about them.
    ///
    /// A course that can publish grades notifies every participant and every
    /// contributor. Otherwise only people who can read visible text answers
    /// hear about it: the contributors those answers are about, plus the
    /// responsible contributor.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::Answers` if the answer source fails.
    pub async fn partition_notifications(
        &self,
        courses: &[Course],
    ) -> Result<Notifications, NotificationError> {
        let mut notifications = Notifications::new();
        for course in courses {
            let recipients = if course.can_publish_grades(&self.settings) {
                Self::everyone(course)
            } else {
                self.text_answer_readers(course).await?
            };
            debug!(
                course = %course.id(),
                recipients = recipients.len(),
                "partitioned notifications"
            );
            for user in recipients {
                notifications.entry(user).or_default().insert(course.id());
            }
        }
        Ok(notifications)
    }

    fn everyone(course: &Course) -> BTreeSet<UserId> {
        course
            .participants()
            .iter()
            .copied()
            .chain(course.contributions().iter().filter_map(Contribution::contributor))
            .collect()
    }

    async fn text_answer_readers(
        &self,
        course: &Course,
    ) -> Result<BTreeSet<UserId>, NotificationError> {
        let mut readers = BTreeSet::new();
        let mut any_visible = false;
        for contribution in course.contributions() {
            if self.has_visible_text(contribution).await? {
                any_visible = true;
                if let Some(contributor) = contribution.contributor() {
                    readers.insert(contributor);
                }
            }
        }
        if any_visible {
            readers.insert(course.responsible());
        }
        Ok(readers)
    }

    async fn has_visible_text(
        &self,
        contribution: &Contribution,
    ) -> Result<bool, NotificationError> {
        for questionnaire in contribution.questionnaires() {
            for question in questionnaire.text_questions() {
                let answers = get_text_answers(
                    self.answers.as_ref(),
                    contribution,
                    question,
                    Some(TextAnswerState::VISIBLE.as_slice()),
                )
                .await?;
                if !answers.is_empty() {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evaluation_core::model::{
        ContributionId, Question, QuestionId, Questionnaire, QuestionnaireId, TextAnswer,
    };
    use storage::repository::InMemoryRepository;

    const COMMENTS: QuestionId = QuestionId::new(5);

    fn feedback() -> Questionnaire {
        Questionnaire::new(
            QuestionnaireId::new(1),
            "Feedback",
            vec![
                Question::likert(QuestionId::new(4), "clarity"),
                Question::text_question(COMMENTS, "comments"),
            ],
        )
    }

    fn users(ids: &[u64]) -> Vec<UserId> {
        ids.iter().copied().map(UserId::new).collect()
    }

    /// Responsible user 1, tutor 2 on contribution 11, general contribution 10.
    fn course(id: u64, participants: &[u64], voters: &[u64]) -> Course {
        Course::new(
            CourseId::new(id),
            format!("Course {id}"),
            UserId::new(1),
            vec![
                Contribution::general(ContributionId::new(id * 10), vec![feedback()]),
                Contribution::new(
                    ContributionId::new(id * 10 + 1),
                    Some(UserId::new(2)),
                    vec![feedback()],
                ),
            ],
            users(participants),
            users(voters),
        )
        .unwrap()
    }

    fn service(answers: &InMemoryRepository) -> NotificationService {
        NotificationService::new(ResultsSettings::default(), Arc::new(answers.clone()))
    }

    #[tokio::test]
    async fn publishable_course_notifies_participants_and_contributors() {
        let answers = InMemoryRepository::new();
        let course = course(1, &[20, 21, 22], &[20, 21]);

        let notifications = service(&answers)
            .partition_notifications(&[course])
            .await
            .unwrap();

        let notified: Vec<u64> = notifications.keys().map(|u| u.value()).collect();
        assert_eq!(notified, vec![2, 20, 21, 22]);
        assert!(notifications.values().all(|c| c.contains(&CourseId::new(1))));
        assert_eq!(answers.reads(), 0);
    }

    #[tokio::test]
    async fn unpublishable_course_notifies_text_answer_readers() {
        let answers = InMemoryRepository::new();
        answers
            .add_text(TextAnswer::new(
                ContributionId::new(11),
                COMMENTS,
                "helpful tutor",
                TextAnswerState::Published,
            ))
            .unwrap();
        let course = course(1, &[20, 21, 22], &[20]);

        let notifications = service(&answers)
            .partition_notifications(&[course])
            .await
            .unwrap();

        let notified: Vec<u64> = notifications.keys().map(|u| u.value()).collect();
        assert_eq!(notified, vec![1, 2]);
    }

    #[tokio::test]
    async fn general_text_answers_only_notify_responsible() {
        let answers = InMemoryRepository::new();
        answers
            .add_text(TextAnswer::new(
                ContributionId::new(10),
                COMMENTS,
                "too fast",
                TextAnswerState::Private,
            ))
            .unwrap();
        let course = course(1, &[20], &[]);

        let notifications = service(&answers)
            .partition_notifications(&[course])
            .await
            .unwrap();

        let notified: Vec<u64> = notifications.keys().map(|u| u.value()).collect();
        assert_eq!(notified, vec![1]);
    }

    #[tokio::test]
    async fn hidden_text_answers_notify_nobody() {
        let answers = InMemoryRepository::new();
        answers
            .add_text(TextAnswer::new(
                ContributionId::new(11),
                COMMENTS,
                "rude",
                TextAnswerState::Hidden,
            ))
            .unwrap();
        let course = course(1, &[20], &[]);

        let notifications = service(&answers)
            .partition_notifications(&[course])
            .await
            .unwrap();
        assert!(notifications.is_empty());
    }

    #[tokio::test]
    async fn courses_are_collected_per_user() {
        let answers = InMemoryRepository::new();
        answers
            .add_text(TextAnswer::new(
                ContributionId::new(21),
                COMMENTS,
                "good",
                TextAnswerState::Published,
            ))
            .unwrap();
        let published = course(1, &[20, 21], &[20, 21]);
        let commented = course(2, &[20, 21], &[]);

        let notifications = service(&answers)
            .partition_notifications(&[published, commented])
            .await
            .unwrap();

        assert_eq!(
            notifications[&UserId::new(2)],
            BTreeSet::from([CourseId::new(1), CourseId::new(2)])
        );
        assert_eq!(notifications[&UserId::new(1)], BTreeSet::from([CourseId::new(2)]));
        assert_eq!(notifications[&UserId::new(20)], BTreeSet::from([CourseId::new(1)]));
    }
}
