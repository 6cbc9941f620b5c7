use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ContributionId, CourseId, UserId};
use crate::model::question::Questionnaire;
use crate::model::settings::ResultsSettings;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course name cannot be empty")]
    EmptyName,
    #[error("voter {0} is not a participant of the course")]
    VoterNotParticipant(UserId),
}

//
// ─── CONTRIBUTION ─────────────────────────────────────────────────────────────
//

/// Pairs a course with a contributor, or with nobody for course-level questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    id: ContributionId,
    contributor: Option<UserId>,
    questionnaires: Vec<Questionnaire>,
}

impl Contribution {
    #[must_use]
    pub fn new(
        id: ContributionId,
        contributor: Option<UserId>,
        questionnaires: Vec<Questionnaire>,
    ) -> Self {
        Self {
            id,
            contributor,
            questionnaires,
        }
    }

    /// A contribution about the course itself rather than a person.
    #[must_use]
    pub fn general(id: ContributionId, questionnaires: Vec<Questionnaire>) -> Self {
        Self::new(id, None, questionnaires)
    }

    #[must_use]
    pub fn id(&self) -> ContributionId {
        self.id
    }

    #[must_use]
    pub fn contributor(&self) -> Option<UserId> {
        self.contributor
    }

    #[must_use]
    pub fn questionnaires(&self) -> &[Questionnaire] {
        &self.questionnaires
    }

    #[must_use]
    pub fn is_general(&self) -> bool {
        self.contributor.is_none()
    }
}

//
// ─── COURSE ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    id: CourseId,
    name: String,
    responsible: UserId,
    contributions: Vec<Contribution>,
    participants: Vec<UserId>,
    voters: Vec<UserId>,
}

impl Course {
    /// Create a course.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyName` if the trimmed name is empty, or
    /// `CourseError::VoterNotParticipant` if a voter is missing from `participants`.
    pub fn new(
        id: CourseId,
        name: impl Into<String>,
        responsible: UserId,
        contributions: Vec<Contribution>,
        participants: Vec<UserId>,
        voters: Vec<UserId>,
    ) -> Result<Self, CourseError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(CourseError::EmptyName);
        }
        if let Some(stray) = voters.iter().find(|v| !participants.contains(v)) {
            return Err(CourseError::VoterNotParticipant(*stray));
        }

        Ok(Self {
            id,
            name,
            responsible,
            contributions,
            participants,
            voters,
        })
    }

    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn responsible(&self) -> UserId {
        self.responsible
    }

    #[must_use]
    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    #[must_use]
    pub fn participants(&self) -> &[UserId] {
        &self.participants
    }

    #[must_use]
    pub fn voters(&self) -> &[UserId] {
        &self.voters
    }

    /// Every (questionnaire, contribution) pair of the course, general contributions first.
    ///
    /// The sort is stable, so declaration order is kept inside each group.
    #[must_use]
    pub fn questionnaires_and_contributions(&self) -> Vec<(&Questionnaire, &Contribution)> {
        let mut pairs: Vec<_> = self
            .contributions
            .iter()
            .flat_map(|contribution| {
                contribution
                    .questionnaires()
                    .iter()
                    .map(move |questionnaire| (questionnaire, contribution))
            })
            .collect();
        pairs.sort_by_key(|(_, contribution)| !contribution.is_general());
        pairs
    }

    /// Whether enough participants voted for grades to be published.
    #[must_use]
    pub fn can_publish_grades(&self, settings: &ResultsSettings) -> bool {
        if self.participants.is_empty() {
            return false;
        }
        let voters = self.voters.len();
        let enough_voters = u32::try_from(voters).is_ok_and(|n| n >= settings.min_answer_count());
        #[allow(clippy::cast_precision_loss)]
        let ratio = voters as f64 / self.participants.len() as f64;
        enough_voters && ratio >= settings.min_answer_percentage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::{QuestionId, QuestionnaireId};
    use crate::model::question::Question;
    use crate::model::settings::ResultsSettingsDraft;

    fn questionnaire(id: u64) -> Questionnaire {
        Questionnaire::new(
            QuestionnaireId::new(id),
            format!("Q{id}"),
            vec![Question::likert(QuestionId::new(id * 10), "q")],
        )
    }

    fn users(ids: &[u64]) -> Vec<UserId> {
        ids.iter().copied().map(UserId::new).collect()
    }

    #[test]
    fn rejects_blank_name() {
        let err = Course::new(CourseId::new(1), "   ", UserId::new(1), vec![], vec![], vec![])
            .unwrap_err();
        assert_eq!(err, CourseError::EmptyName);
    }

    #[test]
    fn rejects_voter_outside_participants() {
        let err = Course::new(
            CourseId::new(1),
            "Databases",
            UserId::new(1),
            vec![],
            users(&[10, 11]),
            users(&[12]),
        )
        .unwrap_err();
        assert_eq!(err, CourseError::VoterNotParticipant(UserId::new(12)));
    }

    #[test]
    fn general_contributions_come_first_and_order_is_stable() {
        let course = Course::new(
            CourseId::new(1),
            "Databases",
            UserId::new(1),
            vec![
                Contribution::new(
                    ContributionId::new(1),
                    Some(UserId::new(1)),
                    vec![questionnaire(1), questionnaire(2)],
                ),
                Contribution::general(ContributionId::new(2), vec![questionnaire(3)]),
                Contribution::new(
                    ContributionId::new(3),
                    Some(UserId::new(2)),
                    vec![questionnaire(1)],
                ),
                Contribution::general(ContributionId::new(4), vec![questionnaire(4)]),
            ],
            vec![],
            vec![],
        )
        .unwrap();

        let order: Vec<_> = course
            .questionnaires_and_contributions()
            .into_iter()
            .map(|(q, c)| (q.id().value(), c.id().value()))
            .collect();
        assert_eq!(order, vec![(3, 2), (4, 4), (1, 1), (2, 1), (1, 3)]);
    }

    #[test]
    fn can_publish_requires_count_and_ratio() {
        let settings = ResultsSettingsDraft {
            min_answer_count: Some(2),
            min_answer_percentage: Some(0.2),
            ..ResultsSettingsDraft::default()
        }
        .validate()
        .unwrap();

        let build = |participants: &[u64], voters: &[u64]| {
            Course::new(
                CourseId::new(1),
                "Databases",
                UserId::new(1),
                vec![],
                users(participants),
                users(voters),
            )
            .unwrap()
        };

        assert!(build(&[1, 2, 3, 4, 5], &[1, 2]).can_publish_grades(&settings));
        assert!(!build(&[1, 2, 3, 4, 5], &[1]).can_publish_grades(&settings));
        assert!(
            !build(&(1..=20).collect::<Vec<_>>(), &[1, 2, 3]).can_publish_grades(&settings)
        );
        assert!(!build(&[], &[]).can_publish_grades(&settings));
    }
}
