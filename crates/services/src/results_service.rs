use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};

use evaluation_core::model::{
    Contribution, ContributionId, Course, CourseId, FinalGrades, Question, QuestionKind,
    QuestionResult, Questionnaire, QuestionnaireId, RatingResult, ResultSection, ResultsSettings,
    TextAnswerState, TextResult,
};
use evaluation_core::stats::{average, distribution, median, variance, weighted_mix};
use storage::repository::{AnswerRepository, ResultCache, Storage};

use crate::answers::{count_rating_answers, get_rating_answers, get_text_answers};
use crate::error::ResultsError;

/// How long computed results stay in the cache.
pub const RESULTS_CACHE_TTL_SECS: i64 = 24 * 60 * 60;

/// Cache key under which the sections of `course` are stored.
#[must_use]
pub fn results_cache_key(course: CourseId) -> String {
    format!("evaluation.results.calculate_results-{course}")
}

/// Aggregates raw answers into per-section results and course-wide grades.
#[derive(Clone)]
pub struct ResultsService {
    settings: ResultsSettings,
    answers: Arc<dyn AnswerRepository>,
    cache: Arc<dyn ResultCache>,
}

impl ResultsService {
    #[must_use]
    pub fn new(
        settings: ResultsSettings,
        answers: Arc<dyn AnswerRepository>,
        cache: Arc<dyn ResultCache>,
    ) -> Self {
        Self {
            settings,
            answers,
            cache,
        }
    }

    #[must_use]
    pub fn from_storage(settings: ResultsSettings, storage: &Storage) -> Self {
        Self::new(
            settings,
            Arc::clone(&storage.answers),
            Arc::clone(&storage.results_cache),
        )
    }

    /// Result sections of `course`, general contributions first.
    ///
    /// Served from the cache when a non-empty entry exists, otherwise computed
    /// and cached for [`RESULTS_CACHE_TTL_SECS`]. Sections without any
    /// displayable result are left out.
    ///
    /// # Errors
    ///
    /// Returns `ResultsError::Storage` if the cache or answer source fails.
    pub async fn calculate_results(
        &self,
        course: &Course,
    ) -> Result<Vec<ResultSection>, ResultsError> {
        let key = results_cache_key(course.id());
        if let Some(sections) = self.cache.get(&key).await? {
            if !sections.is_empty() {
                debug!(course = %course.id(), "results cache hit");
                return Ok(sections);
            }
        }
        debug!(course = %course.id(), "results cache miss");

        let sections = self.compute_sections(course).await?;
        self.cache
            .set(&key, &sections, Duration::seconds(RESULTS_CACHE_TTL_SECS))
            .await?;

        info!(
            course = %course.id(),
            sections = sections.len(),
            warnings = sections.iter().filter(|s| s.warning).count(),
            "computed course results"
        );
        Ok(sections)
    }

    /// Combine every section of `course` into one average and one median grade.
    ///
    /// Contributor sections and general sections are pooled separately and
    /// mixed by the contribution percentage.
    ///
    /// # Errors
    ///
    /// Same as [`Self::calculate_results`].
    pub async fn calculate_final_grades(
        &self,
        course: &Course,
    ) -> Result<FinalGrades, ResultsError> {
        let sections = self.calculate_results(course).await?;

        let mut average_likert = Pool::default();
        let mut median_likert = Pool::default();
        let mut average_grade = Pool::default();
        let mut median_grade = Pool::default();
        for section in &sections {
            let about_contributor = section.contributor.is_some();
            average_likert.push(about_contributor, section.average_likert);
            median_likert.push(about_contributor, section.median_likert);
            average_grade.push(about_contributor, section.average_grade);
            median_grade.push(about_contributor, section.median_grade);
        }

        let alpha = self.settings.contribution_percentage();
        let grade_weight = self.settings.grade_percentage();
        let average = weighted_mix(
            average_grade.mixed_average(alpha),
            average_likert.mixed_average(alpha),
            grade_weight,
        );
        let median = weighted_mix(
            median_grade.mixed_median(alpha),
            median_likert.mixed_median(alpha),
            grade_weight,
        );
        Ok(FinalGrades { average, median })
    }

    async fn compute_sections(&self, course: &Course) -> Result<Vec<ResultSection>, ResultsError> {
        let pairs = course.questionnaires_and_contributions();

        // Largest answer count per pair, then the median of those per questionnaire.
        let mut max_answers: HashMap<(QuestionnaireId, ContributionId), usize> = HashMap::new();
        let mut peer_counts: HashMap<QuestionnaireId, Vec<Option<f64>>> = HashMap::new();
        for (questionnaire, contribution) in &pairs {
            let max = self.max_answer_count(questionnaire, contribution).await?;
            max_answers.insert((questionnaire.id(), contribution.id()), max);
            #[allow(clippy::cast_precision_loss)]
            let count = max as f64;
            peer_counts
                .entry(questionnaire.id())
                .or_default()
                .push(Some(count));
        }
        let median_answers: HashMap<QuestionnaireId, f64> = peer_counts
            .into_iter()
            .map(|(id, counts)| (id, median(counts).unwrap_or(0.0)))
            .collect();

        let mut sections = Vec::new();
        for (questionnaire, contribution) in pairs {
            let median_max = median_answers
                .get(&questionnaire.id())
                .copied()
                .unwrap_or(0.0);
            let max = max_answers
                .get(&(questionnaire.id(), contribution.id()))
                .copied()
                .unwrap_or(0);
            if let Some(section) = self
                .build_section(questionnaire, contribution, max, median_max)
                .await?
            {
                sections.push(section);
            }
        }
        Ok(sections)
    }

    async fn max_answer_count(
        &self,
        questionnaire: &Questionnaire,
        contribution: &Contribution,
    ) -> Result<usize, ResultsError> {
        let mut max = 0;
        for question in questionnaire.rating_questions() {
            let count = count_rating_answers(self.answers.as_ref(), contribution, question).await?;
            max = max.max(count);
        }
        Ok(max)
    }

    async fn build_section(
        &self,
        questionnaire: &Questionnaire,
        contribution: &Contribution,
        max_answers: usize,
        median_max: f64,
    ) -> Result<Option<ResultSection>, ResultsError> {
        let mut results = Vec::new();
        for question in questionnaire.questions() {
            if let Some(result) = self
                .summarize_question(question, contribution, median_max)
                .await?
            {
                results.push(result);
            }
        }
        if results.is_empty() {
            return Ok(None);
        }

        let mut section = ResultSection {
            questionnaire: questionnaire.clone(),
            contributor: contribution.contributor(),
            results,
            average_likert: None,
            median_likert: None,
            average_grade: None,
            median_grade: None,
            average_total: None,
            median_total: None,
            warning: false,
        };
        section.average_likert = average(section.likert_results().map(|r| r.average));
        section.median_likert = median(section.likert_results().map(|r| r.median));
        section.average_grade = average(section.grade_results().map(|r| r.average));
        section.median_grade = median(section.grade_results().map(|r| r.median));

        let grade_weight = self.settings.grade_percentage();
        section.average_total =
            weighted_mix(section.average_grade, section.average_likert, grade_weight);
        section.median_total =
            weighted_mix(section.median_grade, section.median_likert, grade_weight);

        #[allow(clippy::cast_precision_loss)]
        let max = max_answers as f64;
        section.warning =
            median_max > 0.0 && max < self.settings.results_warning_percentage() * median_max;
        if section.warning {
            debug!(
                questionnaire = %questionnaire.id(),
                contribution = %contribution.id(),
                answers = max_answers,
                peer_median = median_max,
                "section has few answers compared to its peers"
            );
        }

        Ok(Some(section))
    }

    /// `None` when the question has nothing to show: no ratings, or no visible text.
    async fn summarize_question(
        &self,
        question: &Question,
        contribution: &Contribution,
        median_max: f64,
    ) -> Result<Option<QuestionResult>, ResultsError> {
        match question.kind() {
            QuestionKind::Text => {
                let answers = get_text_answers(
                    self.answers.as_ref(),
                    contribution,
                    question,
                    Some(TextAnswerState::VISIBLE.as_slice()),
                )
                .await?;
                if answers.is_empty() {
                    return Ok(None);
                }
                Ok(Some(QuestionResult::Text(TextResult {
                    question: question.clone(),
                    answers,
                })))
            }
            QuestionKind::Likert | QuestionKind::Grade => {
                let rating = self.summarize_ratings(question, contribution, median_max).await?;
                if rating.count == 0 {
                    return Ok(None);
                }
                Ok(Some(if question.is_grade() {
                    QuestionResult::Grade(rating)
                } else {
                    QuestionResult::Likert(rating)
                }))
            }
        }
    }

    async fn summarize_ratings(
        &self,
        question: &Question,
        contribution: &Contribution,
        median_max: f64,
    ) -> Result<RatingResult, ResultsError> {
        let ratings = get_rating_answers(self.answers.as_ref(), contribution, question).await?;
        let values: Vec<f64> = ratings.iter().map(|r| r.as_f64()).collect();
        let count = values.len();

        let average = average(values.iter().copied().map(Some));
        let median = median(values.iter().copied().map(Some));
        let variance = average.and_then(|mean| variance(&values, mean));

        #[allow(clippy::cast_precision_loss)]
        let answered = count as f64;
        let warning =
            count > 0 && answered < self.settings.results_warning_percentage() * median_max;

        Ok(RatingResult {
            question: question.clone(),
            count,
            average,
            median,
            variance,
            distribution: distribution(&ratings),
            warning,
        })
    }
}

/// Section statistics split by whether the section is about a contributor.
#[derive(Default)]
struct Pool {
    contribution: Vec<f64>,
    general: Vec<f64>,
}

impl Pool {
    fn push(&mut self, about_contributor: bool, value: Option<f64>) {
        let Some(value) = value else {
            return;
        };
        if about_contributor {
            self.contribution.push(value);
        } else {
            self.general.push(value);
        }
    }

    fn mixed_average(&self, alpha: f64) -> Option<f64> {
        weighted_mix(
            average(self.contribution.iter().copied().map(Some)),
            average(self.general.iter().copied().map(Some)),
            alpha,
        )
    }

    fn mixed_median(&self, alpha: f64) -> Option<f64> {
        weighted_mix(
            median(self.contribution.iter().copied().map(Some)),
            median(self.general.iter().copied().map(Some)),
            alpha,
        )
    }
}
