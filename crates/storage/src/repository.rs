use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use evaluation_core::Clock;
use evaluation_core::model::{
    ContributionId, QuestionId, Rating, ResultSection, TextAnswer, TextAnswerState,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Read access to submitted answers.
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Number of rating answers for a (contribution, question) pair.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the answers cannot be counted.
    async fn count_rating_answers(
        &self,
        contribution: ContributionId,
        question: QuestionId,
    ) -> Result<usize, StorageError>;

    /// Rating answers for a (contribution, question) pair, in submission order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the answers cannot be loaded.
    async fn rating_answers(
        &self,
        contribution: ContributionId,
        question: QuestionId,
    ) -> Result<Vec<Rating>, StorageError>;

    /// Text answers for a (contribution, question) pair, in submission order.
    ///
    /// With `states` set, only answers in one of those states are returned.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the answers cannot be loaded.
    async fn text_answers(
        &self,
        contribution: ContributionId,
        question: QuestionId,
        states: Option<&[TextAnswerState]>,
    ) -> Result<Vec<TextAnswer>, StorageError>;
}

/// Expiring key-value store for computed course results.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Fetch a live entry. Expired entries read as `None`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the entry cannot be decoded.
    async fn get(&self, key: &str) -> Result<Option<Vec<ResultSection>>, StorageError>;

    /// Store `sections` under `key` for `ttl`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be stored.
    async fn set(
        &self,
        key: &str,
        sections: &[ResultSection],
        ttl: Duration,
    ) -> Result<(), StorageError>;
}

type AnswerKey = (ContributionId, QuestionId);

/// Simple in-memory answer store for tests and prototyping.
///
/// Counts every read so tests can assert whether the store was consulted.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    ratings: Arc<Mutex<HashMap<AnswerKey, Vec<Rating>>>>,
    texts: Arc<Mutex<HashMap<AnswerKey, Vec<TextAnswer>>>>,
    reads: Arc<AtomicUsize>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rating answer.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn add_rating(
        &self,
        contribution: ContributionId,
        question: QuestionId,
        rating: Rating,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .ratings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.entry((contribution, question)).or_default().push(rating);
        Ok(())
    }

    /// Record several rating answers at once.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn add_ratings(
        &self,
        contribution: ContributionId,
        question: QuestionId,
        ratings: impl IntoIterator<Item = Rating>,
    ) -> Result<(), StorageError> {
        for rating in ratings {
            self.add_rating(contribution, question, rating)?;
        }
        Ok(())
    }

    /// Record a text answer.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn add_text(&self, answer: TextAnswer) -> Result<(), StorageError> {
        let mut guard = self
            .texts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .entry((answer.contribution_id, answer.question_id))
            .or_default()
            .push(answer);
        Ok(())
    }

    /// Number of reads served so far.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AnswerRepository for InMemoryRepository {
    async fn count_rating_answers(
        &self,
        contribution: ContributionId,
        question: QuestionId,
    ) -> Result<usize, StorageError> {
        self.record_read();
        let guard = self
            .ratings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&(contribution, question)).map_or(0, Vec::len))
    }

    async fn rating_answers(
        &self,
        contribution: ContributionId,
        question: QuestionId,
    ) -> Result<Vec<Rating>, StorageError> {
        self.record_read();
        let guard = self
            .ratings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&(contribution, question)).cloned().unwrap_or_default())
    }

    async fn text_answers(
        &self,
        contribution: ContributionId,
        question: QuestionId,
        states: Option<&[TextAnswerState]>,
    ) -> Result<Vec<TextAnswer>, StorageError> {
        self.record_read();
        let guard = self
            .texts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let answers = guard
            .get(&(contribution, question))
            .map(|answers| {
                answers
                    .iter()
                    .filter(|a| states.is_none_or(|s| s.contains(&a.state)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(answers)
    }
}

/// In-memory result cache honouring TTLs against an adjustable clock.
#[derive(Clone, Default)]
pub struct InMemoryResultCache {
    clock: Arc<Mutex<Clock>>,
    entries: Arc<Mutex<HashMap<String, (Vec<ResultSection>, DateTime<Utc>)>>>,
    gets: Arc<AtomicUsize>,
    sets: Arc<AtomicUsize>,
}

impl InMemoryResultCache {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock: Arc::new(Mutex::new(clock)),
            ..Self::default()
        }
    }

    /// Move a fixed clock forward, e.g. past an entry's TTL.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the clock lock is poisoned.
    pub fn advance(&self, delta: Duration) -> Result<(), StorageError> {
        self.clock
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .advance(delta);
        Ok(())
    }

    #[must_use]
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    fn clock(&self) -> Result<Clock, StorageError> {
        self.clock
            .lock()
            .map(|clock| *clock)
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ResultCache for InMemoryResultCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<ResultSection>>, StorageError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        let clock = self.clock()?;
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let expired = match guard.get(key) {
            Some((_, expires_at)) => clock.has_passed(*expires_at),
            None => return Ok(None),
        };
        if expired {
            guard.remove(key);
            return Ok(None);
        }
        Ok(guard.get(key).map(|(sections, _)| sections.clone()))
    }

    async fn set(
        &self,
        key: &str,
        sections: &[ResultSection],
        ttl: Duration,
    ) -> Result<(), StorageError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        let expires_at = self.clock()?.deadline(ttl);
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), (sections.to_vec(), expires_at));
        Ok(())
    }
}

/// Bundles the answer source and result cache behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub answers: Arc<dyn AnswerRepository>,
    pub results_cache: Arc<dyn ResultCache>,
}
