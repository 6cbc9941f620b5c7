#![forbid(unsafe_code)]

pub mod answers;
pub mod error;
pub mod notification_service;
pub mod results_service;

pub use evaluation_core::Clock;

pub use error::{AnswerAccessError, NotificationError, ResultsError};
pub use notification_service::{NotificationService, Notifications};
pub use results_service::{RESULTS_CACHE_TTL_SECS, ResultsService, results_cache_key};
