//! Error types for Tally

use thiserror::Error;

use crate::models::MonthKey;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid month key: {0} (expected YYYY-MM)")]
    InvalidMonthKey(String),

    #[error("Invalid statement range: {start} is after {end}")]
    InvalidRange { start: MonthKey, end: MonthKey },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
