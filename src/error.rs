use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("item pool is empty")]
    EmptyPool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatisticsError {
    #[error("item {id}: timesCorrect ({correct}) exceeds timesSolved ({solved})")]
    InvalidStatistics { id: i64, solved: u32, correct: u32 },
}

/// Failures of the item source, local or remote.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to read {path}: {source}")]
    Deck {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write {path}: {source}")]
    Save {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("unknown item id {0}")]
    UnknownItem(i64),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("no item has been drawn yet")]
    NoCurrentItem,
}
