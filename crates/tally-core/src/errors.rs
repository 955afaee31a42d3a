/// Core error type shared by both bots.
///
/// Adapter crates map their specific errors into this type so handlers can
/// treat failures consistently (log and continue vs. fatal at startup).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Message for the operator at startup. Configuration problems are shown
    /// as-is, without the `config error:` prefix.
    pub fn startup_message(&self) -> String {
        match self {
            Error::Config(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Outcome of a side effect the caller may proceed without (pinning a
/// message, refreshing the admin list).
///
/// `Skipped` is not an error to surface; it only carries the reason for logs.
#[derive(Debug)]
pub enum BestEffort<T> {
    Done(T),
    Skipped(Error),
}

impl<T> From<Result<T>> for BestEffort<T> {
    fn from(r: Result<T>) -> Self {
        match r {
            Ok(v) => BestEffort::Done(v),
            Err(e) => BestEffort::Skipped(e),
        }
    }
}
