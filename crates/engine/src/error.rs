use std::any::Any;

/// Errors surfaced by engine construction and parallel evaluation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// A task of a parallel evaluation panicked; the first panic observed by the pool wins.
    #[error("task panicked: {message}")]
    TaskPanicked { message: String },

    #[error("task tree finished without a root result")]
    Incomplete,
}

impl Error {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Error::TaskPanicked { message }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
