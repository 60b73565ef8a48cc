pub type ScrublineResult<T> = Result<T, ScrublineError>;

#[derive(thiserror::Error, Debug)]
pub enum ScrublineError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("timeline error: {0}")]
    Timeline(String),

    #[error("evaluation error: {0}")]
    Evaluation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScrublineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn timeline(msg: impl Into<String>) -> Self {
        Self::Timeline(msg.into())
    }

    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }
}
