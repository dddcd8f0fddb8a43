use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterError>;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Failed to start write coalescer: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    #[error("Failed to build filter config: {0}")]
    ConfigBuild(String),
}

impl From<crate::bloom::FilterConfigBuilderError> for FilterError {
    fn from(err: crate::bloom::FilterConfigBuilderError) -> Self {
        FilterError::ConfigBuild(err.to_string())
    }
}
