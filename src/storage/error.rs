#[derive(thiserror::Error, Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Any(#[from] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(thiserror::Error, Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum StorageError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("invalid storage configuration: {0}")]
    Config(String),

    #[error("transfer failed for `{key}`")]
    Transfer { key: String, source: StoreError },

    #[error("bulk transfer cancelled: deadline exceeded")]
    Cancelled,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
pub type StorageResult<T> = std::result::Result<T, StorageError>;
