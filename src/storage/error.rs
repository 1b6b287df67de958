use libsql::errors::Error as TursoError;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Turso error: {0}")]
    Turso(#[from] TursoError),
    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
    #[error("Other error: {0}")]
    Other(String),
}
