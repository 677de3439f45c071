use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapperError {
    #[error("Invalid dump format: no plugin header and no parameter lines were found")]
    InvalidDumpFormat,
    #[error("Not a mapping file: the Main section is missing")]
    MissingMainSection,
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}
