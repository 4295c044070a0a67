use std::str::Utf8Error;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("not a git repository (discovery reached the filesystem root)")]
    NotARepository,
    #[error("git config is missing: {0}")]
    ConfigMissing(String),
    #[error("git config is malformed: {0}")]
    BadConfig(String),
    #[error("unsupported repositoryformatversion: {0}")]
    UnsupportedFormat(String),
    #[error("not a directory: {0}")]
    NotADirectory(String),
    #[error("object not found: {0}")]
    ObjectNotFound(String),
    #[error("malformed object: {0}")]
    Malformed(String),
    #[error("unknown object type: {0}")]
    UnknownType(String),
    #[error("repository already exists at {0}")]
    AlreadyExists(String),
    #[error("destination is not empty: {0}")]
    NotEmpty(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Utf8Error> for Error {
    fn from(err: Utf8Error) -> Self {
        Error::Malformed(format!("invalid utf-8: {err}"))
    }
}

impl From<nom::Err<nom::error::Error<&[u8]>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        Error::Malformed(format!("parse failure: {err}"))
    }
}
