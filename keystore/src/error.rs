use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("PEM error: {0}")]
    Pem(#[from] pem::error::Error),

    #[error("certificate decode error: {0}")]
    Certificate(String),

    #[error("private key error: {0}")]
    PrivateKey(String),

    #[error("password required to decrypt private key")]
    MissingPassword,

    #[error("PEM block is not a certificate")]
    NotACertificate,

    #[error("PEM block is not a private key")]
    NotAKey,

    #[error("container access error: {0}")]
    ContainerAccess(String),

    #[error("unsupported entry type for alias '{0}'")]
    UnsupportedEntry(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
