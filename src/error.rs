//! Error types for the bank deployer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Key recovery error: {0}")]
    Logic(String),

    #[error("Deployment failed: {0}")]
    Deployment(String),

    #[error("Contract call failed: {0}")]
    Call(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid contract artifact: {0}")]
    Artifact(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`], stable across message changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Credential,
    Network,
    Logic,
    Deployment,
    Call,
    Transaction,
    Config,
    Input,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Credential(_) => ErrorKind::Credential,
            Error::Network(_) => ErrorKind::Network,
            Error::Logic(_) => ErrorKind::Logic,
            Error::Deployment(_) => ErrorKind::Deployment,
            Error::Call(_) => ErrorKind::Call,
            Error::Transaction(_) => ErrorKind::Transaction,
            Error::Config(_) | Error::Io(_) => ErrorKind::Config,
            Error::Artifact(_) | Error::InvalidArgument(_) | Error::Json(_) => ErrorKind::Input,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
