//! Errors of a setup run

use std::io;

use thiserror::Error;

/// Everything that can abort a setup run. None of these are retried.
#[derive(Debug, Error)]
pub enum Error {
    #[error("OS platform {0} not supported")]
    UnsupportedPlatform(String),

    #[error("OS architecture {0} not supported")]
    UnsupportedArch(String),

    #[error("{0}")]
    InvalidConfiguration(String),

    #[error("{0} is not a valid version")]
    InvalidConstraint(String),

    #[error("SetOps version {version} not available for {os} and {arch}")]
    VersionUnavailable {
        version: String,
        os: String,
        arch: String,
    },

    #[error("could not find a release tagged {0}")]
    ReleaseNotFound(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("download failed: {0}")]
    Download(String),

    #[error("failed to extract {path}: {source}")]
    Extraction {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("setops login failed: {0}")]
    Login(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
