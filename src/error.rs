/// Error types shared by the API layer, the editor core and configuration.
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::types::TimeField;

/// Failures talking to the Belcka REST API.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Could not decode response for '{context}': {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not encode request for '{context}': {source}")]
    Encode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Server returned {status} for '{context}': {body}")]
    Status {
        context: String,
        status: StatusCode,
        body: String,
    },

    /// The envelope came back with `IsSuccess: false`.
    #[error("{0}")]
    Rejected(String),

    #[error("No API token configured")]
    MissingToken,
}

/// Local validation failures. These block an action and keep the edit open.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("{field} time '{value}' is not a valid HH:MM time")]
    InvalidTime { field: TimeField, value: String },

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Could not read date '{0}'")]
    InvalidDate(String),

    #[error("Worklog is locked")]
    Locked,

    #[error("A reason is required to reject a request")]
    EmptyReason,

    #[error("Nothing selected")]
    NothingSelected,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to encode configuration: {0}")]
    Encode(#[source] serde_yaml::Error),

    #[error("Failed to write configuration {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ApiResult<T> = Result<T, ApiError>;
