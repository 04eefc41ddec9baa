//! Error types for agenda
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, bad config, stale or missing row)
//! - 4: Operation failed (store unavailable, io, csv)

use std::path::PathBuf;
use thiserror::Error;

pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not open sheet {path}: {reason}")]
    StoreUnavailable { path: PathBuf, reason: String },

    #[error("Column '{0}' not found in the sheet")]
    MissingColumn(&'static str),

    #[error("Row {index} does not exist (sheet has {len} tasks)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("Row {index} changed since it was read; reload and try again")]
    StaleRow { index: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MissingColumn(_)
            | Error::RowOutOfRange { .. }
            | Error::StaleRow { .. }
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_)
            | Error::TomlParse(_) => exit_codes::USER_ERROR,

            Error::StoreUnavailable { .. } | Error::Io(_) | Error::Csv(_) | Error::Json(_) => {
                exit_codes::OPERATION_FAILED
            }
        }
    }

    /// Store failures end the session; everything else is reported and the
    /// user can retry.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::StoreUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_map_correctly() {
        let unavailable = Error::StoreUnavailable {
            path: PathBuf::from("agenda.csv"),
            reason: "missing".to_string(),
        };
        assert_eq!(unavailable.exit_code(), exit_codes::OPERATION_FAILED);
        assert!(unavailable.is_fatal());

        let stale = Error::StaleRow { index: 3 };
        assert_eq!(stale.exit_code(), exit_codes::USER_ERROR);
        assert!(!stale.is_fatal());
    }

    #[test]
    fn missing_column_names_the_column() {
        let err = Error::MissingColumn("Category");
        assert!(err.to_string().contains("Category"));
    }
}
