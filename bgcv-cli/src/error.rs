//! Error handling for the bgcv CLI

use thiserror::Error;
use std::path::PathBuf;

/// Main error type for bgcv CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Parsing error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Record error: {message}")]
    Record { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn invalid_format<S: Into<String>>(message: S) -> Self {
        Self::InvalidFormat { message: message.into() }
    }

    pub fn parse<S: Into<String>>(file: S, message: S) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn record<S: Into<String>>(message: S) -> Self {
        Self::Record { message: message.into() }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into() }
    }
}

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Ensure you have read permissions for the file",
                path.display()
            ));
        }

        CliError::InvalidFormat { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Use an output path ending in .svg or .png\n\
                 • Or pass --format explicitly",
            );
        }

        CliError::Parse { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Viewer data must be TrackViewerData JSON (tracks, annotations, primitives)\n\
                 • Use 'bgcv convert' to turn an antiSMASH record into viewer data",
            );
        }

        CliError::Record { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Use 'bgcv regions --record <file>' to list the regions of a record\n\
                 • Pass --record-id when the document holds several records",
            );
        }

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your bgcv.toml configuration file\n\
                 • Use 'bgcv config' to generate a sample configuration",
            );
        }

        CliError::Validation { .. } => {}
    }

    message
}
