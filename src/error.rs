// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Picsort Contributors

//! Error types for Picsort

use thiserror::Error;

/// Result type alias for Picsort operations
pub type Result<T> = std::result::Result<T, PicsortError>;

/// Picsort error types
#[derive(Error, Debug)]
pub enum PicsortError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("No image pending: {0}")]
    NoImagePending(String),

    #[error("Nothing to download: {0}")]
    EmptyArchive(String),
}
