// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Picsort Contributors

//! Picsort: Browser-Based Image Triage Tool
//!
//! A single-user web application for sorting a batch of uploaded images
//! into five fixed categories, one image at a time, and downloading the
//! result as a category-structured zip archive.

pub mod archive;
pub mod category;
pub mod config;
pub mod error;
pub mod preview;
pub mod session;
pub mod web;

pub use config::AppConfig;
pub use error::{PicsortError, Result};
